//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::client::api::ContractApi;
use crate::client::state::{ClientApp, Screen};

use super::{alert, picker, quiz};

/// Render the client UI based on current screen, with any alert on top.
pub fn render<A: ContractApi>(frame: &mut Frame, app: &ClientApp<A>) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.screen {
        Screen::Loading => render_loading(frame, area),
        Screen::Picker => picker::render(
            frame,
            area,
            &app.account_id,
            app.quizzes(),
            app.picker_selected(),
            app.load_error(),
        ),
        Screen::Quiz => {
            if let Some(view) = app.view() {
                quiz::render(frame, area, view.quiz(), view.selected());
            }
        }
        Screen::Disconnected { message } => render_disconnected(frame, area, message),
    }

    if let Some(message) = app.alert() {
        alert::render(frame, area, message);
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(5),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "NEAR QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Loading quizzes...",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

fn render_disconnected(frame: &mut Frame, area: Rect, message: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(9),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "NEAR QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press [Q] to exit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
