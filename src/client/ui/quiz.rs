//! Quiz screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListState, Padding, Paragraph, Wrap};

use crate::models::Quiz;

const CONTROLS: &str = "j/k or arrows to select  ·  Enter/Space to submit  ·  Esc back  ·  q quit";

/// Render the question and one row per answer, in order.
pub fn render(frame: &mut Frame, area: Rect, quiz: &Quiz, selected: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(7), // Question text
        Constraint::Min(4),    // Answers
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_question_text(frame, chunks[0], &quiz.question);
    render_answers(frame, chunks[1], &quiz.answers, selected);
    render_controls(frame, chunks[2]);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Question ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

/// The list scrolls so the selected answer stays on screen.
fn render_answers(frame: &mut Frame, area: Rect, answers: &[String], selected: usize) {
    let widget = List::new(answer_lines(answers, selected)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Answers ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    let mut state = ListState::default().with_selected(Some(selected));

    frame.render_stateful_widget(widget, area, &mut state);
}

/// One selectable line per answer.
pub(super) fn answer_lines(answers: &[String], selected: usize) -> Vec<Line<'_>> {
    answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            let is_selected = i == selected;
            let prefix = if is_selected { "> " } else { "  " };

            let style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("{}) ", i + 1), style),
                Span::styled(answer.as_str(), style),
            ])
        })
        .collect()
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(CONTROLS)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}
