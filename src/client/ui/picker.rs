//! List of published quizzes to choose from.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListState, Padding, Paragraph};

use crate::models::Quiz;

const QUESTION_PREVIEW_LENGTH: usize = 60;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    account_id: &str,
    quizzes: &[Quiz],
    selected: usize,
    load_error: Option<&str>,
) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(4),    // Quizzes
        Constraint::Length(1), // Load error
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled("NEAR QUIZ", Style::default().fg(Color::Cyan).bold())),
        Line::from(vec![
            Span::styled("Playing as ", Style::default().fg(Color::White)),
            Span::styled(account_id, Style::default().fg(Color::Green).bold()),
        ]),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    let lines: Vec<Line> = if quizzes.is_empty() {
        vec![Line::from(Span::styled(
            "No quizzes published yet.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        quizzes
            .iter()
            .enumerate()
            .map(|(i, quiz)| {
                let is_selected = i == selected;
                let style = if is_selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                let prefix = if is_selected { "> " } else { "  " };

                Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(truncate_question(&quiz.question), style),
                ])
            })
            .collect()
    };

    let list = List::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Quizzes ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, chunks[1], &mut state);

    if let Some(err) = load_error {
        let widget = Paragraph::new(err)
            .alignment(Alignment::Center)
            .fg(Color::Red);
        frame.render_widget(widget, chunks[2]);
    }

    let controls = Paragraph::new("j/k navigate  ·  Enter open  ·  r refresh  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[3]);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::client::ui::buffer_text;

    #[test]
    fn test_truncate_question() {
        assert_eq!(truncate_question("short"), "short");

        let long = "x".repeat(QUESTION_PREVIEW_LENGTH + 5);
        let truncated = truncate_question(&long);
        assert_eq!(truncated.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_selected_quiz_scrolls_into_view() {
        let quizzes: Vec<Quiz> = (1..=30)
            .map(|i| Quiz {
                hash: format!("q{}", i),
                question: format!("Question number {}", i),
                answers: vec!["yes".to_string(), "no".to_string()],
            })
            .collect();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal
            .draw(|frame| render(frame, frame.area(), "alice.near", &quizzes, 29, None))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("> Question number 30"));
        assert!(!text.contains("Question number 1 "));
    }
}
