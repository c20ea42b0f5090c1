//! Terminal front end for a player.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::terminal;
use crate::QuizError;

use super::api::ContractApi;
use super::state::{ClientApp, Screen};
use super::ui;
use super::ws::WsContractApi;

/// Connect to the ledger server and run the quiz client.
pub async fn run(host: String, port: u16, account_id: String) -> Result<(), QuizError> {
    let url = format!("ws://{}:{}", host, port);
    println!("Connecting to {} as {}...", url, account_id);

    let api = Arc::new(WsContractApi::connect(&url, &account_id).await?);
    let mut app = ClientApp::new(Arc::clone(&api), api.account_id().to_string());
    app.refresh_quizzes();

    run_tui(&mut app, &api).await
}

async fn run_tui(
    app: &mut ClientApp<WsContractApi>,
    api: &WsContractApi,
) -> Result<(), QuizError> {
    let mut terminal = terminal::init()?;

    let result = loop {
        if app.should_quit {
            break Ok(());
        }

        app.poll();
        if !matches!(app.screen, Screen::Disconnected { .. }) {
            if let Some(reason) = api.disconnect_reason().await {
                app.disconnect(reason);
            }
        }

        if let Err(e) = terminal.draw(|frame| ui::render(frame, app)) {
            break Err(e);
        }

        // Short poll so call outcomes show up without a key press
        match event::poll(Duration::from_millis(50)) {
            Ok(true) => {}
            Ok(false) => {
                tokio::task::yield_now().await;
                continue;
            }
            Err(e) => break Err(e),
        }

        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                handle_input(app, key.code)
            }
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };

    terminal::restore()?;
    result.map_err(Into::into)
}

/// Handle keyboard input. An open alert swallows every key but dismissal.
pub fn handle_input<A: ContractApi>(app: &mut ClientApp<A>, key: KeyCode) {
    if app.alert().is_some() {
        if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return;
    }

    match &app.screen {
        Screen::Loading => {
            if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
                app.should_quit = true;
            }
        }
        Screen::Picker => match key {
            KeyCode::Up | KeyCode::Char('k') => app.picker_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.picker_next(),
            KeyCode::Enter => app.open_selected_quiz(),
            KeyCode::Char('r') | KeyCode::Char('R') => app.refresh_quizzes(),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        Screen::Quiz => match key {
            KeyCode::Esc => app.back_to_picker(),
            KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
            _ => {
                let Some(view) = app.view_mut() else {
                    return;
                };
                match key {
                    KeyCode::Up | KeyCode::Char('k') => view.select_previous(),
                    KeyCode::Down | KeyCode::Char('j') => view.select_next(),
                    KeyCode::Enter | KeyCode::Char(' ') => view.submit_selected(),
                    KeyCode::Char(c) => {
                        // digits pick an answer directly
                        let index = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1));
                        if let Some(index) = index {
                            if index < view.quiz().answers.len() {
                                view.submit_answer(index);
                            }
                        }
                    }
                    _ => {}
                }
            }
        },
        Screen::Disconnected { .. } => {
            if matches!(
                key,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter
            ) {
                app.should_quit = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::LocalContractApi;
    use crate::client::view::OUT_OF_TRIES_ALERT;
    use crate::contract::QuizContract;

    async fn app_on_quiz() -> (
        ClientApp<LocalContractApi>,
        Arc<tokio::sync::Mutex<QuizContract>>,
    ) {
        let mut contract = QuizContract::new("owner.near");
        contract
            .create_quiz(
                "owner.near",
                "h".to_string(),
                "Pick one".to_string(),
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                2,
                "12".to_string(),
                true,
            )
            .unwrap();
        let contract = Arc::new(tokio::sync::Mutex::new(contract));
        let api = Arc::new(LocalContractApi::new(Arc::clone(&contract), "alice.near"));

        let mut app = ClientApp::new(api, "alice.near".to_string());
        app.refresh_quizzes();
        app.wait_for_quizzes().await;
        handle_input(&mut app, KeyCode::Enter);
        (app, contract)
    }

    #[tokio::test]
    async fn test_enter_submits_selected_answer() {
        let (mut app, contract) = app_on_quiz().await;
        assert_eq!(app.screen, Screen::Quiz);

        handle_input(&mut app, KeyCode::Down);
        handle_input(&mut app, KeyCode::Down);
        handle_input(&mut app, KeyCode::Enter);
        app.view_mut().unwrap().next_outcome().await.unwrap();

        assert!(contract.lock().await.has_solved("alice.near", "h"));
        assert_eq!(app.alert(), None);
    }

    #[tokio::test]
    async fn test_alert_blocks_input_until_dismissed() {
        let (mut app, _contract) = app_on_quiz().await;

        for key in ['1', '2', '1', '1'] {
            handle_input(&mut app, KeyCode::Char(key));
            app.view_mut().unwrap().next_outcome().await.unwrap();
        }
        assert_eq!(app.alert(), Some(OUT_OF_TRIES_ALERT));

        handle_input(&mut app, KeyCode::Down);
        assert_eq!(app.view().unwrap().selected(), 0);

        // Esc only dismisses the alert
        handle_input(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Quiz);
        assert_eq!(app.alert(), None);

        handle_input(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Picker);
    }
}
