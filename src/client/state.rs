//! Client state management.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::contract::CallError;
use crate::models::Quiz;

use super::api::ContractApi;
use super::view::QuizView;

/// Which screen the player is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Waiting for the list of published quizzes.
    Loading,
    /// Choosing a quiz from the list.
    Picker,
    /// Answering the chosen quiz.
    Quiz,
    /// Lost the server.
    Disconnected { message: String },
}

/// Client application state.
pub struct ClientApp<A: ContractApi> {
    api: Arc<A>,
    /// Current screen.
    pub screen: Screen,
    /// Account calls are made as (for display).
    pub account_id: String,
    quizzes: Vec<Quiz>,
    picker_selected: usize,
    view: Option<QuizView<A>>,
    load_error: Option<String>,
    loaded_tx: mpsc::UnboundedSender<Result<Vec<Quiz>, CallError>>,
    loaded_rx: mpsc::UnboundedReceiver<Result<Vec<Quiz>, CallError>>,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl<A: ContractApi> ClientApp<A> {
    pub fn new(api: Arc<A>, account_id: String) -> Self {
        let (loaded_tx, loaded_rx) = mpsc::unbounded_channel();
        Self {
            api,
            screen: Screen::Loading,
            account_id,
            quizzes: Vec::new(),
            picker_selected: 0,
            view: None,
            load_error: None,
            loaded_tx,
            loaded_rx,
            should_quit: false,
        }
    }

    /// Fetch the published quizzes in the background.
    pub fn refresh_quizzes(&mut self) {
        if self.screen != Screen::Quiz {
            self.screen = Screen::Loading;
        }

        let api = Arc::clone(&self.api);
        let loaded_tx = self.loaded_tx.clone();
        tokio::spawn(async move {
            let _ = loaded_tx.send(api.get_published_quizzes().await);
        });
    }

    /// Apply background results: loaded quiz lists and submission outcomes.
    pub fn poll(&mut self) {
        while let Ok(loaded) = self.loaded_rx.try_recv() {
            self.apply_loaded(loaded);
        }

        if let Some(view) = self.view.as_mut() {
            view.drain_outcomes();
        }
    }

    /// Wait for the next quiz list and apply it.
    pub async fn wait_for_quizzes(&mut self) {
        if let Some(loaded) = self.loaded_rx.recv().await {
            self.apply_loaded(loaded);
        }
    }

    fn apply_loaded(&mut self, loaded: Result<Vec<Quiz>, CallError>) {
        match loaded {
            Ok(quizzes) => {
                log::debug!("{} published quizzes", quizzes.len());
                self.quizzes = quizzes;
                let last = self.quizzes.len().saturating_sub(1);
                self.picker_selected = self.picker_selected.min(last);
                self.load_error = None;
            }
            Err(e) => {
                log::warn!("failed to load quizzes: {}", e);
                self.load_error = Some(e.to_string());
            }
        }

        if self.screen == Screen::Loading {
            self.screen = Screen::Picker;
        }
    }

    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn picker_selected(&self) -> usize {
        self.picker_selected
    }

    pub fn picker_next(&mut self) {
        if !self.quizzes.is_empty() {
            self.picker_selected = (self.picker_selected + 1) % self.quizzes.len();
        }
    }

    pub fn picker_previous(&mut self) {
        let count = self.quizzes.len();
        if count > 0 {
            self.picker_selected = (self.picker_selected + count - 1) % count;
        }
    }

    /// Open the highlighted quiz, reusing the view if one exists.
    pub fn open_selected_quiz(&mut self) {
        let Some(quiz) = self.quizzes.get(self.picker_selected).cloned() else {
            return;
        };

        match self.view.as_mut() {
            Some(view) => view.set_quiz(quiz),
            None => self.view = Some(QuizView::new(Arc::clone(&self.api), quiz)),
        }
        self.screen = Screen::Quiz;
    }

    pub fn back_to_picker(&mut self) {
        self.screen = Screen::Picker;
    }

    pub fn view(&self) -> Option<&QuizView<A>> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut QuizView<A>> {
        self.view.as_mut()
    }

    /// The alert blocking input, on whatever screen.
    pub fn alert(&self) -> Option<&str> {
        self.view.as_ref().and_then(|view| view.alert())
    }

    pub fn dismiss_alert(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.dismiss_alert();
        }
    }

    /// Move to disconnected state.
    pub fn disconnect(&mut self, message: String) {
        self.screen = Screen::Disconnected { message };
    }
}
