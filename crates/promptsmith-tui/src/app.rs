use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use promptsmith_core::presentation::save_prompt;
use promptsmith_core::{
    clipboard, Config, Conversation, CopyFeedback, GenerationBackend, GenerationClient,
    GenerationMode, PromptStore, ResultView, Turn, TurnOutcome,
};
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Describe the business / chat with the service
    Compose,
    /// The generated prompt
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Conversation
    pub conversation: Conversation,
    pub backend: Arc<dyn GenerationBackend>,
    pub service_url: String,
    pub turn_task: Option<JoinHandle<TurnOutcome>>,

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Result view
    pub result_scroll: u16,
    pub copy_feedback: CopyFeedback,
    pub download_dir: PathBuf,
    /// Timestamp of the last result we navigated to
    pub seen_result: Option<String>,

    /// One-line notice in the footer ("Saved to ...")
    pub notice: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mode = config.mode()?;
        let store = PromptStore::new(config.simulated_delay());
        let client = GenerationClient::new(&config.service_url(), config.request_timeout())?;
        let service_url = client.base_url().to_string();

        Ok(Self::with_backend(
            Conversation::new(mode, store),
            Arc::new(client),
            service_url,
            config.download_dir(),
        ))
    }

    pub fn with_backend(
        conversation: Conversation,
        backend: Arc<dyn GenerationBackend>,
        service_url: String,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Compose,
            input_mode: InputMode::Editing,

            conversation,
            backend,
            service_url,
            turn_task: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            result_scroll: 0,
            copy_feedback: CopyFeedback::default(),
            download_dir,
            seen_result: None,

            notice: None,

            animation_frame: 0,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.conversation.mode()
    }

    /// Run a turn in the background. A turn still in flight is left to finish
    /// on its own; its outcome is stale by then and gets dropped.
    pub fn start_turn(&mut self, turn: Turn) {
        let backend = Arc::clone(&self.backend);
        let store = self.conversation.store().clone();
        debug!(epoch = turn.epoch(), "Spawning turn");
        self.turn_task = Some(tokio::spawn(async move {
            turn.run(backend.as_ref(), &store).await
        }));
        self.scroll_chat_to_bottom();
    }

    /// Open a remote session if the conversation needs one.
    pub fn ensure_session(&mut self) {
        if let Some(turn) = self.conversation.begin_session() {
            self.start_turn(turn);
        }
    }

    pub fn submit(&mut self) {
        if let Some(turn) = self.conversation.submit() {
            self.notice = None;
            self.start_turn(turn);
        }
    }

    /// Collect a finished background turn, if any.
    pub async fn poll_turn(&mut self) {
        let finished = self
            .turn_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        let Some(task) = self.turn_task.take() else {
            return;
        };
        match task.await {
            Ok(outcome) => {
                if self.conversation.complete(outcome) {
                    self.scroll_chat_to_bottom();
                    self.follow_new_result();
                }
            }
            Err(e) => {
                error!(error = %e, "Turn task panicked");
                self.notice = Some("Something went wrong while generating. Press Ctrl+N to start over.".into());
            }
        }
    }

    /// Jump to the result screen when a result we have not shown yet appears.
    fn follow_new_result(&mut self) {
        let Some(result) = self.conversation.store().result() else {
            return;
        };
        if self.seen_result.as_deref() != Some(result.timestamp.as_str()) {
            self.seen_result = Some(result.timestamp);
            self.result_scroll = 0;
            self.screen = Screen::Result;
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn result_view(&self) -> ResultView {
        ResultView::from_store(self.conversation.store())
    }

    /// Show the result screen, or fall back to the input screen when there is
    /// nothing to show.
    pub fn open_result(&mut self) {
        match self.result_view() {
            ResultView::Redirect => self.back_to_compose(),
            ResultView::Loading | ResultView::Ready(_) => {
                self.screen = Screen::Result;
                self.input_mode = InputMode::Normal;
            }
        }
    }

    pub fn back_to_compose(&mut self) {
        self.screen = Screen::Compose;
        self.input_mode = InputMode::Editing;
    }

    pub fn new_chat(&mut self) {
        self.conversation.new_chat();
        self.chat_scroll = 0;
        self.notice = None;
        self.back_to_compose();
        self.ensure_session();
    }

    pub fn copy_result(&mut self) {
        if let ResultView::Ready(result) = self.result_view() {
            if clipboard::copy(&result.prompt) {
                self.copy_feedback.mark(Instant::now());
            } else {
                self.notice = Some("No clipboard available".into());
            }
        }
    }

    pub fn save_result(&mut self) {
        if let ResultView::Ready(result) = self.result_view() {
            self.notice = Some(match save_prompt(&result, &self.download_dir) {
                Ok(path) => format!("Saved to {}", path.display()),
                Err(e) => {
                    error!(error = %e, "Saving prompt failed");
                    "Could not save the prompt".to_string()
                }
            });
        }
    }

    pub fn copied_recently(&self) -> bool {
        self.copy_feedback.is_active(Instant::now())
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_awaiting() || self.conversation.store().is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll chat to bottom so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.conversation.messages() {
            total_lines = total_lines.saturating_add(1); // "You:" / "Promptsmith:"
            for line in msg.text.lines() {
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count / wrap_width + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1);
        }
        if self.conversation.is_awaiting() {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptsmith_core::client::{GenerateResponse, NewChatResponse};
    use promptsmith_core::{PromptsmithError, Result};
    use std::time::Duration;

    struct Unreachable;

    #[async_trait::async_trait]
    impl GenerationBackend for Unreachable {
        async fn new_chat(&self, _previous: Option<&str>) -> Result<NewChatResponse> {
            Err(PromptsmithError::Decode("offline".into()))
        }

        async fn generate(&self, _use_case: &str, _session_id: &str) -> Result<GenerateResponse> {
            Err(PromptsmithError::Decode("offline".into()))
        }
    }

    fn local_app() -> App {
        let conversation =
            Conversation::new(GenerationMode::Local, PromptStore::new(Duration::ZERO));
        App::with_backend(
            conversation,
            Arc::new(Unreachable),
            "http://localhost:8000".into(),
            std::env::temp_dir(),
        )
    }

    async fn wait_for_turn(app: &mut App) {
        while app.turn_task.is_some() {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.poll_turn().await;
        }
    }

    #[tokio::test]
    async fn test_new_reports_client_url() {
        let config = Config {
            mode: Some("remote".into()),
            service_url: Some("http://gen.local:9000/".into()),
            ..Config::default()
        };
        let app = App::new(&config).unwrap();
        assert_eq!(app.service_url, "http://gen.local:9000");
        assert_eq!(app.mode(), GenerationMode::Remote);
    }

    #[tokio::test]
    async fn test_result_screen_redirects_without_result() {
        let mut app = local_app();
        app.open_result();
        assert_eq!(app.screen, Screen::Compose);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn test_local_generation_navigates_to_result() {
        let mut app = local_app();
        app.conversation.set_input("I run a small clothing boutique");
        app.submit();
        wait_for_turn(&mut app).await;

        assert_eq!(app.screen, Screen::Result);
        match app.result_view() {
            ResultView::Ready(result) => {
                assert_eq!(result.title, "Fashion Retail AI Assistant Prompt")
            }
            other => panic!("expected a result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_chat_returns_to_compose() {
        let mut app = local_app();
        app.conversation.set_input("food truck");
        app.submit();
        wait_for_turn(&mut app).await;

        app.new_chat();
        assert_eq!(app.screen, Screen::Compose);
        assert!(app.conversation.messages().is_empty());
        // the previous result is still there to revisit
        app.open_result();
        assert_eq!(app.screen, Screen::Result);
    }
}
