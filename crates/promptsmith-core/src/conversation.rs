//! The prompt conversation
//!
//! `Conversation` owns the input line, the append-only message history and the
//! remote session. Work that needs the network is handed out as a [`Turn`] so
//! a UI loop can run it in the background and feed the [`TurnOutcome`] back
//! through [`Conversation::complete`]. [`Conversation::send`] does all three
//! steps inline.
//!
//! Every turn remembers the conversation epoch it was issued in. Starting a
//! new chat bumps the epoch, and outcomes from an older epoch are dropped
//! instead of leaking into the fresh conversation.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::client::{GenerateResponse, GenerationBackend, NewChatResponse};
use crate::error::PromptsmithError;
use crate::render::{result_description, result_title};
use crate::state::{
    iso_timestamp, ChatMessage, ChatRole, ConnectionStatus, GenerationMode, PromptRequest,
    PromptResult,
};
use crate::store::PromptStore;
use crate::template;

/// Server-provided error detail is cut to this many characters.
pub const MAX_DETAIL_CHARS: usize = 100;

pub const CONNECTION_ERROR_MESSAGE: &str =
    "I couldn't reach the prompt service. Check your connection and try again.";

const DECODE_ERROR_MESSAGE: &str = "The prompt service sent a reply I couldn't understand.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Remote mode without a session; the next turn must open one.
    SessionStart,
    Idle,
    AwaitingResponse,
}

/// Background work issued by the conversation.
#[derive(Debug, Clone)]
pub struct Turn {
    epoch: u64,
    kind: TurnKind,
}

#[derive(Debug, Clone)]
enum TurnKind {
    StartSession { previous: Option<String> },
    Local { request: PromptRequest },
    Remote {
        use_case: String,
        session_id: Option<String>,
        /// Handed to `/new_chat` if a session has to be opened first
        previous: Option<String>,
    },
}

/// What a [`Turn`] produced.
#[derive(Debug)]
pub struct TurnOutcome {
    epoch: u64,
    kind: OutcomeKind,
}

#[derive(Debug)]
enum OutcomeKind {
    SessionStarted(NewChatResponse),
    Generated(PromptResult),
    Replied {
        session_id: String,
        response: GenerateResponse,
    },
    Failed {
        error: PromptsmithError,
        /// A session opened during the turn before the failure.
        session_id: Option<String>,
    },
}

impl Turn {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub async fn run<B>(self, backend: &B, store: &PromptStore) -> TurnOutcome
    where
        B: GenerationBackend + ?Sized,
    {
        let kind = match self.kind {
            TurnKind::StartSession { previous } => match backend.new_chat(previous.as_deref()).await {
                Ok(resp) => OutcomeKind::SessionStarted(resp),
                Err(error) => OutcomeKind::Failed { error, session_id: None },
            },
            TurnKind::Local { request } => OutcomeKind::Generated(store.generate(request).await),
            TurnKind::Remote {
                use_case,
                session_id,
                previous,
            } => run_remote(backend, &use_case, session_id, previous).await,
        };
        TurnOutcome { epoch: self.epoch, kind }
    }
}

async fn run_remote<B>(
    backend: &B,
    use_case: &str,
    session_id: Option<String>,
    previous: Option<String>,
) -> OutcomeKind
where
    B: GenerationBackend + ?Sized,
{
    let session_id = match session_id {
        Some(id) => id,
        None => match backend.new_chat(previous.as_deref()).await {
            Ok(resp) => {
                debug!(session_id = %resp.session_id, "Opened session before generating");
                resp.session_id
            }
            Err(error) => return OutcomeKind::Failed { error, session_id: None },
        },
    };

    match backend.generate(use_case, &session_id).await {
        Ok(response) => OutcomeKind::Replied { session_id, response },
        Err(error) => OutcomeKind::Failed {
            error,
            session_id: Some(session_id),
        },
    }
}

/// Cut `detail` to [`MAX_DETAIL_CHARS`] characters, marking the cut with "...".
pub fn truncate_detail(detail: &str) -> String {
    match detail.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &detail[..byte_idx]),
        None => detail.to_string(),
    }
}

/// User-facing text for a failed turn.
pub fn describe_error(error: &PromptsmithError) -> String {
    match error {
        PromptsmithError::Transport(_) => CONNECTION_ERROR_MESSAGE.to_string(),
        PromptsmithError::Server { detail, .. } => {
            format!("Sorry, something went wrong: {}", truncate_detail(detail))
        }
        PromptsmithError::Decode(_) => DECODE_ERROR_MESSAGE.to_string(),
        other => format!("Sorry, something went wrong: {}", truncate_detail(&other.to_string())),
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct Conversation {
    mode: GenerationMode,
    store: PromptStore,

    input: String,
    cursor: usize,
    messages: Vec<ChatMessage>,
    phase: Phase,
    error: Option<String>,

    session_id: Option<String>,
    /// Session to hand to `/new_chat` when restarting
    restart_from: Option<String>,
    connection: ConnectionStatus,

    next_message_id: u64,
    epoch: u64,
}

impl Conversation {
    pub fn new(mode: GenerationMode, store: PromptStore) -> Self {
        Self {
            mode,
            store,
            input: String::new(),
            cursor: 0,
            messages: Vec::new(),
            phase: Self::resting_phase(mode, false),
            error: None,
            session_id: None,
            restart_from: None,
            connection: ConnectionStatus::Unknown,
            next_message_id: 1,
            epoch: 0,
        }
    }

    fn resting_phase(mode: GenerationMode, has_session: bool) -> Phase {
        match mode {
            GenerationMode::Remote if !has_session => Phase::SessionStart,
            _ => Phase::Idle,
        }
    }

    fn settle(&mut self) {
        self.phase = Self::resting_phase(self.mode, self.session_id.is_some());
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn store(&self) -> &PromptStore {
        &self.store
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn push_message(&mut self, role: ChatRole, text: String) {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            text,
            timestamp: Utc::now(),
        });
    }

    // Input editing

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.cursor = self.input.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Turns

    /// Open a remote session and fetch the greeting. Only valid while in
    /// [`Phase::SessionStart`].
    pub fn begin_session(&mut self) -> Option<Turn> {
        if self.phase != Phase::SessionStart {
            return None;
        }
        self.phase = Phase::AwaitingResponse;
        Some(Turn {
            epoch: self.epoch,
            kind: TurnKind::StartSession {
                previous: self.restart_from.clone(),
            },
        })
    }

    /// Accept the current input as a user message.
    ///
    /// Blank input and submissions while a turn is in flight are ignored.
    pub fn submit(&mut self) -> Option<Turn> {
        if self.is_awaiting() || self.input.trim().is_empty() {
            return None;
        }

        let use_case = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.error = None;
        self.push_message(ChatRole::User, use_case.clone());
        self.phase = Phase::AwaitingResponse;

        let kind = match self.mode {
            GenerationMode::Local => TurnKind::Local {
                request: PromptRequest::from_use_case(use_case),
            },
            GenerationMode::Remote => TurnKind::Remote {
                use_case,
                previous: match self.session_id {
                    Some(_) => None,
                    None => self.restart_from.clone(),
                },
                session_id: self.session_id.clone(),
            },
        };
        debug!(epoch = self.epoch, "Submitted turn");
        Some(Turn { epoch: self.epoch, kind })
    }

    /// Apply a finished turn. Returns false when the outcome belonged to an
    /// earlier conversation and was dropped.
    pub fn complete(&mut self, outcome: TurnOutcome) -> bool {
        if outcome.epoch != self.epoch {
            debug!(
                outcome_epoch = outcome.epoch,
                current_epoch = self.epoch,
                "Dropping outcome from a previous conversation"
            );
            return false;
        }

        match outcome.kind {
            OutcomeKind::SessionStarted(resp) => {
                info!(session_id = %resp.session_id, "Session started");
                self.connection = ConnectionStatus::Connected;
                self.restart_from = None;
                self.session_id = Some(resp.session_id);
                self.push_message(ChatRole::Bot, resp.prompt);
            }
            OutcomeKind::Generated(result) => {
                self.push_message(ChatRole::Bot, result.prompt);
            }
            OutcomeKind::Replied { session_id, response } => {
                self.connection = ConnectionStatus::Connected;
                self.restart_from = None;
                if response.is_final_prompt {
                    info!(%session_id, "Final prompt received, closing session");
                    self.session_id = None;
                    self.store.publish(self.final_result(&response.prompt));
                } else {
                    self.session_id = Some(session_id);
                }
                self.push_message(ChatRole::Bot, response.prompt);
            }
            OutcomeKind::Failed { error, session_id } => {
                warn!(error = %error, "Turn failed");
                if session_id.is_some() {
                    self.restart_from = None;
                    self.session_id = session_id;
                }
                self.connection = if error.is_transport() {
                    ConnectionStatus::Disconnected
                } else {
                    ConnectionStatus::Connected
                };
                let text = describe_error(&error);
                self.push_message(ChatRole::Bot, text.clone());
                self.error = Some(text);
            }
        }

        self.settle();
        true
    }

    /// Result for a prompt the service marked final, titled by what the user
    /// described during the conversation.
    fn final_result(&self, prompt: &str) -> PromptResult {
        let described = self
            .messages
            .iter()
            .filter(|m| m.role == ChatRole::User)
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let bucket = template::infer(&described);

        PromptResult {
            title: result_title(bucket.industry),
            prompt: prompt.to_string(),
            description: result_description(bucket.industry),
            timestamp: iso_timestamp(Utc::now()),
        }
    }

    /// Submit, run and complete in one go. Returns false if the input was
    /// rejected or the outcome was stale.
    pub async fn send<B>(&mut self, backend: &B) -> bool
    where
        B: GenerationBackend + ?Sized,
    {
        let Some(turn) = self.submit() else {
            return false;
        };
        let store = self.store.clone();
        let outcome = turn.run(backend, &store).await;
        self.complete(outcome)
    }

    /// Open a session inline. No-op unless in [`Phase::SessionStart`].
    pub async fn start_session<B>(&mut self, backend: &B) -> bool
    where
        B: GenerationBackend + ?Sized,
    {
        let Some(turn) = self.begin_session() else {
            return false;
        };
        let store = self.store.clone();
        let outcome = turn.run(backend, &store).await;
        self.complete(outcome)
    }

    /// Throw away the conversation and start over.
    pub fn new_chat(&mut self) {
        info!(epoch = self.epoch + 1, "Starting new chat");
        self.messages.clear();
        self.input.clear();
        self.cursor = 0;
        self.error = None;
        if let Some(previous) = self.session_id.take() {
            self.restart_from = Some(previous);
        }
        self.store.set_generating(false);
        self.epoch += 1;
        self.settle();
    }
}
