use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::info;

use crate::error::Result;
use crate::state::PromptResult;
use crate::store::PromptStore;

/// How long the "copied" acknowledgment stays up.
pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_secs(2);

/// What the result screen should do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Loading,
    Ready(PromptResult),
    /// Nothing to show and nothing coming; go back to the input screen.
    Redirect,
}

impl ResultView {
    pub fn from_store(store: &PromptStore) -> Self {
        if store.is_generating() {
            return ResultView::Loading;
        }
        match store.result() {
            Some(result) => ResultView::Ready(result),
            None => ResultView::Redirect,
        }
    }
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// File name for a downloaded prompt: whitespace runs become `_`.
pub fn download_filename(title: &str) -> String {
    format!("{}.txt", whitespace_runs().replace_all(title, "_"))
}

/// Write the prompt text verbatim into `dir`, returning the file path.
pub fn save_prompt(result: &PromptResult, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(download_filename(&result.title));
    fs::write(&path, &result.prompt)?;
    info!(path = %path.display(), "Saved prompt");
    Ok(path)
}

/// Transient "copied" acknowledgment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFeedback {
    copied_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn mark(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.copied_at
            .map(|at| now.saturating_duration_since(at) < COPY_FEEDBACK_WINDOW)
            .unwrap_or(false)
    }
}
