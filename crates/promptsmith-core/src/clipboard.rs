use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

/// Clipboard helpers tried in order, with their arguments.
const HELPERS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

/// Fire-and-forget copy through the first clipboard helper that starts.
///
/// Never blocks on the helper; returns whether one was started.
pub fn copy(text: &str) -> bool {
    copy_with(HELPERS, text)
}

fn copy_with(helpers: &[(&'static str, &'static [&'static str])], text: &str) -> bool {
    for &(program, args) in helpers {
        let Ok(mut child) = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            continue;
        };

        let stdin = child.stdin.take();
        let text = text.to_string();
        // Feed and reap off the caller's thread
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(text.as_bytes()) {
                    warn!(program, error = %e, "Clipboard helper rejected input");
                }
            }
            let _ = child.wait();
        });

        debug!(program, "Copied to clipboard");
        return true;
    }
    warn!("No clipboard helper available, copy skipped");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const MISSING: (&str, &[&str]) = ("promptsmith-no-such-helper", &[]);
    const CAT: (&str, &[&str]) = ("cat", &[]);
    const SLOW: (&str, &[&str]) = ("sleep", &["5"]);

    #[test]
    fn test_missing_helpers_fall_through() {
        assert!(!copy_with(&[MISSING], "x"));
        assert!(copy_with(&[MISSING, CAT], "x"));
    }

    #[test]
    fn test_copy_does_not_wait_for_helper() {
        let start = Instant::now();
        assert!(copy_with(&[SLOW], "prompt text"));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
