//! Terminal feedback while a completion is pending.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// Spinner line with elapsed whole seconds, e.g. `⠙ asking gemini-pro (3s)`.
fn render(frame: &str, message: &str, elapsed: Duration) -> String {
    format!("{frame} {message} ({}s)", elapsed.as_secs())
}

/// Draws on stderr from a background task so stdout stays answer-only.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: watch::Sender<bool>,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);
        let message = message.to_string();
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            for frame in FRAMES.iter().cycle() {
                // \x1b[2K clears the line, \r returns to column 0
                eprint!("\x1b[2K\r{}", render(frame, &message, started.elapsed()));
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancelled.changed() => break,
                }
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self { handle, cancel }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}
