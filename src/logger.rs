//! Structured logging with box-drawing output.
//!
//! Every line carries a wall-clock timestamp and the name of the thread that
//! emitted it, so effect threads show up under their zone name. Output goes to
//! stdout unless `--log` routed it to a file through [`Log::start_file_logging`].
//!
//! ## Logging Conventions
//!
//! - **`log_block_start!`**: opens a new conceptual block (`┃` spacer, then `┣ message`).
//! - **`log_decorated!`**: a line inside the current block (`┣ message`).
//! - **`log_indented!`**: detail belonging to the previous line (`┃   message`).
//! - **`log_pipe!`**: an empty `┃` spacer, used before a semantic macro that starts a block.
//! - **`log_version!`** / **`log_end!`**: the startup header and the final `╹` marker.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_critical!`, `log_debug!`**: semantic
//!   `[LEVEL]` lines. `log_debug!` only prints once [`Log::set_debug`] enabled it.
//! - **`log_error_exit!`**: terminal error line (`┗[ERROR]`) printed right before a failing exit.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Process-wide switches for the logging macros.
pub struct Log;

impl Log {
    /// Enable or disable all output, e.g. to keep test runs quiet.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable `log_debug!` output.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all further output to `file_path` through a writer thread.
    ///
    /// The returned guard flushes and joins the writer when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file_path)?;

                loop {
                    match rx.recv() {
                        Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                        Ok(LogMessage::Shutdown) | Err(_) => {
                            file.flush()?;
                            break;
                        }
                    }
                }

                Ok::<(), anyhow::Error>(())
            })?;

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// `[HH:MM:SS.mmm] [thread      ] ` prefix for every line.
    pub fn line_prefix() -> String {
        let now = chrono::Local::now();
        let current = std::thread::current();
        let thread = current.name().unwrap_or("unnamed");
        format!("[{}] [{:<12.12}] ", now.format("%H:%M:%S%.3f"), thread)
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write already formatted text to the active destination (needed by macros).
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        // Lock once so lines from concurrent effect threads stay whole
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Emit `message` behind `marker`, one prefixed line per message line.
pub fn emit(marker: &str, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::line_prefix();
    write_output(&format!("{prefix}{marker}{message}\n"));
}

/// Emit a spacer line followed by `message`, opening a new block.
pub fn emit_block(marker: &str, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::line_prefix();
    write_output(&format!("{prefix}┃\n{prefix}{marker}{message}\n"));
}

// # Logging Macros

/// Log a decorated message, typically as part of an existing block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣ ", &format!($($arg)+))
    };
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::logger::emit("┃   ", &format!($($arg)+))
    };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit("┃", "")
    };
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::logger::emit_block("┣ ", &format!($($arg)+))
    };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            "┏ ",
            &format!("megaoperation v{} ━━╸", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit("╹", "")
    };
}

/// Log a warning message with pipe prefix and yellow-colored text.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log an error message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log an error message that ends the log flow, right before a failing exit.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::logger::emit_block("┗[\x1b[31mERROR\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log an informational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log a debug message; silent unless debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        if $crate::logger::Log::is_debug() {
            $crate::logger::emit("┣[\x1b[36mDEBUG\x1b[0m] ", &format!($($arg)+))
        }
    };
}

/// Log a critical message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::logger::emit("┣[\x1b[31mCRITICAL\x1b[0m] ", &format!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_sequences() {
        let colored = "┣[\x1b[33mWARNING\x1b[0m] zone busy";
        assert_eq!(strip_ansi_codes(colored), "┣[WARNING] zone busy");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_ansi_codes("fill 1,FF0000"), "fill 1,FF0000");
    }

    #[test]
    fn prefix_carries_thread_name() {
        let prefix = std::thread::Builder::new()
            .name("Butterflies".to_string())
            .spawn(Log::line_prefix)
            .unwrap()
            .join()
            .unwrap();
        assert!(prefix.contains("[Butterflies ]"), "prefix was {prefix}");
    }
}
