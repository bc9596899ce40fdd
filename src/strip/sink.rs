//! Destinations for serialized strip commands.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Something that accepts one newline-terminated protocol line at a time.
pub trait CommandSink: Send {
    fn send(&mut self, line: &str) -> Result<()>;
}

/// Writes each command to the rendering server's device with its own
/// open-write-close, so the server sees end-of-write as a command boundary.
pub struct DeviceSink {
    path: PathBuf,
}

impl DeviceSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandSink for DeviceSink {
    fn send(&mut self, line: &str) -> Result<()> {
        let mut device = std::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open LED device {}", self.path.display()))?;

        device
            .write_all(line.as_bytes())
            .with_context(|| format!("Failed to write to LED device {}", self.path.display()))?;

        // Device is closed when dropped
        Ok(())
    }
}

#[cfg(any(test, feature = "testing-support"))]
pub use memory::{MemorySink, SentCommand};

#[cfg(any(test, feature = "testing-support"))]
mod memory {
    use super::CommandSink;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// One command captured by [`MemorySink`].
    #[derive(Debug, Clone)]
    pub struct SentCommand {
        pub at: Instant,
        /// The line without its trailing newline.
        pub line: String,
    }

    /// Records commands in memory; clones share the same log.
    #[derive(Clone, Default)]
    pub struct MemorySink {
        sent: Arc<Mutex<Vec<SentCommand>>>,
        failing: Arc<Mutex<bool>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn commands(&self) -> Vec<SentCommand> {
            self.sent.lock().unwrap().clone()
        }

        pub fn lines(&self) -> Vec<String> {
            self.commands().into_iter().map(|cmd| cmd.line).collect()
        }

        pub fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }

        /// Make every following send fail, as an unplugged device would.
        pub fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    impl CommandSink for MemorySink {
        fn send(&mut self, line: &str) -> Result<()> {
            if *self.failing.lock().unwrap() {
                anyhow::bail!("simulated device failure");
            }
            self.sent.lock().unwrap().push(SentCommand {
                at: Instant::now(),
                line: line.trim_end_matches('\n').to_string(),
            });
            Ok(())
        }
    }
}
