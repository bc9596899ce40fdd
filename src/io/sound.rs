//! Sound playback through an external player process.
//!
//! Each `play` spawns the configured player with the sound path appended and
//! keeps the child so `is_playing` can poll it. Children are reaped lazily
//! with `try_wait`.

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use super::SoundPlayer;

pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    children: Mutex<Vec<Child>>,
}

impl CommandPlayer {
    /// `command` is the program followed by its leading arguments.
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("Player command must name a program")?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            children: Mutex::new(Vec::new()),
        })
    }
}

impl SoundPlayer for CommandPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            bail!("Sound file not found: {}", path.display());
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start sound player '{}'", self.program))?;

        let mut children = self
            .children
            .lock()
            .map_err(|_| anyhow::anyhow!("Sound player lock poisoned"))?;
        reap_finished(&mut children);
        children.push(child);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        let Ok(mut children) = self.children.lock() else {
            return false;
        };
        reap_finished(&mut children);
        !children.is_empty()
    }
}

#[cfg(test)]
impl CommandPlayer {
    /// Number of player processes that have not been reaped yet.
    fn tracked(&self) -> usize {
        self.children.lock().map(|children| children.len()).unwrap_or(0)
    }
}

/// Drop children that have exited, collecting their exit status.
fn reap_finished(children: &mut Vec<Child>) {
    children.retain_mut(|child| matches!(child.try_wait(), Ok(None)));
}
