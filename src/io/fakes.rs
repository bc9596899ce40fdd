//! In-memory inputs and player for exercising the orchestrator without hardware.
//!
//! Each fake is a cheap handle around shared state: keep one clone in the test
//! and hand the other to the code under test.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{ButtonInput, SoundPlayer, TouchSensor};

/// Touch sensor whose bitmask is set by the test.
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    touched: Arc<Mutex<u16>>,
    failing: Arc<AtomicBool>,
}

impl ScriptedSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, bits: u16) {
        *self.touched.lock().unwrap() = bits;
    }

    pub fn touch(&self, channel: u8) {
        *self.touched.lock().unwrap() |= 1 << channel;
    }

    pub fn release(&self, channel: u8) {
        *self.touched.lock().unwrap() &= !(1 << channel);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl TouchSensor for ScriptedSensor {
    fn read_touched(&mut self) -> Result<u16> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("simulated sensor read failure");
        }
        Ok(*self.touched.lock().unwrap())
    }
}

/// Push-button whose level is set by the test. Starts released (`true`).
#[derive(Clone)]
pub struct ScriptedButton {
    level: Arc<AtomicBool>,
}

impl Default for ScriptedButton {
    fn default() -> Self {
        Self {
            level: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl ScriptedButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.level.store(false, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.level.store(true, Ordering::SeqCst);
    }
}

impl ButtonInput for ScriptedButton {
    fn read_level(&mut self) -> Result<bool> {
        Ok(self.level.load(Ordering::SeqCst))
    }
}

/// Player that records every requested sound. `is_playing` is set by the test.
#[derive(Clone, Default)]
pub struct RecordingPlayer {
    played: Arc<Mutex<Vec<PathBuf>>>,
    playing: Arc<AtomicBool>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().unwrap().clone()
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }
}

impl SoundPlayer for RecordingPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        self.played.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}
