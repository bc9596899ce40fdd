//! Hardware and process boundaries.
//!
//! The orchestrator only sees these traits; the concrete adapters read the
//! files exported by the touch controller and GPIO drivers and spawn an
//! external audio player.

pub mod inputs;
pub mod signals;
pub mod sound;

#[cfg(any(test, feature = "testing-support"))]
pub mod fakes;

use anyhow::Result;
use std::path::Path;

/// Capacitive touch controller.
pub trait TouchSensor: Send {
    /// Current touch state, one bit per electrode (bit N = channel N).
    fn read_touched(&mut self) -> Result<u16>;
}

/// Push-button input behind a pull-up and a hardware glitch filter.
pub trait ButtonInput: Send {
    /// Logical level: `true` when released, `false` while held down.
    fn read_level(&mut self) -> Result<bool>;
}

/// Audio playback.
#[cfg_attr(test, mockall::automock)]
pub trait SoundPlayer: Send + Sync {
    /// Start playing `path` without waiting for it to finish.
    fn play(&self, path: &Path) -> Result<()>;

    /// Whether any sound started by this player is still playing.
    fn is_playing(&self) -> bool;
}

pub use inputs::{GpioValueButton, StatusFileSensor};
pub use sound::CommandPlayer;
