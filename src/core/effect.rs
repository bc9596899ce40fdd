//! Effect runner: one bounded light (and optional sound) cycle per trigger.
//!
//! A run resolves the zone color, paints the segment, maybe starts the zone
//! sound, holds for the zone duration and paints the segment off again. Every
//! failure along the way is cosmetic: it is logged and the run carries on, so
//! the completion flag is always set.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::colors::{self, Resolved, Rgb};
use crate::config::ZoneConfig;
use crate::io::SoundPlayer;
use crate::strip::LedDriver;

/// Process-wide sound settings from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundPolicy {
    pub enabled: bool,
    /// Start a zone sound even while another sound is playing.
    pub allow_overlap: bool,
}

impl Default for SoundPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_overlap: false,
        }
    }
}

/// What happened to a zone's sound during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundOutcome {
    NotConfigured,
    Disabled,
    /// Another sound was playing and overlap is not allowed.
    Suppressed,
    Started,
    Failed,
}

/// Shared dependencies of every effect run.
#[derive(Clone)]
pub struct EffectRunner {
    driver: Arc<LedDriver>,
    player: Arc<dyn SoundPlayer>,
    sound: SoundPolicy,
}

impl EffectRunner {
    pub fn new(driver: Arc<LedDriver>, player: Arc<dyn SoundPlayer>, sound: SoundPolicy) -> Self {
        Self {
            driver,
            player,
            sound,
        }
    }

    /// Run the whole cycle for `zone` on the calling thread.
    pub fn run(&self, zone: &ZoneConfig) {
        let resolved = colors::resolve(&zone.color);
        let color = resolved.rgb();
        match resolved {
            Resolved::Named(_) => {}
            Resolved::Random(rgb) => log_debug!("Zone '{}' picked random color {rgb}", zone.id),
            Resolved::Fallback(rgb) => log_warning!(
                "Zone '{}' color is not in the color table, using random color {rgb}",
                zone.id
            ),
        }

        log_decorated!(
            "Zone '{}' on: {color} for {:.1}s",
            zone.id,
            zone.duration.as_secs_f64()
        );
        self.paint(zone, color);

        match self.start_sound(zone) {
            SoundOutcome::Suppressed => {
                log_debug!("Zone '{}' sound skipped; another sound is playing", zone.id)
            }
            SoundOutcome::Started => log_debug!("Zone '{}' sound started", zone.id),
            _ => {}
        }

        thread::sleep(zone.duration);

        self.paint(zone, Rgb::OFF);
        log_decorated!("Zone '{}' off", zone.id);
    }

    fn paint(&self, zone: &ZoneConfig, color: Rgb) {
        if let Err(e) = self.driver.paint(color, Some(zone.segment)) {
            log_error!("Zone '{}' failed to paint {color}: {e:#}", zone.id);
        }
    }

    /// Start the zone sound if the policy allows it. Never waits for playback.
    pub fn start_sound(&self, zone: &ZoneConfig) -> SoundOutcome {
        let Some(path) = &zone.sound else {
            return SoundOutcome::NotConfigured;
        };
        if !self.sound.enabled {
            return SoundOutcome::Disabled;
        }
        if !self.sound.allow_overlap && self.player.is_playing() {
            return SoundOutcome::Suppressed;
        }

        match self
            .player
            .play(path)
            .with_context(|| format!("Zone '{}' sound failed", zone.id))
        {
            Ok(()) => SoundOutcome::Started,
            Err(e) => {
                log_error!("{e:#}");
                SoundOutcome::Failed
            }
        }
    }

    /// Run the cycle on a new thread named after the zone.
    pub fn spawn(&self, zone: ZoneConfig) -> Result<EffectHandle> {
        let done = Arc::new(AtomicBool::new(false));
        let guard = DoneGuard(done.clone());
        let runner = self.clone();

        let thread = thread::Builder::new()
            .name(zone.id.clone())
            .spawn(move || {
                let _guard = guard;
                runner.run(&zone);
            })
            .context("Failed to start effect thread")?;

        Ok(EffectHandle { done, thread })
    }
}

/// Sets the completion flag when the effect thread ends, even by panic.
struct DoneGuard(Arc<AtomicBool>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A running (or finished) effect, observed by the scheduler.
pub struct EffectHandle {
    done: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl EffectHandle {
    /// Non-blocking completion check.
    pub fn is_finished(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Block until the effect has finished its cycle.
    pub fn wait(self) {
        let name = self.thread.thread().name().unwrap_or("effect").to_string();
        if self.thread.join().is_err() {
            log_critical!("Effect thread '{name}' panicked");
        }
    }
}
