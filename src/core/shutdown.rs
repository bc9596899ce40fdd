//! Shutdown coordination: blank the strip, then wait for every effect.

use crate::colors::Rgb;
use crate::strip::LedDriver;

use super::scheduler::ZoneScheduler;

/// Turn the whole strip off and block until all effect threads have ended.
///
/// Effects are never cancelled; each one finishes within its own duration,
/// so no timeout is applied.
pub fn shutdown(driver: &LedDriver, scheduler: &mut ZoneScheduler) {
    log_block_start!("Shutting down: turning all LEDs off");
    if let Err(e) = driver.paint(Rgb::OFF, None) {
        log_error!("Failed to turn the strip off: {e:#}");
    }

    let running = scheduler.running_count();
    if running > 0 {
        log_decorated!("Waiting for {running} running effect(s) to finish...");
    }
    scheduler.wait_all();
    log_decorated!("All effects finished");
}
