//! Power-on self test: cycle the whole strip through the test colors.

use std::time::Duration;

use crate::colors::{self, Rgb};
use crate::constants::POST_COLORS;
use crate::io::signals::SignalState;
use crate::strip::LedDriver;

/// Show each POST color on the whole strip for `delay`, then turn it off.
///
/// Write failures are logged and the sequence continues, so a missing
/// renderer shows up in the log instead of blocking startup. A shutdown
/// request cuts the hold short; the strip is still turned off.
///
/// Returns `false` if the test was interrupted.
pub fn run_post(driver: &LedDriver, delay: Duration, signals: &SignalState) -> bool {
    log_block_start!("Running LED self test ({:.2}s per color)", delay.as_secs_f64());

    let mut completed = true;
    for name in POST_COLORS {
        let Some(color) = colors::lookup(name) else {
            continue;
        };
        log_indented!("{name} ({color})");
        paint_all(driver, color);
        if signals.wait_for_shutdown(delay) {
            completed = false;
            break;
        }
    }

    paint_all(driver, Rgb::OFF);
    if completed {
        log_decorated!("Self test complete");
    } else {
        log_decorated!("Self test interrupted");
    }
    completed
}

fn paint_all(driver: &LedDriver, color: Rgb) {
    if let Err(e) = driver.paint(color, None) {
        log_error!("Self test failed to render {color}: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::MemorySink;

    #[test]
    fn cycles_colors_then_turns_off() {
        let sink = MemorySink::new();
        let driver = LedDriver::new(1, Box::new(sink.clone()));

        assert!(run_post(&driver, Duration::from_millis(1), &SignalState::detached()));

        assert_eq!(
            sink.lines(),
            vec![
                "fill 1,FF0000",
                "render 1",
                "fill 1,00FF00",
                "render 1",
                "fill 1,0000FF",
                "render 1",
                "fill 1,FFFFFF",
                "render 1",
                "fill 1,000000",
                "render 1",
            ]
        );
    }

    #[test]
    fn holds_each_color_for_the_delay() {
        let sink = MemorySink::new();
        let driver = LedDriver::new(1, Box::new(sink.clone()));

        run_post(&driver, Duration::from_millis(20), &SignalState::detached());

        let commands = sink.commands();
        for pair in commands.windows(3).step_by(2) {
            // render of one color to the fill of the next
            assert!(pair[2].at.duration_since(pair[1].at) >= Duration::from_millis(20));
        }
    }

    #[test]
    fn shutdown_cuts_hold_short_and_blanks() {
        let sink = MemorySink::new();
        let driver = LedDriver::new(1, Box::new(sink.clone()));
        let signals = SignalState::detached();
        signals.request_shutdown();

        let start = std::time::Instant::now();
        assert!(!run_post(&driver, Duration::from_secs(30), &signals));
        assert!(start.elapsed() < Duration::from_secs(5));

        assert_eq!(
            sink.lines(),
            vec!["fill 1,FF0000", "render 1", "fill 1,000000", "render 1"]
        );
    }
}
