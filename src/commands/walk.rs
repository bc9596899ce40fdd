//! Walk mode: light one LED at a time so zone boundaries can be measured.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;

use crate::colors::{self, Rgb};
use crate::config::Segment;
use crate::constants::{TICK_INTERVAL, WALK_COLOR};
use crate::io::signals::SignalState;
use crate::strip::LedDriver;

/// What the operator did between two steps.
enum Step {
    Next,
    Quit,
    Interrupted,
}

/// Step through positions `0..strip_length`, waiting for an operator line
/// between steps. A line starting with `q` (or end of input) stops the walk,
/// and so does a shutdown request.
///
/// Input is read on its own thread so a blocked read never delays shutdown.
/// Returns the number of positions shown.
pub fn walk_leds<R>(
    driver: &LedDriver,
    strip_length: u32,
    input: R,
    signals: &SignalState,
) -> Result<u32>
where
    R: BufRead + Send + 'static,
{
    let color = colors::lookup(WALK_COLOR).unwrap_or(Rgb::new(0xFFFFFF));
    let lines = spawn_reader(input)?;

    log_block_start!("Walking {strip_length} LEDs");
    log_indented!("Press Enter for the next LED, 'q' then Enter to stop");

    let mut shown = 0;
    for position in 0..strip_length {
        let segment = Some(Segment {
            start: position,
            length: 1,
        });

        driver
            .paint(color, segment)
            .with_context(|| format!("Failed to light LED {position}"))?;
        shown += 1;
        log_decorated!("LED {position}");

        let step = next_step(&lines, signals);

        driver
            .paint(Rgb::OFF, segment)
            .with_context(|| format!("Failed to clear LED {position}"))?;

        match step? {
            Step::Next => {}
            Step::Quit => break,
            Step::Interrupted => {
                log_decorated!("Walk interrupted");
                break;
            }
        }
    }

    log_decorated!("Walk finished after {shown} LED(s)");
    Ok(shown)
}

type Line = std::io::Result<Option<String>>;

fn spawn_reader<R>(mut input: R) -> Result<Receiver<Line>>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();

    thread::Builder::new()
        .name("walk-input".to_string())
        .spawn(move || {
            loop {
                let mut line = String::new();
                let read = match input.read_line(&mut line) {
                    Ok(0) => Ok(None),
                    Ok(_) => Ok(Some(line)),
                    Err(e) => Err(e),
                };
                let done = !matches!(read, Ok(Some(_)));
                if sender.send(read).is_err() || done {
                    break;
                }
            }
        })
        .context("Failed to start operator input thread")?;

    Ok(receiver)
}

fn next_step(lines: &Receiver<Line>, signals: &SignalState) -> Result<Step> {
    loop {
        if !signals.is_running() {
            return Ok(Step::Interrupted);
        }
        match lines.recv_timeout(TICK_INTERVAL) {
            Ok(Ok(Some(line))) if line.trim_start().starts_with(['q', 'Q']) => {
                return Ok(Step::Quit);
            }
            Ok(Ok(Some(_))) => return Ok(Step::Next),
            Ok(Ok(None)) | Err(RecvTimeoutError::Disconnected) => return Ok(Step::Quit),
            Ok(Err(e)) => return Err(e).context("Failed to read operator input"),
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::MemorySink;
    use std::io::{BufReader, Cursor, Read};
    use std::time::{Duration, Instant};

    fn driver() -> (LedDriver, MemorySink) {
        let sink = MemorySink::new();
        (LedDriver::new(1, Box::new(sink.clone())), sink)
    }

    #[test]
    fn walks_every_position() {
        let (driver, sink) = driver();

        let shown = walk_leds(&driver, 3, Cursor::new("\n\n\n"), &SignalState::detached()).unwrap();

        assert_eq!(shown, 3);
        assert_eq!(
            sink.lines(),
            vec![
                "fill 1,FFFFFF,0,1",
                "render 1",
                "fill 1,000000,0,1",
                "render 1",
                "fill 1,FFFFFF,1,1",
                "render 1",
                "fill 1,000000,1,1",
                "render 1",
                "fill 1,FFFFFF,2,1",
                "render 1",
                "fill 1,000000,2,1",
                "render 1",
            ]
        );
    }

    #[test]
    fn quit_stops_early_and_clears() {
        let (driver, sink) = driver();

        let shown = walk_leds(&driver, 10, Cursor::new("\nq\n"), &SignalState::detached()).unwrap();

        assert_eq!(shown, 2);
        assert_eq!(sink.lines().last().unwrap(), "render 1");
        assert_eq!(sink.lines()[sink.lines().len() - 2], "fill 1,000000,1,1");
    }

    #[test]
    fn end_of_input_stops() {
        let (driver, _) = driver();
        assert_eq!(walk_leds(&driver, 10, Cursor::new(""), &SignalState::detached()).unwrap(), 1);
    }

    #[test]
    fn device_failure_is_an_error() {
        let (driver, sink) = driver();
        sink.set_failing(true);
        assert!(walk_leds(&driver, 10, Cursor::new("\n"), &SignalState::detached()).is_err());
    }

    /// Input that never delivers a line, like an idle terminal.
    struct Idle;

    impl Read for Idle {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            std::thread::sleep(Duration::from_secs(60));
            Ok(0)
        }
    }

    #[test]
    fn shutdown_stops_a_blocked_walk_and_clears() {
        let (driver, sink) = driver();
        let signals = SignalState::detached();
        let running = signals.running.clone();
        let sender = signals.signal_sender.clone();

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            running.store(false, std::sync::atomic::Ordering::SeqCst);
            let _ = sender.send(crate::io::signals::SignalMessage::Shutdown);
        });

        let start = Instant::now();
        let shown = walk_leds(&driver, 10, BufReader::new(Idle), &signals).unwrap();

        assert_eq!(shown, 1);
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(
            sink.lines(),
            vec!["fill 1,FFFFFF,0,1", "render 1", "fill 1,000000,0,1", "render 1"]
        );
    }
}
