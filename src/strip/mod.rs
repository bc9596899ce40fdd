//! Driver for the external LED rendering server.
//!
//! The server reads a line-oriented text protocol from a device:
//!
//! ```text
//! setup <channel>,<ledCount>,<ledType>,<invert>,<brightness>,<gpioPin>
//! init
//! fill <channel>,<RRGGBB>[,<start>,<length>]
//! render <channel>
//! ```
//!
//! `fill` only stages colors; nothing changes on the strip until `render`.
//! The driver is shared between the main loop and every effect thread, so all
//! writes go through one mutex and a fill is never split from its render.

pub mod sink;

use anyhow::Result;
use std::fmt;
use std::sync::Mutex;

use crate::colors::Rgb;
use crate::config::{Segment, StripSetup};

pub use sink::{CommandSink, DeviceSink};
#[cfg(any(test, feature = "testing-support"))]
pub use sink::{MemorySink, SentCommand};

/// One protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Setup(StripSetup),
    Init,
    Fill {
        channel: u8,
        color: Rgb,
        segment: Option<Segment>,
    },
    Render {
        channel: u8,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Setup(setup) => write!(
                f,
                "setup {},{},{},{},{},{}",
                setup.channel,
                setup.led_count,
                setup.led_type,
                u8::from(setup.invert),
                setup.brightness,
                setup.gpio_pin
            ),
            Command::Init => write!(f, "init"),
            Command::Fill {
                channel,
                color,
                segment: Some(segment),
            } => write!(
                f,
                "fill {channel},{color},{},{}",
                segment.start, segment.length
            ),
            Command::Fill {
                channel,
                color,
                segment: None,
            } => write!(f, "fill {channel},{color}"),
            Command::Render { channel } => write!(f, "render {channel}"),
        }
    }
}

/// Serializes commands for one strip channel and sends them to a sink.
pub struct LedDriver {
    channel: u8,
    sink: Mutex<Box<dyn CommandSink>>,
}

impl LedDriver {
    pub fn new(channel: u8, sink: Box<dyn CommandSink>) -> Self {
        Self {
            channel,
            sink: Mutex::new(sink),
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    fn send_all(&self, commands: &[Command]) -> Result<()> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| anyhow::anyhow!("LED device lock poisoned"))?;

        for command in commands {
            log_debug!("strip <- {command}");
            sink.send(&format!("{command}\n"))?;
        }
        Ok(())
    }

    /// Configure and initialize the strip; sent once at startup.
    pub fn setup(&self, setup: &StripSetup) -> Result<()> {
        self.send_all(&[Command::Setup(setup.clone()), Command::Init])
    }

    /// Stage `color` on `segment`, or on the whole strip when `None`.
    pub fn fill(&self, color: Rgb, segment: Option<Segment>) -> Result<()> {
        self.send_all(&[Command::Fill {
            channel: self.channel,
            color,
            segment,
        }])
    }

    pub fn render(&self) -> Result<()> {
        self.send_all(&[Command::Render {
            channel: self.channel,
        }])
    }

    /// Stage `color` on the whole strip.
    pub fn fill_all(&self, color: Rgb) -> Result<()> {
        self.fill(color, None)
    }

    /// Fill `segment` (or the whole strip) and render it, holding the device
    /// for both commands.
    pub fn paint(&self, color: Rgb, segment: Option<Segment>) -> Result<()> {
        self.send_all(&[
            Command::Fill {
                channel: self.channel,
                color,
                segment,
            },
            Command::Render {
                channel: self.channel,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> (LedDriver, MemorySink) {
        let sink = MemorySink::new();
        (LedDriver::new(1, Box::new(sink.clone())), sink)
    }

    #[test]
    fn setup_sends_setup_then_init() {
        let (driver, sink) = driver();
        let setup = StripSetup {
            channel: 1,
            led_count: 60,
            led_type: 0,
            invert: true,
            brightness: 128,
            gpio_pin: 18,
        };

        driver.setup(&setup).unwrap();

        assert_eq!(sink.lines(), vec!["setup 1,60,0,1,128,18", "init"]);
    }

    #[test]
    fn ranged_and_unranged_fill() {
        let (driver, sink) = driver();

        driver
            .fill(Rgb::new(0xFF0000), Some(Segment { start: 10, length: 2 }))
            .unwrap();
        driver.fill_all(Rgb::OFF).unwrap();
        driver.render().unwrap();

        assert_eq!(
            sink.lines(),
            vec!["fill 1,FF0000,10,2", "fill 1,000000", "render 1"]
        );
    }

    #[test]
    fn paint_keeps_fill_and_render_together() {
        let (driver, sink) = driver();
        let driver = std::sync::Arc::new(driver);

        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let driver = driver.clone();
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        driver
                            .paint(Rgb::new(0x00FF00), Some(Segment { start: i, length: 1 }))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 8 * 20 * 2);
        for pair in lines.chunks(2) {
            assert!(pair[0].starts_with("fill 1,00FF00,"), "{pair:?}");
            assert_eq!(pair[1], "render 1");
        }
    }

    #[test]
    fn write_failures_are_reported() {
        let (driver, sink) = driver();
        sink.set_failing(true);

        assert!(driver.render().is_err());
        assert!(sink.lines().is_empty());
    }
}
