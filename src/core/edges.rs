//! Debounced edge source: sensor and button levels into discrete events.

use crate::config::{ZoneIndex, ZoneRegistry};
use crate::io::{ButtonInput, TouchSensor};

/// Levels remembered between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceState {
    pub current: u16,
    pub previous: u16,
    pub button_level: bool,
}

impl DebounceState {
    fn is_new_touch(&self, channel: u8) -> bool {
        let bit = 1u16 << channel;
        self.current & bit != 0 && self.previous & bit == 0
    }

    fn is_new_release(&self, channel: u8) -> bool {
        let bit = 1u16 << channel;
        self.current & bit == 0 && self.previous & bit != 0
    }
}

/// Events observed during one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeReport {
    /// Zones whose channel was newly touched.
    pub touched: Vec<ZoneIndex>,
    /// Zones whose channel was released. Informational only.
    pub released: Vec<ZoneIndex>,
    pub button_changed: bool,
    /// Current button level (`true` = not pressed).
    pub button_level: bool,
}

pub struct EdgeSource {
    sensor: Box<dyn TouchSensor>,
    button: Box<dyn ButtonInput>,
    /// Touch zones and their channels, fixed at startup
    channels: Vec<(ZoneIndex, u8)>,
    state: DebounceState,
}

impl EdgeSource {
    /// Prime the debounce state from one read of each input.
    ///
    /// Channels held at startup therefore do not count as new touches.
    pub fn new(
        mut sensor: Box<dyn TouchSensor>,
        mut button: Box<dyn ButtonInput>,
        zones: &ZoneRegistry,
    ) -> anyhow::Result<Self> {
        let touched = sensor.read_touched()?;
        let button_level = button.read_level()?;

        Ok(Self {
            sensor,
            button,
            channels: zones.touch_zones().collect(),
            state: DebounceState {
                current: touched,
                previous: touched,
                button_level,
            },
        })
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Read both inputs once and report what changed since the last poll.
    ///
    /// A failed read keeps the last known level, so a flaky bus never
    /// produces phantom edges.
    pub fn poll(&mut self) -> EdgeReport {
        let touched = match self.sensor.read_touched() {
            Ok(bits) => bits,
            Err(e) => {
                log_warning!("Touch sensor read failed: {e:#}");
                self.state.current
            }
        };
        self.state.previous = self.state.current;
        self.state.current = touched;

        let mut report = EdgeReport::default();

        if self.state.current != self.state.previous {
            for &(zone, channel) in &self.channels {
                if self.state.is_new_touch(channel) {
                    report.touched.push(zone);
                } else if self.state.is_new_release(channel) {
                    report.released.push(zone);
                }
            }
        }

        let level = match self.button.read_level() {
            Ok(level) => level,
            Err(e) => {
                log_warning!("Push-button read failed: {e:#}");
                self.state.button_level
            }
        };
        report.button_changed = level != self.state.button_level;
        report.button_level = level;
        self.state.button_level = level;

        report
    }
}
