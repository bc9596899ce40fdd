//! Configuration system: the zone registry and hardware settings.
//!
//! The configuration is a TOML file with one table per zone plus optional
//! hardware sections:
//!
//! ```toml
//! [strip]
//! channel = 1          # Channel number on the LED rendering server
//! led_type = 0         # Server's numeric strip type
//! invert = false
//! brightness = 255     # 0-255
//! gpio_pin = 18
//! # led_count = 60     # Optional; derived from the zones when absent
//!
//! [inputs]
//! touch_status = "/run/megaoperation/touched"
//! button_value = "/sys/class/gpio/gpio24/value"
//!
//! [audio]
//! player = ["aplay", "-q"]
//!
//! [zones.Butterflies]
//! sensor = 3           # Touch channel, or "nose" for the indicator segment
//! led_start = 10
//! led_length = 2
//! led_on_time = 2      # Seconds
//! led_color = "red"    # Color name or "random"
//! music_fnpath = "/home/pi/sounds/butterflies.wav"
//! ```
//!
//! Loading happens in three stages: read the file, deserialize it into raw
//! structures ([`loading`]) and validate those into the typed [`Config`]
//! ([`validation`]). Anything malformed fails here, never mid-operation.

pub mod loading;
pub mod validation;


use std::path::PathBuf;
use std::time::Duration;

use crate::colors::ColorPolicy;

pub use loading::{default_config_path, load_from_path, parse_config};

/// Index of a zone in the registry.
pub type ZoneIndex = usize;

/// What a zone's `sensor` value binds it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorBinding {
    /// A touch electrode on the sensor.
    Channel(u8),
    /// The zone holds the aggregate indicator segment.
    Indicator,
    /// Not a touch zone; only reserves its LED segment.
    Reserved,
}

impl SensorBinding {
    pub fn channel(self) -> Option<u8> {
        match self {
            SensorBinding::Channel(channel) => Some(channel),
            SensorBinding::Indicator | SensorBinding::Reserved => None,
        }
    }
}

/// A contiguous range of LEDs on the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u32,
    pub length: u32,
}

impl Segment {
    pub fn end(self) -> u32 {
        self.start + self.length
    }
}

/// One validated zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    pub id: String,
    pub sensor: SensorBinding,
    pub segment: Segment,
    pub color: ColorPolicy,
    pub duration: Duration,
    pub sound: Option<PathBuf>,
}

/// All zones plus the strip length they were validated against.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRegistry {
    zones: Vec<ZoneConfig>,
    strip_length: u32,
}

impl ZoneRegistry {
    pub(crate) fn new(zones: Vec<ZoneConfig>, strip_length: u32) -> Self {
        Self {
            zones,
            strip_length,
        }
    }

    pub fn zones(&self) -> &[ZoneConfig] {
        &self.zones
    }

    pub fn get(&self, index: ZoneIndex) -> Option<&ZoneConfig> {
        self.zones.get(index)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn strip_length(&self) -> u32 {
        self.strip_length
    }

    /// Zones that take part in edge scanning, with their channel.
    pub fn touch_zones(&self) -> impl Iterator<Item = (ZoneIndex, u8)> + '_ {
        self.zones
            .iter()
            .enumerate()
            .filter_map(|(index, zone)| zone.sensor.channel().map(|channel| (index, channel)))
    }

    /// The zone carrying the aggregate indicator, if configured.
    pub fn indicator_zone(&self) -> Option<&ZoneConfig> {
        self.zones
            .iter()
            .find(|zone| zone.sensor == SensorBinding::Indicator)
    }
}

/// Parameters of the `setup` command sent to the rendering server.
#[derive(Debug, Clone, PartialEq)]
pub struct StripSetup {
    pub channel: u8,
    pub led_count: u32,
    pub led_type: u8,
    pub invert: bool,
    pub brightness: u8,
    pub gpio_pin: u8,
}

/// Input device locations.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPaths {
    pub touch_status: PathBuf,
    pub button_value: PathBuf,
}

/// Audio player settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSettings {
    /// Program and leading arguments; the sound path is appended.
    pub player: Vec<String>,
}

/// Fully validated application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub strip: StripSetup,
    pub inputs: InputPaths,
    pub audio: AudioSettings,
    pub zones: ZoneRegistry,
}

impl Config {
    /// Load and validate the configuration at `path`.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        load_from_path(path)
    }

    /// Log a summary of the loaded configuration.
    pub fn log_config(&self) {
        log_block_start!(
            "Strip: channel {}, {} LEDs, type {}, brightness {}, gpio {}{}",
            self.strip.channel,
            self.strip.led_count,
            self.strip.led_type,
            self.strip.brightness,
            self.strip.gpio_pin,
            if self.strip.invert { ", inverted" } else { "" }
        );
        log_decorated!("Zones:");
        for zone in self.zones.zones() {
            let binding = match zone.sensor {
                SensorBinding::Channel(channel) => format!("channel {channel}"),
                SensorBinding::Indicator => "indicator".to_string(),
                SensorBinding::Reserved => "reserved".to_string(),
            };
            let color = match &zone.color {
                ColorPolicy::Named(name) => name.as_str(),
                ColorPolicy::Random => "random",
            };
            log_indented!(
                "{}: {binding}, leds {}+{}, {color}, {:.1}s{}",
                zone.id,
                zone.segment.start,
                zone.segment.length,
                zone.duration.as_secs_f64(),
                if zone.sound.is_some() { ", sound" } else { "" }
            );
        }
    }
}
