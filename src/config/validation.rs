//! Configuration validation: raw file values into the typed registry.
//!
//! Every bound is checked here so that the runtime never has to: segments
//! must fit the strip, durations must be positive and touch channels must exist
//! on the sensor.

use anyhow::{Result, bail};
use std::time::Duration;

use super::loading::{RawConfig, RawSensor, RawZone};
use super::{
    AudioSettings, Config, InputPaths, Segment, SensorBinding, StripSetup, ZoneConfig,
    ZoneRegistry,
};
use crate::colors::ColorPolicy;
use crate::constants::*;

pub(crate) fn validate(raw: RawConfig) -> Result<Config> {
    if raw.zones.is_empty() {
        bail!("No zones configured; add at least one [zones.<name>] table");
    }

    let mut zones = Vec::with_capacity(raw.zones.len());
    for (id, raw_zone) in &raw.zones {
        zones.push(validate_zone(id, raw_zone)?);
    }

    let indicators: Vec<&str> = zones
        .iter()
        .filter(|zone| zone.sensor == SensorBinding::Indicator)
        .map(|zone| zone.id.as_str())
        .collect();
    if indicators.len() > 1 {
        bail!(
            "Only one indicator zone is allowed, found {}: {}",
            indicators.len(),
            indicators.join(", ")
        );
    }

    let derived_length = zones
        .iter()
        .map(|zone| zone.segment.end())
        .max()
        .unwrap_or(0);

    let strip_length = match raw.strip.led_count {
        Some(count) => {
            let count = non_negative_u32(count, "strip", "led_count")?;
            for zone in &zones {
                if zone.segment.end() > count {
                    bail!(
                        "Zone '{}' LEDs {}..{} exceed the strip length of {} (led_count)",
                        zone.id,
                        zone.segment.start,
                        zone.segment.end(),
                        count
                    );
                }
            }
            count
        }
        None => derived_length,
    };

    let brightness = match raw.strip.brightness {
        Some(value) if !(0..=255).contains(&value) => {
            bail!("strip brightness ({value}) must be between 0 and 255")
        }
        Some(value) => value as u8,
        None => DEFAULT_BRIGHTNESS,
    };

    let strip = StripSetup {
        channel: raw.strip.channel.unwrap_or(DEFAULT_STRIP_CHANNEL),
        led_count: strip_length,
        led_type: raw.strip.led_type.unwrap_or(DEFAULT_LED_TYPE),
        invert: raw.strip.invert.unwrap_or(false),
        brightness,
        gpio_pin: raw.strip.gpio_pin.unwrap_or(DEFAULT_GPIO_PIN),
    };

    let inputs = InputPaths {
        touch_status: raw
            .inputs
            .touch_status
            .unwrap_or_else(|| DEFAULT_TOUCH_STATUS_PATH.into()),
        button_value: raw
            .inputs
            .button_value
            .unwrap_or_else(|| DEFAULT_BUTTON_VALUE_PATH.into()),
    };

    let player = raw
        .audio
        .player
        .unwrap_or_else(|| DEFAULT_PLAYER_COMMAND.iter().map(|s| s.to_string()).collect());
    if player.is_empty() || player[0].trim().is_empty() {
        bail!("audio player command must name a program");
    }

    Ok(Config {
        strip,
        inputs,
        audio: AudioSettings { player },
        zones: ZoneRegistry::new(zones, strip_length),
    })
}

fn validate_zone(id: &str, raw: &RawZone) -> Result<ZoneConfig> {
    let sensor = parse_sensor(id, &raw.sensor)?;

    let start = non_negative_u32(raw.led_start, id, "led_start")?;
    let length = non_negative_u32(raw.led_length, id, "led_length")?;
    if start.checked_add(length).is_none() {
        bail!("Zone '{id}' segment {start}+{length} overflows");
    }

    if !raw.led_on_time.is_finite() || raw.led_on_time <= 0.0 {
        bail!(
            "Zone '{id}' led_on_time ({}) must be a positive number of seconds",
            raw.led_on_time
        );
    }
    let Ok(duration) = Duration::try_from_secs_f64(raw.led_on_time) else {
        bail!(
            "Zone '{id}' led_on_time ({}) is too large",
            raw.led_on_time
        );
    };

    let color = ColorPolicy::from_config(raw.led_color.as_deref().unwrap_or(RANDOM_COLOR_NAME));

    Ok(ZoneConfig {
        id: id.to_string(),
        sensor,
        segment: Segment { start, length },
        color,
        duration,
        sound: raw.music_fnpath.clone(),
    })
}

/// Numbers and numeric strings are channels; other strings are labels.
fn parse_sensor(id: &str, raw: &RawSensor) -> Result<SensorBinding> {
    let number = match raw {
        RawSensor::Number(number) => *number,
        RawSensor::Label(label) => match label.trim().parse::<i64>() {
            Ok(number) => number,
            Err(_) => {
                let is_indicator = INDICATOR_SENSOR_LABELS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(label.trim()));
                return Ok(if is_indicator {
                    SensorBinding::Indicator
                } else {
                    SensorBinding::Reserved
                });
            }
        },
    };

    if !(0..i64::from(MAX_TOUCH_CHANNELS)).contains(&number) {
        bail!(
            "Zone '{id}' sensor channel ({number}) must be between 0 and {}",
            MAX_TOUCH_CHANNELS - 1
        );
    }

    Ok(SensorBinding::Channel(number as u8))
}

fn non_negative_u32(value: i64, owner: &str, field: &str) -> Result<u32> {
    match u32::try_from(value) {
        Ok(value) => Ok(value),
        Err(_) => bail!("'{owner}' {field} ({value}) must be a non-negative integer"),
    }
}
