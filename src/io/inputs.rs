//! File-backed touch sensor and push-button adapters.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use super::{ButtonInput, TouchSensor};

fn read_trimmed(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.trim().to_string())
}

/// Reads the electrode bitmask the touch-controller driver exports as text,
/// either decimal (`8`) or hexadecimal (`0x0008`).
pub struct StatusFileSensor {
    path: PathBuf,
}

impl StatusFileSensor {
    /// Open the sensor, failing if its status file cannot be read now.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut sensor = Self { path: path.into() };
        sensor
            .read_touched()
            .context("Touch sensor is not reachable")?;
        Ok(sensor)
    }
}

pub(crate) fn parse_bitmask(text: &str) -> Result<u16> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse::<u16>(),
    };
    parsed.with_context(|| format!("Invalid touch bitmask '{text}'"))
}

impl TouchSensor for StatusFileSensor {
    fn read_touched(&mut self) -> Result<u16> {
        parse_bitmask(&read_trimmed(&self.path)?)
    }
}

/// Reads a sysfs-style GPIO `value` file (`0` or `1`).
pub struct GpioValueButton {
    path: PathBuf,
}

impl GpioValueButton {
    /// Open the button, failing if its value file cannot be read now.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut button = Self { path: path.into() };
        button
            .read_level()
            .context("Push-button GPIO is not reachable")?;
        Ok(button)
    }
}

impl ButtonInput for GpioValueButton {
    fn read_level(&mut self) -> Result<bool> {
        match read_trimmed(&self.path)?.as_str() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => bail!(
                "Unexpected GPIO value '{other}' in {}",
                self.path.display()
            ),
        }
    }
}
