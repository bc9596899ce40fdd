//! Configuration loading: file discovery and TOML deserialization.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::validation::validate;
use crate::constants::*;

/// `[strip]` as written in the file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawStrip {
    pub channel: Option<u8>,
    pub led_type: Option<u8>,
    pub invert: Option<bool>,
    pub brightness: Option<i64>,
    pub gpio_pin: Option<u8>,
    pub led_count: Option<i64>,
}

/// `[inputs]` as written in the file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawInputs {
    pub touch_status: Option<PathBuf>,
    pub button_value: Option<PathBuf>,
}

/// `[audio]` as written in the file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawAudio {
    pub player: Option<Vec<String>>,
}

/// A zone's `sensor` value: a channel number or a label.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub(crate) enum RawSensor {
    Number(i64),
    Label(String),
}

/// `[zones.<name>]` as written in the file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawZone {
    pub sensor: RawSensor,
    pub led_start: i64,
    pub led_length: i64,
    pub led_on_time: f64,
    pub led_color: Option<String>,
    pub music_fnpath: Option<PathBuf>,
}

/// The whole file before validation.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawConfig {
    #[serde(default)]
    pub strip: RawStrip,
    #[serde(default)]
    pub inputs: RawInputs,
    #[serde(default)]
    pub audio: RawAudio,
    #[serde(default)]
    pub zones: BTreeMap<String, RawZone>,
}

/// Default configuration location: `$XDG_CONFIG_HOME/megaoperation/megaoperation.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine the user configuration directory")?;
    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Read, parse and validate the configuration file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content).context("Failed to parse TOML")?;
    let config = validate(raw)?;
    warn_about_soft_issues(&config);
    Ok(config)
}

/// Problems that do not stop the prop but are worth knowing at startup.
fn warn_about_soft_issues(config: &Config) {
    for zone in config.zones.zones() {
        if !zone.color.is_known() {
            log_warning!(
                "Zone '{}' uses an unknown color; a random color will be used instead",
                zone.id
            );
        }
        if let Some(sound) = &zone.sound
            && !sound.is_file()
        {
            log_warning!(
                "Zone '{}' sound file not found: {}",
                zone.id,
                sound.display()
            );
        }
    }
}
