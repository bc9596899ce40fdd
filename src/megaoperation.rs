//! Application coordinator: startup, the selected mode, and shutdown.
//!
//! The startup order is fixed:
//! 1. configuration load and summary
//! 2. signal handler
//! 3. touch sensor and push-button (unreachable hardware is fatal)
//! 4. strip setup and the power-on self test
//! 5. stop, walk, or the main loop until interrupted
//!
//! An interrupt during the self test or walk mode ends the run cleanly.

use anyhow::{Context, Result};
use std::io::BufReader;
use std::sync::Arc;

use crate::{
    args::RunOptions,
    commands::{run_post, walk_leds},
    config::{self, Config},
    constants::TICK_INTERVAL,
    core::{Core, CoreParams, effect::SoundPolicy},
    io::{CommandPlayer, GpioValueButton, StatusFileSensor, signals::setup_signal_handler},
    strip::{DeviceSink, LedDriver},
};

/// Runs the prop with options resolved from the command line.
///
/// ```no_run
/// use megaoperation::MegaOperation;
/// use megaoperation::args::RunOptions;
///
/// # fn main() -> anyhow::Result<()> {
/// MegaOperation::new(RunOptions::default()).run()?;
/// # Ok(())
/// # }
/// ```
pub struct MegaOperation {
    options: RunOptions,
}

impl MegaOperation {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Execute the selected mode. Returns once the prop has shut down cleanly.
    pub fn run(self) -> Result<()> {
        let options = self.options;

        let config_path = match &options.config_path {
            Some(path) => path.clone(),
            None => config::default_config_path()?,
        };
        log_block_start!("Loading configuration from {}", config_path.display());
        let config = Config::load(&config_path)?;
        config.log_config();

        let signal_state = setup_signal_handler()?;

        let sensor = StatusFileSensor::open(&config.inputs.touch_status).with_context(|| {
            format!(
                "Unable to reach the touch sensor at {}",
                config.inputs.touch_status.display()
            )
        })?;
        let button = GpioValueButton::open(&config.inputs.button_value).with_context(|| {
            format!(
                "Unable to reach the push-button at {}",
                config.inputs.button_value.display()
            )
        })?;
        log_block_start!("Touch sensor and push-button ready");

        let sink = DeviceSink::new(&options.device_path);
        log_block_start!("Setting up LED strip on {}", sink.path().display());
        let driver = Arc::new(LedDriver::new(config.strip.channel, Box::new(sink)));
        driver
            .setup(&config.strip)
            .context("Failed to set up the LED strip")?;

        if !run_post(&driver, options.post_delay, &signal_state) {
            return Ok(());
        }

        if options.stop_after_init {
            log_block_start!("Initialization complete, stopping as requested");
            return Ok(());
        }

        if options.walk {
            let stdin = BufReader::new(std::io::stdin());
            walk_leds(&driver, config.strip.led_count, stdin, &signal_state)?;
            return Ok(());
        }

        let sound = SoundPolicy {
            enabled: options.sound_enabled,
            allow_overlap: options.allow_overlap,
        };
        if !sound.enabled {
            log_decorated!("Sound disabled");
        } else if sound.allow_overlap {
            log_decorated!("Zone sounds may overlap");
        }

        let player = Arc::new(CommandPlayer::new(&config.audio.player)?);

        let core = Core::new(CoreParams {
            zones: config.zones,
            driver,
            sensor: Box::new(sensor),
            button: Box::new(button),
            player,
            sound,
            signal_state,
            tick_interval: TICK_INTERVAL,
        })?;

        core.execute()
    }
}
