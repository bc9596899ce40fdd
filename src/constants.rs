//! Application-wide constants and defaults.

use std::time::Duration;

// # Main loop

/// Polling interval of the main loop.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

// # Touch sensor

/// Number of electrodes on the capacitive touch controller.
pub const MAX_TOUCH_CHANNELS: u8 = 12;

/// Sensor values that mark the zone holding the aggregate indicator segment.
pub const INDICATOR_SENSOR_LABELS: &[&str] = &["nose", "indicator"];

pub const DEFAULT_TOUCH_STATUS_PATH: &str = "/run/megaoperation/touched";

/// GPIO 24 carries the big dome push-button.
pub const DEFAULT_BUTTON_VALUE_PATH: &str = "/sys/class/gpio/gpio24/value";

// # LED strip

pub const DEFAULT_DEVICE_PATH: &str = "/dev/ws281x";
pub const DEFAULT_STRIP_CHANNEL: u8 = 1;
pub const DEFAULT_LED_TYPE: u8 = 0;
pub const DEFAULT_BRIGHTNESS: u8 = 255;
pub const DEFAULT_GPIO_PIN: u8 = 18;

/// Color name used when a zone does not configure `led_color`.
pub const RANDOM_COLOR_NAME: &str = "random";

/// Color of the indicator segment when its zone names no usable color.
pub const DEFAULT_INDICATOR_COLOR: &str = "red";

// # Startup

/// Hold time of each color during the power-on self test, in seconds.
pub const DEFAULT_POST_DELAY_SECS: f64 = 0.5;

/// Colors cycled across the whole strip during the power-on self test.
pub const POST_COLORS: &[&str] = &["red", "green", "blue", "white"];

/// Color used to mark the current position in walk mode.
pub const WALK_COLOR: &str = "white";

// # Audio

pub const DEFAULT_PLAYER_COMMAND: &[&str] = &["aplay", "-q"];

// # Files

pub const CONFIG_DIR_NAME: &str = "megaoperation";
pub const CONFIG_FILE_NAME: &str = "megaoperation.toml";

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
