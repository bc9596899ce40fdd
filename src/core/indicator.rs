//! Aggregate indicator ("Nose"): lit while any zone runs or the button is up.

use crate::colors::{self, Rgb};
use crate::config::{Segment, ZoneRegistry};
use crate::constants::DEFAULT_INDICATOR_COLOR;
use crate::strip::LedDriver;

pub struct Indicator {
    segment: Option<Segment>,
    on_color: Rgb,
    currently_on: bool,
}

impl Indicator {
    /// Build the indicator from the registry's indicator zone, if any.
    ///
    /// The zone's named color is the "on" color; random or unknown colors
    /// fall back to the default so the indicator stays stable.
    pub fn from_registry(zones: &ZoneRegistry) -> Self {
        let default = colors::lookup(DEFAULT_INDICATOR_COLOR).unwrap_or(Rgb::new(0xFF0000));

        match zones.indicator_zone() {
            Some(zone) => {
                let on_color = match &zone.color {
                    colors::ColorPolicy::Named(name) => colors::lookup(name).unwrap_or(default),
                    colors::ColorPolicy::Random => default,
                };
                Self::new(Some(zone.segment), on_color)
            }
            None => Self::new(None, default),
        }
    }

    pub fn new(segment: Option<Segment>, on_color: Rgb) -> Self {
        Self {
            segment,
            on_color,
            currently_on: false,
        }
    }

    pub fn is_on(&self) -> bool {
        self.currently_on
    }

    /// Recompute the indicator and render it only if the value changed.
    ///
    /// `button_level` is the raw active-low level: `true` means not pressed.
    /// Returns whether anything was rendered.
    pub fn update(&mut self, any_running: bool, button_level: bool, driver: &LedDriver) -> bool {
        let want = any_running || button_level;
        if want == self.currently_on {
            return false;
        }

        // Record the new state even if the write fails, so a broken device
        // is not hammered every tick
        self.currently_on = want;

        let Some(segment) = self.segment else {
            return false;
        };

        let color = if want { self.on_color } else { Rgb::OFF };
        log_debug!(
            "Indicator {} (zones active: {any_running}, button up: {button_level})",
            if want { "on" } else { "off" }
        );
        if let Err(e) = driver.paint(color, Some(segment)) {
            log_error!("Failed to render indicator: {e:#}");
        }
        true
    }
}
