//! Named color table and per-trigger color resolution.
//!
//! Zones either name a color from [`COLOR_TABLE`] or ask for `random`. A name
//! that is not in the table is not an error: it resolves like `random`, so a
//! typo in the configuration still lights the zone.

use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// A 24-bit RGB color as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(u32);

impl Rgb {
    pub const OFF: Rgb = Rgb(0x000000);

    pub const fn new(value: u32) -> Self {
        Rgb(value & 0x00FF_FFFF)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Six uppercase hex digits, the form the strip protocol expects.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

pub const OFF_NAME: &str = "off";

/// Fixed name to color mapping. `off` is reserved and never picked at random.
pub const COLOR_TABLE: &[(&str, Rgb)] = &[
    (OFF_NAME, Rgb::OFF),
    ("red", Rgb::new(0xFF0000)),
    ("green", Rgb::new(0x00FF00)),
    ("blue", Rgb::new(0x0000FF)),
    ("white", Rgb::new(0xFFFFFF)),
    ("yellow", Rgb::new(0xFFFF00)),
    ("cyan", Rgb::new(0x00FFFF)),
    ("magenta", Rgb::new(0xFF00FF)),
    ("orange", Rgb::new(0xFF8000)),
    ("purple", Rgb::new(0x8000FF)),
    ("pink", Rgb::new(0xFF1493)),
];

/// Look up a color by name, ignoring case.
pub fn lookup(name: &str) -> Option<Rgb> {
    COLOR_TABLE
        .iter()
        .find(|(entry, _)| entry.eq_ignore_ascii_case(name))
        .map(|(_, rgb)| *rgb)
}

/// How a zone picks its color each time it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorPolicy {
    Named(String),
    Random,
}

impl ColorPolicy {
    /// Build a policy from the configured `led_color` value.
    pub fn from_config(value: &str) -> Self {
        if value.eq_ignore_ascii_case(crate::constants::RANDOM_COLOR_NAME) {
            ColorPolicy::Random
        } else {
            ColorPolicy::Named(value.to_string())
        }
    }

    /// Whether a named policy refers to a color that exists in the table.
    pub fn is_known(&self) -> bool {
        match self {
            ColorPolicy::Named(name) => lookup(name).is_some(),
            ColorPolicy::Random => true,
        }
    }
}

/// Outcome of resolving a [`ColorPolicy`] for one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Named(Rgb),
    Random(Rgb),
    /// The configured name was not in the table; a random color was used.
    Fallback(Rgb),
}

impl Resolved {
    pub fn rgb(self) -> Rgb {
        match self {
            Resolved::Named(rgb) | Resolved::Random(rgb) | Resolved::Fallback(rgb) => rgb,
        }
    }
}

/// Resolve a policy to a concrete color using the thread-local RNG.
pub fn resolve(policy: &ColorPolicy) -> Resolved {
    resolve_with(policy, &mut rand::thread_rng())
}

pub fn resolve_with<R: Rng + ?Sized>(policy: &ColorPolicy, rng: &mut R) -> Resolved {
    match policy {
        ColorPolicy::Random => Resolved::Random(random_color(rng)),
        ColorPolicy::Named(name) => match lookup(name) {
            Some(rgb) => Resolved::Named(rgb),
            None => Resolved::Fallback(random_color(rng)),
        },
    }
}

/// Uniform choice among every table entry except `off`.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let candidates: Vec<Rgb> = COLOR_TABLE
        .iter()
        .filter(|(name, _)| *name != OFF_NAME)
        .map(|(_, rgb)| *rgb)
        .collect();

    // The table is a non-empty constant, so there is always a candidate
    candidates.choose(rng).copied().unwrap_or(Rgb::new(0xFFFFFF))
}
