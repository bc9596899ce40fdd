//! # MegaOperation Library
//!
//! Orchestrates the touch zones of the MegaOperation board game prop: each
//! zone lights its LED segment (and may play a sound) for a fixed time when
//! touched, while the "Nose" indicator shows whether anything is active or
//! the big dome button is up.
//!
//! ## Architecture
//!
//! - **Entry Point**: `MegaOperation` runs startup, the selected mode and shutdown
//! - **Core Logic**: `core` holds the polling loop, edge source, scheduler,
//!   effect runner, indicator and shutdown coordinator
//! - **Configuration**: `config` loads and validates the TOML zone registry
//! - **Strip**: `strip` speaks the LED server's text protocol
//! - **Infrastructure**: `io` (sensor, button, sound, signals), `commands`
//!   (self test and walk mode), `colors`, logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod colors;
pub mod commands;
pub mod config;
pub mod constants;
pub mod core;
pub mod io;
pub mod strip;

mod megaoperation;

pub use megaoperation::MegaOperation;
