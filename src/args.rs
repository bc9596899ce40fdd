//! Command-line argument parsing and processing.
//!
//! The parser never fails hard: unknown options and malformed values are
//! reported with a warning and turn into [`CliAction::ShowHelpDueToError`].

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_DEVICE_PATH, DEFAULT_POST_DELAY_SECS};

/// Settings for a normal run, resolved from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub debug_enabled: bool,
    /// Explicit configuration file; the default location is used when `None`
    pub config_path: Option<PathBuf>,
    pub device_path: PathBuf,
    pub post_delay: Duration,
    pub sound_enabled: bool,
    /// Allow a zone sound to start while another is still playing
    pub allow_overlap: bool,
    /// Walk the strip one LED at a time instead of running the main loop
    pub walk: bool,
    /// Stop right after setup and the self test
    pub stop_after_init: bool,
    pub log_file: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            debug_enabled: false,
            config_path: None,
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            post_delay: Duration::from_secs_f64(DEFAULT_POST_DELAY_SECS),
            sound_enabled: true,
            allow_overlap: false,
            walk: false,
            stop_after_init: false,
            log_file: None,
        }
    }
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    Run(RunOptions),
    ShowHelp,
    ShowVersion,
    /// Unknown or malformed arguments; show help and exit with failure
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments (including the program name) into an action.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut options = RunOptions::default();
        let mut display_help = false;
        let mut display_version = false;
        let mut error_found = false;

        let mut i = 0;
        while i < args_vec.len() {
            let arg = args_vec[i].as_str();
            // Value of an option that takes one argument
            let value = args_vec.get(i + 1).filter(|next| !next.starts_with('-'));

            match arg {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" => display_version = true,
                "--debug" | "-d" | "--verbose" | "-v" => options.debug_enabled = true,
                "--no-sound" => options.sound_enabled = false,
                "--single-sound" => options.allow_overlap = false,
                "--overlap-sound" => options.allow_overlap = true,
                "--walk" | "-w" => options.walk = true,
                "--stop" | "-s" => options.stop_after_init = true,
                "--config" | "-c" => match value {
                    Some(path) => {
                        options.config_path = Some(PathBuf::from(path));
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing file for --config. Usage: --config <file>");
                        error_found = true;
                    }
                },
                "--device" | "-D" => match value {
                    Some(path) => {
                        options.device_path = PathBuf::from(path);
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing path for --device. Usage: --device <path>");
                        error_found = true;
                    }
                },
                "--post-delay" | "-p" => {
                    match value.map(|v| v.parse::<f64>().map(Duration::try_from_secs_f64)) {
                        Some(Ok(Ok(delay))) => options.post_delay = delay,
                        Some(_) => {
                            log_warning!(
                                "Invalid --post-delay value: {}",
                                args_vec[i + 1]
                            );
                            error_found = true;
                        }
                        None => {
                            log_warning!(
                                "Missing seconds for --post-delay. Usage: --post-delay <seconds>"
                            );
                            error_found = true;
                        }
                    }
                    if value.is_some() {
                        i += 1;
                    }
                }
                "--log" => match value {
                    Some(path) => {
                        options.log_file = Some(path.clone());
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing file for --log. Usage: --log <file>");
                        error_found = true;
                    }
                },
                _ => {
                    log_warning!("Unknown argument: {}", arg);
                    error_found = true;
                }
            }
            i += 1;
        }

        let action = if display_help {
            CliAction::ShowHelp
        } else if display_version {
            CliAction::ShowVersion
        } else if error_found {
            CliAction::ShowHelpDueToError
        } else if options.walk && options.stop_after_init {
            log_warning!("--walk and --stop cannot be used together");
            CliAction::ShowHelpDueToError
        } else {
            CliAction::Run(options)
        };

        ParsedArgs { action }
    }

    /// Parse the arguments of the current process.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

pub fn display_version_info() {
    log_version!();
    log_decorated!("{}", env!("CARGO_PKG_DESCRIPTION"));
    log_end!();
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!("{}", env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("megaoperation [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <file>       Configuration file");
    log_indented!("-D, --device <path>       LED server device (default: {DEFAULT_DEVICE_PATH})");
    log_indented!(
        "-p, --post-delay <secs>   Hold time per self-test color (default: {DEFAULT_POST_DELAY_SECS})"
    );
    log_indented!("    --no-sound            Never play zone sounds");
    log_indented!("    --single-sound        Skip a zone sound while another plays (default)");
    log_indented!("    --overlap-sound       Let zone sounds play over each other");
    log_indented!("-w, --walk                Step through the strip one LED at a time");
    log_indented!("-s, --stop                Stop after setup and self test");
    log_indented!("    --log <file>          Write log output to a file");
    log_indented!("-d, --debug               Enable detailed debug output");
    log_indented!("-h, --help                Print help information");
    log_indented!("-V, --version             Print version information");
    log_end!();
}
