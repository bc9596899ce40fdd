//! Binary entry point: argument dispatch, file logging and exit codes.

use megaoperation::args::{self, CliAction, ParsedArgs};
use megaoperation::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use megaoperation::logger::Log;
use megaoperation::{MegaOperation, log_end, log_error_exit, log_version};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let options = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            std::process::exit(EXIT_SUCCESS);
        }
        CliAction::ShowHelp => {
            args::display_help();
            std::process::exit(EXIT_SUCCESS);
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run(options) => options,
    };

    Log::set_debug(options.debug_enabled);

    // Keep the guard alive until exit so the file is flushed
    let log_guard = match options.log_file.clone() {
        Some(path) => match Log::start_file_logging(path) {
            Ok(guard) => Some(guard),
            Err(e) => {
                log_error_exit!("Failed to start file logging: {e:#}");
                std::process::exit(EXIT_FAILURE);
            }
        },
        None => None,
    };

    log_version!();

    let code = match MegaOperation::new(options).run() {
        Ok(()) => {
            log_end!();
            EXIT_SUCCESS
        }
        Err(e) => {
            log_error_exit!("{e:#}");
            log_end!();
            EXIT_FAILURE
        }
    };

    drop(log_guard);
    std::process::exit(code);
}
