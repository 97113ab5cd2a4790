//! qmbenv CLI Entry Point
//!
//! Runs the bootstrap sequence against the invoking shell's host.
//!
//! # Usage
//!
//! ```bash
//! # From the repository root (the spec file path is relative)
//! qmbenv
//! ```
//!
//! The binary takes no flags, arguments, or options; any supplied
//! arguments are ignored. `RUST_LOG` filters the tool's own log
//! output (default: info).

use std::process::ExitCode;

use log::{error, warn};

use qmbenv::bootstrap::{build_plan, Bootstrapper};
use qmbenv::{APP_NAME, VERSION};

/// Configures the logging system with appropriate formatting.
fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("petscenv Environment Bootstrapper");
    println!();
}

fn main() -> ExitCode {
    setup_logging();
    print_banner();

    let bootstrapper = Bootstrapper::new(build_plan());

    match bootstrapper.run() {
        Ok(report) => {
            if let Err(e) = report.save() {
                warn!("Failed to save run report: {}", e);
            }

            println!();
            println!("{}", report.summary());

            match u8::try_from(report.exit_code()) {
                Ok(0) => ExitCode::SUCCESS,
                Ok(code) => ExitCode::from(code),
                Err(_) => ExitCode::FAILURE,
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
