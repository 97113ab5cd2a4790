//! qmbenv - petscenv Environment Bootstrapper
//!
//! Automates creation of the `petscenv` scientific-computing conda
//! environment: deactivate whatever is active, create the environment
//! from a pinned package specification, activate it, and install the
//! local project package into it. Four ordered external-tool
//! invocations, run to completion or first failure.
//!
//! # Architecture
//!
//! The library is organized into three main modules:
//!
//! - [`bootstrap`]: The step plan, the sequential runner, and the run report
//! - [`environment`]: Conda binary discovery and invocation building
//! - [`monitoring`]: Per-step child resource usage tracking
//!
//! # Example
//!
//! ```rust,no_run
//! use qmbenv::bootstrap::{build_plan, Bootstrapper};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = Bootstrapper::new(build_plan()).run()?;
//!     println!("{}", report.summary());
//!     std::process::exit(report.exit_code());
//! }
//! ```

pub mod bootstrap;
pub mod environment;
pub mod monitoring;

// Re-export commonly used types
pub use bootstrap::{build_plan, BootstrapReport, Bootstrapper};
pub use environment::conda;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "qmbenv";
