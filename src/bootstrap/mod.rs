//! Environment Bootstrap Module
//!
//! The ordered step plan, the sequential runner that executes it, and
//! the persisted run report.
//!
//! # Components
//!
//! - [`plan`]: The four-step plan and its fixed contract constants
//! - [`runner`]: Sequential execution with exit-status propagation
//! - [`report`]: Per-step outcome persistence and summary output

pub mod plan;
pub mod report;
pub mod runner;

pub use plan::{build_plan, BootstrapStep, Invocation, ENV_NAME, LOCAL_PACKAGE, SPEC_FILE};
pub use report::{BootstrapReport, StepRecord, REPORT_PATH};
pub use runner::{BootstrapError, Bootstrapper};
