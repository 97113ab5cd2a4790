//! Environment Management Module
//!
//! Handles integration with the host conda installation and builds
//! the pip invocation for the local-package install step.

pub mod conda;
pub mod pip;

pub use conda::CONDA_PATH;
