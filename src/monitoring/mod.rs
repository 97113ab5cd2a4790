//! Resource Monitoring Module
//!
//! Tracks CPU and memory usage of step child processes while they run.

pub mod resource;

pub use resource::{ResourceMonitor, ResourceSample};
