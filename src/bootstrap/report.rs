//! Run Report
//!
//! Persisted outcome of a bootstrap run: per-step status, timing and
//! peak memory. Saved best-effort after every run; a write failure is
//! logged and never alters the process exit status.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the report of the most recent run is written, relative to the
/// invocation directory.
pub const REPORT_PATH: &str = ".qmbenv/last_run.json";

/// Outcome of one executed step.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StepRecord {
    /// Step identifier from the plan.
    pub id: String,
    /// Step summary from the plan.
    pub summary: String,
    /// Whether the step's child exited with status zero.
    pub succeeded: bool,
    /// Exit code when the step failed.
    pub exit_code: Option<i32>,
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,
    /// Peak resident memory of the step's child, in megabytes.
    pub peak_memory_mb: u64,
}

/// The full outcome of a bootstrap run.
///
/// A run that halts at a failed step truncates the record list there;
/// steps after the failure were never started and have no record.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BootstrapReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
}

impl BootstrapReport {
    pub fn new(started_at: DateTime<Utc>, steps: Vec<StepRecord>) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            steps,
        }
    }

    /// True when every executed step succeeded.
    pub fn success(&self) -> bool {
        self.steps.iter().all(|s| s.succeeded)
    }

    /// The process exit code this run propagates: 0 on success,
    /// otherwise the failed step's own exit code.
    pub fn exit_code(&self) -> i32 {
        self.steps
            .iter()
            .find(|s| !s.succeeded)
            .and_then(|s| s.exit_code)
            .unwrap_or(0)
    }

    /// Writes the report as pretty JSON, creating parent directories.
    pub fn save(&self) -> io::Result<()> {
        self.save_to(Path::new(REPORT_PATH))
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    /// Human-readable per-step summary for end-of-run output.
    pub fn summary(&self) -> String {
        let mut lines = vec!["Bootstrap summary:".to_string()];
        for step in &self.steps {
            let status = if step.succeeded {
                "ok".to_string()
            } else {
                format!("failed (exit {})", step.exit_code.unwrap_or(-1))
            };
            lines.push(format!(
                "  {:<12} {:<18} {:>8.1}s  peak {} MB",
                step.id, status, step.duration_secs, step.peak_memory_mb
            ));
        }
        lines.join("\n")
    }
}
