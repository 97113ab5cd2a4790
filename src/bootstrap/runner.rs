//! Sequential Step Runner
//!
//! Executes the bootstrap plan strictly in order, one blocking child
//! process per step, halting at the first failure. Child stdio is
//! inherited so tool output passes through uncaptured and unmodified.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::monitoring::ResourceMonitor;

use super::plan::{BootstrapStep, Invocation};
use super::report::{BootstrapReport, StepRecord};

/// Interval between child exit polls; the monitor rate-limits itself.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Failures of the runner itself, as opposed to a step's child exiting
/// nonzero. Step failures are recorded in the report, not raised here.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to prepare script for step '{step}': {source}")]
    ScriptSetup {
        step: &'static str,
        source: io::Error,
    },

    #[error("failed to launch step '{step}': {source}")]
    Launch {
        step: &'static str,
        source: io::Error,
    },

    #[error("failed to wait on step '{step}': {source}")]
    Wait {
        step: &'static str,
        source: io::Error,
    },
}

/// Runs a bootstrap plan to completion or first failure.
///
/// # Example
///
/// ```rust,no_run
/// use qmbenv::bootstrap::{build_plan, Bootstrapper};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let report = Bootstrapper::new(build_plan()).run()?;
///     std::process::exit(report.exit_code());
/// }
/// ```
pub struct Bootstrapper {
    plan: Vec<BootstrapStep>,
}

impl Bootstrapper {
    pub fn new(plan: Vec<BootstrapStep>) -> Self {
        Self { plan }
    }

    /// Executes the plan's steps in order, each blocking until its
    /// child exits. Execution halts at the first step that exits
    /// nonzero; later steps are never started. The failed step is
    /// therefore the last-executed command and its exit status is the
    /// one the report propagates.
    pub fn run(&self) -> Result<BootstrapReport, BootstrapError> {
        let started_at = Utc::now();
        let mut records = Vec::with_capacity(self.plan.len());

        for step in &self.plan {
            info!("{}", step.summary);

            let record = self.run_step(step)?;
            let failed = !record.succeeded;

            if failed {
                error!(
                    "Step '{}' failed (exit status: {})",
                    step.id,
                    record.exit_code.unwrap_or(-1)
                );
            } else {
                info!("Step '{}' completed in {:.1}s", step.id, record.duration_secs);
            }

            records.push(record);
            if failed {
                break;
            }
        }

        Ok(BootstrapReport::new(started_at, records))
    }

    /// Runs one step: spawn, poll to completion while sampling the
    /// child's resource usage, clean up any generated script.
    fn run_step(&self, step: &BootstrapStep) -> Result<StepRecord, BootstrapError> {
        let start = Instant::now();

        let (mut child, script_path) = spawn_step(step)?;
        let mut monitor = ResourceMonitor::for_pid(child.id());

        let wait_result = wait_with_monitoring(&mut child, &mut monitor);

        if let Some(path) = script_path {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to clean up script {}: {}", path.display(), e);
            }
        }

        let status = wait_result.map_err(|source| BootstrapError::Wait {
            step: step.id,
            source,
        })?;

        let succeeded = status.success();
        Ok(StepRecord {
            id: step.id.to_string(),
            summary: step.summary.clone(),
            succeeded,
            exit_code: if succeeded {
                None
            } else {
                Some(exit_code_from_status(status))
            },
            duration_secs: start.elapsed().as_secs_f64(),
            peak_memory_mb: monitor.peak_memory_mb(),
        })
    }
}

/// Polls the child until it exits, taking a resource sample per poll.
/// Single-threaded: the monitor runs between polls, not beside them.
fn wait_with_monitoring(child: &mut Child, monitor: &mut ResourceMonitor) -> io::Result<ExitStatus> {
    loop {
        match child.try_wait()? {
            Some(status) => return Ok(status),
            None => {
                monitor.sample();
                thread::sleep(WAIT_POLL_INTERVAL);
            }
        }
    }
}

/// Spawns the step's child with inherited stdio. Returns the path of
/// the generated script, when one was written, for later cleanup.
fn spawn_step(step: &BootstrapStep) -> Result<(Child, Option<PathBuf>), BootstrapError> {
    match &step.invocation {
        Invocation::Program { program, args } => {
            debug!("Running: {} {}", program.display(), args.join(" "));

            let child = Command::new(program)
                .args(args)
                .spawn()
                .map_err(|source| BootstrapError::Launch {
                    step: step.id,
                    source,
                })?;

            Ok((child, None))
        }
        Invocation::Script { body } => {
            let script_path =
                write_step_script(step.id, body).map_err(|source| BootstrapError::ScriptSetup {
                    step: step.id,
                    source,
                })?;

            debug!("Running script: {}", script_path.display());

            let child = Command::new("bash")
                .arg(&script_path)
                .spawn()
                .map_err(|source| BootstrapError::Launch {
                    step: step.id,
                    source,
                })?;

            Ok((child, Some(script_path)))
        }
    }
}

/// Writes a step script to the system temp directory.
fn write_step_script(step_id: &str, body: &str) -> io::Result<PathBuf> {
    let script_dir = std::env::temp_dir().join("qmbenv_scripts");
    fs::create_dir_all(&script_dir)?;

    let script_path = script_dir.join(format!("step_{}.sh", step_id));
    let mut file = File::create(&script_path)?;
    file.write_all(body.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(script_path)
}

/// Maps a child's exit status to the code this process propagates.
/// Nonzero codes pass through verbatim; a signal-terminated child maps
/// to the shell convention of 128 plus the signal number.
fn exit_code_from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
