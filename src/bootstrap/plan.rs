//! Bootstrap Plan
//!
//! The fixed, ordered list of external-tool invocations that takes a
//! host from "no target environment" to "petscenv active with the local
//! package installed". The plan is data; the runner owns control flow.

use std::path::PathBuf;

use crate::environment::{conda, pip};

/// Name of the environment the bootstrapper creates and targets.
pub const ENV_NAME: &str = "petscenv";

/// Exact relative path of the pinned package specification file.
///
/// Never canonicalized: invoking from outside the repository root must
/// surface conda's own spec-file-not-found failure, not a fallback.
pub const SPEC_FILE: &str = "./conda_spec_files/conda_spec_file_with_correct_h5py.txt";

/// The local package installed in the final step: wherever the
/// bootstrapper was invoked from.
pub const LOCAL_PACKAGE: &str = ".";

/// How a step reaches its external tool.
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Direct execution of a binary with arguments.
    Program { program: PathBuf, args: Vec<String> },
    /// A generated bash script, for operations that only exist as
    /// shell functions provided by the conda hook.
    Script { body: String },
}

/// One entry in the ordered bootstrap plan.
#[derive(Debug, Clone)]
pub struct BootstrapStep {
    /// Stable identifier, also used to name generated step scripts.
    pub id: &'static str,
    /// One-line description printed when the step starts.
    pub summary: String,
    /// The external-tool invocation this step performs.
    pub invocation: Invocation,
}

impl BootstrapStep {
    fn program(id: &'static str, summary: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            id,
            summary: summary.into(),
            invocation: Invocation::Program {
                program: conda::binary().to_path_buf(),
                args,
            },
        }
    }

    fn script(id: &'static str, summary: impl Into<String>, body: String) -> Self {
        Self {
            id,
            summary: summary.into(),
            invocation: Invocation::Script { body },
        }
    }
}

/// Builds the four-step plan, in execution order:
///
/// 1. `deactivate`: drop whatever environment is currently active
/// 2. `create`: create `petscenv` from the pinned specification file
/// 3. `activate`: activate the newly created environment
/// 4. `install`: pip-install the local package into it
pub fn build_plan() -> Vec<BootstrapStep> {
    vec![
        BootstrapStep::script(
            "deactivate",
            "Deactivating current environment",
            conda::deactivate_script(),
        ),
        BootstrapStep::program(
            "create",
            format!("Creating environment '{}' from {}", ENV_NAME, SPEC_FILE),
            conda::create_from_spec(ENV_NAME, SPEC_FILE),
        ),
        BootstrapStep::script(
            "activate",
            format!("Activating environment '{}'", ENV_NAME),
            conda::activate_script(ENV_NAME),
        ),
        BootstrapStep::program(
            "install",
            format!("Installing local package into '{}'", ENV_NAME),
            pip::install_local(ENV_NAME, LOCAL_PACKAGE),
        ),
    ]
}
