//! Conda Integration
//!
//! Locates the host conda installation and builds the command invocations
//! the bootstrap steps hand to it. Nothing here runs conda itself; the
//! runner owns process execution.
//!
//! # Binary Resolution Priority
//!
//! The conda binary is resolved in the following order:
//! 1. `CONDA_EXE`: Exported by an initialized conda shell hook
//! 2. Well-known install prefixes under the user's home and `/opt`
//! 3. System PATH: Falls back to `which conda`

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};
use once_cell::sync::Lazy;

/// Install prefixes probed when `CONDA_EXE` is not set, relative to `HOME`.
const HOME_PREFIXES: &[&str] = &["miniconda3", "anaconda3", "miniforge3"];

/// System-wide install prefixes probed after the home ones.
const SYSTEM_PREFIXES: &[&str] = &["/opt/conda", "/opt/miniconda3", "/opt/anaconda3"];

/// Lazily-initialized path to the conda binary.
pub static CONDA_PATH: Lazy<PathBuf> = Lazy::new(|| {
    // Priority 1: CONDA_EXE, set by a sourced conda shell hook.
    // Check this first so the same installation the user's shell is
    // initialized with is the one the bootstrapper drives.
    if let Ok(exe) = std::env::var("CONDA_EXE") {
        if !exe.is_empty() {
            let hook_path = PathBuf::from(exe);
            if hook_path.exists() {
                info!("Using conda from CONDA_EXE: {}", hook_path.display());
                return hook_path;
            }
        }
    }

    // Priority 2: well-known install prefixes
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    for prefix in HOME_PREFIXES {
        let candidate = Path::new(&home).join(prefix).join("bin").join("conda");
        if candidate.exists() {
            info!("Using conda install: {}", candidate.display());
            return candidate;
        }
    }

    for prefix in SYSTEM_PREFIXES {
        let candidate = Path::new(prefix).join("bin").join("conda");
        if candidate.exists() {
            info!("Using conda install: {}", candidate.display());
            return candidate;
        }
    }

    // Priority 3: System PATH
    if let Ok(output) = Command::new("which").arg("conda").output() {
        if output.status.success() {
            let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path_str.is_empty() {
                let system_path = PathBuf::from(path_str);
                info!("Using system conda: {}", system_path.display());
                return system_path;
            }
        }
    }

    // Not found; use the bare name and let the launch failure surface
    // from the step that first needs it.
    warn!("Conda binary not found");
    warn!("  Searched: CONDA_EXE");
    warn!("  Searched: {} under {}", HOME_PREFIXES.join(", "), home);
    warn!("  Searched: {}", SYSTEM_PREFIXES.join(", "));
    warn!("  Searched: system PATH");

    PathBuf::from("conda")
});

/// Returns the resolved conda binary path.
pub fn binary() -> &'static Path {
    &CONDA_PATH
}

/// Builds a bash script that loads the conda shell hook and runs one
/// conda shell command.
///
/// `activate` and `deactivate` exist only as shell functions defined by
/// the hook, so they cannot be driven as plain executables; the hook is
/// evaluated fresh in each generated script, the non-interactive
/// equivalent of a sourced shell profile.
fn hook_script(shell_command: &str) -> String {
    format!(
        "#!/bin/bash\neval \"$('{}' shell.bash hook)\"\nconda {}\n",
        CONDA_PATH.display(),
        shell_command
    )
}

/// Script body deactivating whatever environment is currently active.
///
/// Conda treats deactivation with nothing active as a no-op success.
pub fn deactivate_script() -> String {
    hook_script("deactivate")
}

/// Script body activating a named environment.
///
/// Exits nonzero when the environment does not exist.
pub fn activate_script(env_name: &str) -> String {
    hook_script(&format!("activate {}", env_name))
}

/// Arguments creating a named environment from an exact specification file.
///
/// The spec path is passed through untouched, so a relative path resolves
/// against whatever directory the process was invoked from and a wrong
/// invocation directory produces conda's own file-not-found failure.
pub fn create_from_spec(env_name: &str, spec_file: &str) -> Vec<String> {
    vec![
        "create".to_string(),
        "--name".to_string(),
        env_name.to_string(),
        "--file".to_string(),
        spec_file.to_string(),
    ]
}

/// Arguments running a command inside a named environment via `conda run`.
///
/// `--no-capture-output` keeps the wrapped command's stdio flowing to the
/// inherited descriptors unmodified.
pub fn run_in_env(env_name: &str, program: &str, args: &[String]) -> Vec<String> {
    let mut full = vec![
        "run".to_string(),
        "--no-capture-output".to_string(),
        "-n".to_string(),
        env_name.to_string(),
        program.to_string(),
    ];
    full.extend(args.iter().cloned());
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_from_spec_arguments() {
        let args = create_from_spec("petscenv", "./spec.txt");
        assert_eq!(args, vec!["create", "--name", "petscenv", "--file", "./spec.txt"]);
    }

    #[test]
    fn test_create_from_spec_path_untouched() {
        let relative = "./conda_spec_files/conda_spec_file_with_correct_h5py.txt";
        let args = create_from_spec("petscenv", relative);

        // The path must reach conda exactly as given, never resolved
        assert_eq!(args[4], relative);
        assert!(args[4].starts_with("./"));
    }

    #[test]
    fn test_run_in_env_arguments() {
        let args = run_in_env("petscenv", "pip", &["install".to_string(), ".".to_string()]);
        assert_eq!(
            args,
            vec!["run", "--no-capture-output", "-n", "petscenv", "pip", "install", "."]
        );
    }

    #[test]
    fn test_run_in_env_no_extra_args() {
        let args = run_in_env("petscenv", "python", &[]);
        assert_eq!(args, vec!["run", "--no-capture-output", "-n", "petscenv", "python"]);
    }

    #[test]
    fn test_deactivate_script_loads_hook() {
        let script = deactivate_script();
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("shell.bash hook"));
        assert!(script.contains("conda deactivate"));
    }

    #[test]
    fn test_activate_script_names_environment() {
        let script = activate_script("petscenv");
        assert!(script.contains("shell.bash hook"));
        assert!(script.contains("conda activate petscenv"));
    }

    #[test]
    fn test_activate_follows_hook_eval() {
        let script = activate_script("petscenv");
        let hook_pos = script.find("shell.bash hook").unwrap();
        let activate_pos = script.find("conda activate").unwrap();
        assert!(hook_pos < activate_pos);
    }

    #[test]
    fn test_binary_resolution_is_stable() {
        // Lazy init resolves once; repeated calls return the same path
        assert_eq!(binary(), binary());
    }
}
