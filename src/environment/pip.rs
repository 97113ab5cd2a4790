//! Pip Invocation Builder
//!
//! Composes the local-package install command that runs inside the
//! target conda environment.

use super::conda;

/// Arguments installing a local package directory into a named
/// environment, forcing reinstallation and upgrading its declared
/// dependencies.
///
/// The returned arguments are for the conda binary: the pip invocation
/// is wrapped in conda's `run` facility so it targets the named
/// environment's interpreter rather than whichever pip is first on PATH.
pub fn install_local(env_name: &str, package_dir: &str) -> Vec<String> {
    let pip_args = vec![
        "install".to_string(),
        "--upgrade".to_string(),
        "--force-reinstall".to_string(),
        package_dir.to_string(),
    ];
    conda::run_in_env(env_name, "pip", &pip_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_local_arguments() {
        let args = install_local("petscenv", ".");
        assert_eq!(
            args,
            vec![
                "run",
                "--no-capture-output",
                "-n",
                "petscenv",
                "pip",
                "install",
                "--upgrade",
                "--force-reinstall",
                "."
            ]
        );
    }

    #[test]
    fn test_install_local_targets_environment() {
        let args = install_local("otherenv", "/tmp/pkg");
        let n_pos = args.iter().position(|a| a == "-n").unwrap();
        assert_eq!(args[n_pos + 1], "otherenv");
        assert_eq!(args.last().unwrap(), "/tmp/pkg");
    }

    #[test]
    fn test_install_local_forces_reinstall_and_upgrade() {
        let args = install_local("petscenv", ".");
        assert!(args.contains(&"--force-reinstall".to_string()));
        assert!(args.contains(&"--upgrade".to_string()));
    }
}
