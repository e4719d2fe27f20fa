//! Materialization of remote chart dependencies
//!
//! Remote subcharts only exist on disk after `helm dependency build` has
//! downloaded them into `charts/`. The step is behind a trait so the parser can
//! be driven without a `helm` binary.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::error::{CoreError, Result};

/// Downloads or builds the dependencies of a chart into its `charts/` directory
pub trait DependencyBuilder: Send + Sync {
    /// Materialize the dependencies of the chart rooted at `chart_path`
    ///
    /// Blocking and all-or-nothing: an error means no subchart of this chart
    /// should be trusted.
    fn build(&self, chart_path: &Path) -> Result<()>;
}

/// Runs `helm dependency build` in the chart directory
#[derive(Debug, Clone)]
pub struct HelmCli {
    program: String,
}

impl Default for HelmCli {
    fn default() -> Self {
        Self {
            program: "helm".to_string(),
        }
    }
}

impl HelmCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable instead of `helm` from `PATH`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl DependencyBuilder for HelmCli {
    fn build(&self, chart_path: &Path) -> Result<()> {
        tracing::info!(chart = %chart_path.display(), "running helm dependency build");

        let output = Command::new(&self.program)
            .args(["dependency", "build"])
            .current_dir(chart_path)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CoreError::HelmNotFound,
                _ => CoreError::Io(e),
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            return Err(CoreError::DependencyBuild {
                chart: chart_path.to_path_buf(),
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_program_is_helm_not_found() {
        let dir = TempDir::new().unwrap();
        let helm = HelmCli::new().with_program("chart-schema-no-such-helm-binary");

        let err = helm.build(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::HelmNotFound));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_build_is_dependency_build_error() {
        let dir = TempDir::new().unwrap();
        let helm = HelmCli::new().with_program("false");

        let err = helm.build(dir.path()).unwrap_err();
        match err {
            CoreError::DependencyBuild { chart, .. } => assert_eq!(chart, dir.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
