//! Chart definition and layout
//!
//! Reads the parts of a Helm chart that schema inference cares about:
//! the `Chart.yaml` dependency list and the template files under `templates/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Name of the chart metadata file
pub const CHART_FILE: &str = "Chart.yaml";

/// Name of the directory holding a chart's templates
pub const TEMPLATES_DIR: &str = "templates";

/// Directory where `helm dependency build` places subcharts
pub const CHARTS_DIR: &str = "charts";

/// Template file extensions that are scanned for value references
const TEMPLATE_EXTENSIONS: &[&str] = &["yaml", "yml", "tpl"];

/// Helm `Chart.yaml` structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// API version (v1 or v2)
    #[serde(default)]
    pub api_version: Option<String>,

    /// Chart name
    #[serde(default)]
    pub name: String,

    /// Chart version
    #[serde(default)]
    pub version: String,

    /// Chart description
    #[serde(default)]
    pub description: Option<String>,

    /// Chart type (application or library)
    #[serde(default, rename = "type")]
    pub chart_type: Option<String>,

    /// Chart dependencies
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl ChartMetadata {
    /// Parse a `Chart.yaml` string
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load `Chart.yaml` from a chart directory
    pub fn load<P: AsRef<Path>>(chart_path: P) -> Result<Self> {
        let chart_path = chart_path.as_ref();
        let content = std::fs::read_to_string(chart_path.join(CHART_FILE))?;

        Self::parse(&content).map_err(|source| CoreError::ChartParse {
            path: chart_path.to_path_buf(),
            source,
        })
    }

    /// Whether any dependency has to be fetched from a repository
    pub fn has_remote_dependencies(&self) -> bool {
        self.dependencies.iter().any(|d| !d.is_local())
    }
}

/// Chart dependency as declared in `Chart.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Dependency name
    pub name: String,

    /// Version constraint
    #[serde(default)]
    pub version: String,

    /// Repository URL or local path
    #[serde(default)]
    pub repository: Option<String>,

    /// Condition to enable
    #[serde(default)]
    pub condition: Option<String>,

    /// Tags for grouping
    #[serde(default)]
    pub tags: Vec<String>,

    /// Alias name (overrides dependency name for value scoping)
    #[serde(default)]
    pub alias: Option<String>,
}

impl Dependency {
    /// Get the effective name (alias if set, otherwise name)
    ///
    /// Helm scopes subchart values under this key.
    #[inline]
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn repository(&self) -> &str {
        self.repository.as_deref().unwrap_or("")
    }

    /// Local dependencies have no repository, a `file://` repository or a
    /// relative path
    pub fn is_local(&self) -> bool {
        let repo = self.repository();
        repo.is_empty()
            || repo.starts_with("file://")
            || repo.starts_with("./")
            || repo.starts_with("../")
    }

    /// Directory where this dependency lives relative to its parent chart
    ///
    /// Remote dependencies resolve to `charts/<name>`, which is where
    /// `helm dependency build` leaves them.
    pub fn subchart_path(&self, parent: &Path) -> PathBuf {
        let repo = self.repository();

        if !self.is_local() || repo.is_empty() {
            return parent.join(CHARTS_DIR).join(&self.name);
        }

        if let Some(path) = repo.strip_prefix("file://") {
            let path = Path::new(path);
            if path.is_absolute() {
                return path.to_path_buf();
            }
            return parent.join(path);
        }

        parent.join(repo)
    }
}

/// Ensure a directory has the structure of a Helm chart
pub fn validate_chart_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CoreError::ChartNotFound {
            path: path.to_path_buf(),
        });
    }

    if !path.join(CHART_FILE).is_file() {
        return Err(CoreError::MissingChartFile {
            path: path.to_path_buf(),
        });
    }

    if !path.join(TEMPLATES_DIR).is_dir() {
        return Err(CoreError::MissingTemplatesDir {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// List the template files of a chart, sorted for deterministic ordering
///
/// Only files directly belonging to this chart are returned: subcharts live
/// under `charts/`, never under `templates/`.
pub fn find_templates<P: AsRef<Path>>(chart_path: P) -> Result<Vec<PathBuf>> {
    let templates_dir = chart_path.as_ref().join(TEMPLATES_DIR);
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(&templates_dir) {
        let entry = entry.map_err(|source| CoreError::TemplateWalk {
            path: templates_dir.clone(),
            source,
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }

        let is_template = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext.as_str()));

        if is_template {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
