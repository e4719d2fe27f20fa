//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Chart not found: {path}")]
    ChartNotFound { path: PathBuf },

    #[error("Chart.yaml not found in {path}")]
    MissingChartFile { path: PathBuf },

    #[error("templates directory not found in {path}")]
    MissingTemplatesDir { path: PathBuf },

    #[error("Failed to parse Chart.yaml in {path}: {source}")]
    ChartParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to walk templates in {path}: {source}")]
    TemplateWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("helm not found in PATH")]
    HelmNotFound,

    #[error("helm dependency build failed in {chart}: {status}\nOutput: {output}")]
    DependencyBuild {
        chart: PathBuf,
        status: String,
        output: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
