//! Error types for schema inference

use std::path::PathBuf;
use thiserror::Error;

use chart_schema_core::CoreError;

/// Inference error
#[derive(Debug, Error)]
pub enum InferError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read template file {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse subchart {name} at {path}: {source}")]
    Subchart {
        name: String,
        path: PathBuf,
        #[source]
        source: Box<InferError>,
    },

    #[error("Subcharts nested deeper than {max_depth} levels at {path}")]
    MaxDepthExceeded { path: PathBuf, max_depth: usize },

    #[error("No value paths found in chart {path} - ensure templates use .Values references")]
    NoValuePaths { path: PathBuf },

    #[error("Failed to serialize schema: {0}")]
    Json(#[from] serde_json::Error),
}

impl InferError {
    /// The innermost error, looking through subchart wrappers
    pub fn root_cause(&self) -> &InferError {
        match self {
            Self::Subchart { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, InferError>;
