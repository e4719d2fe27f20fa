//! CLI error types with exit code handling
//!
//! Library errors are folded into a few user-facing categories, each with its
//! own exit code and, where there is something to suggest, help text.

use miette::Diagnostic;
use thiserror::Error;

use chart_schema_core::CoreError;
use chart_schema_infer::InferError;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Chart directory structure or Chart.yaml problem
    #[error("Chart error: {message}")]
    #[diagnostic(code(chart_schema::cli::chart))]
    Chart {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Template file could not be read
    #[error("Template error: {message}")]
    #[diagnostic(code(chart_schema::cli::template))]
    Template { message: String },

    /// Dependency materialization or subchart resolution failed
    #[error("Dependency error: {message}")]
    #[diagnostic(code(chart_schema::cli::dependency))]
    Dependency {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// No value reference found anywhere in the chart tree
    #[error("{message}")]
    #[diagnostic(
        code(chart_schema::cli::empty),
        help("Templates must reference chart values as .Values.<path>")
    )]
    EmptySchema { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chart_schema::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chart_schema::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Chart { .. } => exit_codes::CHART_ERROR,
            CliError::Template { .. } => exit_codes::TEMPLATE_ERROR,
            CliError::Dependency { .. } => exit_codes::DEPENDENCY_ERROR,
            CliError::EmptySchema { .. } => exit_codes::EMPTY_SCHEMA_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    fn chart(message: String, help: &str) -> Self {
        Self::Chart {
            message,
            help: Some(help.to_string()),
        }
    }

    fn dependency(message: String, help: &str) -> Self {
        Self::Dependency {
            message,
            help: Some(help.to_string()),
        }
    }
}

impl From<InferError> for CliError {
    fn from(err: InferError) -> Self {
        // Keep the full subchart chain in the message, classify by the cause
        let message = err.to_string();

        match err.root_cause() {
            InferError::Core(core) => match core {
                CoreError::ChartNotFound { .. } => {
                    CliError::chart(message, "Pass the path of a chart directory")
                }
                CoreError::MissingChartFile { .. } | CoreError::MissingTemplatesDir { .. } => {
                    CliError::chart(
                        message,
                        "A chart directory needs a Chart.yaml file and a templates/ directory",
                    )
                }
                CoreError::ChartParse { .. } => {
                    CliError::chart(message, "Check the YAML syntax of Chart.yaml")
                }
                CoreError::HelmNotFound => CliError::dependency(
                    message,
                    "Install helm to fetch remote dependencies, or rerun with --no-subcharts",
                ),
                CoreError::DependencyBuild { .. } => CliError::dependency(
                    message,
                    "Check the repositories listed in Chart.yaml, or rerun with --no-subcharts",
                ),
                CoreError::TemplateWalk { .. } | CoreError::Io(_) => CliError::Io { message },
            },
            InferError::ReadTemplate { .. } => CliError::Template { message },
            InferError::MaxDepthExceeded { .. } => CliError::dependency(
                message,
                "Look for a dependency cycle in the Chart.yaml files of the chart tree",
            ),
            InferError::NoValuePaths { .. } => CliError::EmptySchema { message },
            InferError::Subchart { .. } | InferError::Json(_) => CliError::Internal { message },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
