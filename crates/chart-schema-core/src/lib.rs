//! chart-schema core - chart layout and dependency handling
//!
//! This crate provides the pieces of chart-schema that touch the filesystem
//! or external tools:
//! - `ChartMetadata`: the `Chart.yaml` model and its `dependencies:` list
//! - `validate_chart_dir` / `find_templates`: chart structure checks and
//!   template discovery
//! - `DependencyBuilder`: materializes remote subcharts (via `helm` by default)

pub mod builder;
pub mod chart;
pub mod error;

pub use builder::{DependencyBuilder, HelmCli};
pub use chart::{ChartMetadata, Dependency, find_templates, validate_chart_dir};
pub use error::{CoreError, Result};
