//! End-to-end schema generation for a chart directory

use std::path::Path;

use chart_schema_core::{CoreError, DependencyBuilder, HelmCli};

use crate::aggregate::MergeStrategy;
use crate::error::{InferError, Result};
use crate::parser::{ParseOptions, TemplateParser};
use crate::schema::{JsonSchema, generate_chart_schemas};

/// Parse the chart at `chart_path` and, per `options`, its subcharts
pub fn parse_chart_tree(
    chart_path: &Path,
    options: &ParseOptions,
    builder: &dyn DependencyBuilder,
) -> Result<TemplateParser> {
    let chart_path = std::path::absolute(chart_path).map_err(CoreError::Io)?;

    let mut parser = TemplateParser::new();
    parser.parse_chart_with_builder(&chart_path, options, builder)?;

    tracing::debug!(
        chart = %chart_path.display(),
        values = parser.values().len(),
        subcharts = parser.subcharts().len(),
        "parsed chart tree"
    );
    Ok(parser)
}

/// Generate the JSON Schema of a chart, using `helm` for remote dependencies
pub fn generate_schema(chart_path: &Path, options: &ParseOptions) -> Result<JsonSchema> {
    generate_schema_with_builder(chart_path, options, &HelmCli::new())
}

/// Generate the JSON Schema of a chart with a custom dependency builder
///
/// Fails with [`InferError::NoValuePaths`] when no template of the tree
/// references `.Values`.
pub fn generate_schema_with_builder(
    chart_path: &Path,
    options: &ParseOptions,
    builder: &dyn DependencyBuilder,
) -> Result<JsonSchema> {
    let parser = parse_chart_tree(chart_path, options, builder)?;

    if !parser.has_value_paths() {
        return Err(InferError::NoValuePaths {
            path: chart_path.to_path_buf(),
        });
    }

    Ok(generate_chart_schemas(&parser, MergeStrategy::Auto).merge())
}
