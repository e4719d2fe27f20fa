//! chart-schema infer - JSON Schema inference from Helm templates
//!
//! Scans chart templates for `.Values` references without running the
//! template engine, classifies every discovered path from how it is used,
//! and assembles a JSON Schema (draft 2020-12) describing the chart inputs.
//!
//! | Template usage                           | Inferred                      |
//! |------------------------------------------|-------------------------------|
//! | `{{ .Values.app.name }}`                 | `app.name` untyped, `app` object |
//! | `{{ range .Values.items }}`              | `items` array                 |
//! | `{{ range $k, $v := .Values.config }}`   | `config` map (object)         |
//! | `{{ $db := .Values.database }}` + `{{ $db.host }}` | `database.host`, `database` object |
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use chart_schema_infer::{ParseOptions, generate_schema};
//!
//! let schema = generate_schema(Path::new("./my-chart"), &ParseOptions::default()).unwrap();
//! println!("{}", schema.to_json_pretty().unwrap());
//! ```

pub mod aggregate;
pub mod error;
pub mod generate;
pub mod hints;
pub mod normalize;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod value_path;

// Re-exports
pub use aggregate::{MergeStrategy, PARALLEL_THRESHOLD, flatten};
pub use error::{InferError, Result};
pub use generate::{generate_schema, generate_schema_with_builder, parse_chart_tree};
pub use hints::{PipelineHints, PipelineIndex, infer_kind, tokenize_pipeline};
pub use normalize::normalize_path;
pub use parser::{ParseOptions, TemplateParser};
pub use scanner::{Assignment, PatternScanner, ReferenceScanner, VariableReference};
pub use schema::{
    ChartSchema, JsonSchema, SchemaNode, SchemaType, build_schema, generate_chart_schemas,
    merge_bundles,
};
pub use value_path::{ValueKind, ValuePath, ValueTable};
