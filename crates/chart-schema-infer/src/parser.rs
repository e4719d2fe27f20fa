//! Template parser: one node of the chart tree
//!
//! A [`TemplateParser`] owns the value table and variable bindings of a single
//! chart and one child parser per subchart. Each template file goes through
//! three scanner passes in fixed order:
//!
//! 1. assignments bind `$var` to a value path (last write wins per chart)
//! 2. direct `.Values.path` references are normalized, classified and recorded
//! 3. `$var.field` references are resolved through the bindings and recorded
//!    like direct references
//!
//! Every recorded path keeps its prefixes closed: `app.name` also records `app`
//! as an object.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chart_schema_core::{
    ChartMetadata, DependencyBuilder, HelmCli, find_templates, validate_chart_dir,
};

use crate::aggregate::{MergeStrategy, flatten};
use crate::error::{InferError, Result};
use crate::hints::{PipelineIndex, infer_kind};
use crate::normalize::{normalize_path, proper_prefixes};
use crate::scanner::{PatternScanner, ReferenceScanner};
use crate::value_path::{ARRAY_MARKER, ValueKind, ValuePath, ValueTable};

/// Default limit on subchart nesting
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Options controlling a chart parse
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Descend into the chart's dependencies (default: true)
    pub include_subcharts: bool,

    /// Maximum depth for nested subcharts (default: 10)
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            include_subcharts: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable subchart parsing
    pub fn with_subcharts(mut self, include: bool) -> Self {
        self.include_subcharts = include;
        self
    }

    /// Set maximum depth for nested subcharts
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Parser for the templates of one chart and, recursively, its subcharts
#[derive(Debug, Clone, Default)]
pub struct TemplateParser<S: ReferenceScanner = PatternScanner> {
    values: ValueTable,
    variables: HashMap<String, String>,
    subcharts: BTreeMap<String, TemplateParser<S>>,
    scanner: S,
}

impl TemplateParser {
    /// Parser using the regular-expression scanner
    pub fn new() -> Self {
        Self::with_scanner(PatternScanner::new())
    }
}

impl<S: ReferenceScanner> TemplateParser<S> {
    pub fn with_scanner(scanner: S) -> Self {
        Self {
            values: ValueTable::new(),
            variables: HashMap::new(),
            subcharts: BTreeMap::new(),
            scanner,
        }
    }

    /// Value paths recorded for this chart only
    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// Variable bindings, name without `$` to normalized path
    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Child parsers keyed by the subchart's effective name
    pub fn subcharts(&self) -> &BTreeMap<String, TemplateParser<S>> {
        &self.subcharts
    }

    /// Attach a parsed subchart under `name`, replacing any previous one
    pub fn add_subchart(&mut self, name: impl Into<String>, child: TemplateParser<S>) {
        self.subcharts.insert(name.into(), child);
    }

    /// This chart's values merged with every subchart's, prefixed by
    /// subchart name
    pub fn all_values(&self) -> ValueTable {
        flatten(self, MergeStrategy::Auto)
    }

    /// True when this chart or any chart below it references `.Values`
    ///
    /// Subchart name entries added while flattening do not count.
    pub fn has_value_paths(&self) -> bool {
        !self.values.is_empty() || self.subcharts.values().any(Self::has_value_paths)
    }

    /// Scan the text of one template
    pub fn parse_template(&mut self, content: &str) {
        if content.trim().is_empty() {
            return;
        }

        for assignment in self.scanner.assignments(content) {
            self.variables
                .insert(assignment.variable.to_string(), normalize_path(assignment.path));
        }

        let index = PipelineIndex::new(content);

        for raw in self.scanner.direct_references(content) {
            let path = normalize_path(raw);
            let kind = infer_kind(&index, &path);
            self.record_path(&path, kind);
        }

        for reference in self.scanner.variable_references(content) {
            let Some(base) = self.variables.get(reference.variable) else {
                continue;
            };
            let path = normalize_path(&format!("{}.{}", base, reference.field));
            let kind = infer_kind(&index, &path);
            self.record_path(&path, kind);
        }
    }

    /// Read and scan one template file
    ///
    /// Invalid UTF-8 is replaced rather than rejected; templates are text but
    /// may embed arbitrary bytes in literals.
    pub fn parse_template_file(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|source| InferError::ReadTemplate {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(file = %path.display(), "scanning template");
        self.parse_template(&String::from_utf8_lossy(&bytes));
        Ok(())
    }

    /// Record a value path and close its prefixes
    ///
    /// The first observation of a path fixes its kind, except that an
    /// `unknown` entry is promoted by a later structural observation.
    pub fn record_path(&mut self, path: &str, kind: ValueKind) {
        if path.is_empty() {
            return;
        }

        self.upsert(path, kind);

        for prefix in proper_prefixes(path) {
            let prefix_kind = if prefix.ends_with(ARRAY_MARKER) {
                ValueKind::Array
            } else {
                ValueKind::Object
            };
            self.upsert(prefix, prefix_kind);
        }
    }

    fn upsert(&mut self, path: &str, kind: ValueKind) {
        match self.values.get_mut(path) {
            Some(existing) => {
                if existing.kind == ValueKind::Unknown && kind.is_structural() {
                    existing.kind = kind;
                }
            }
            None => {
                self.values
                    .insert(path.to_string(), ValuePath::new(path, kind));
            }
        }
    }
}

impl<S: ReferenceScanner + Clone> TemplateParser<S> {
    /// Parse every template of the chart at `chart_path`, and its subcharts
    /// when enabled, building remote dependencies with `helm`
    pub fn parse_chart(&mut self, chart_path: &Path, options: &ParseOptions) -> Result<()> {
        self.parse_chart_with_builder(chart_path, options, &HelmCli::new())
    }

    /// Same as [`parse_chart`](Self::parse_chart) with a custom dependency
    /// builder
    pub fn parse_chart_with_builder(
        &mut self,
        chart_path: &Path,
        options: &ParseOptions,
        builder: &dyn DependencyBuilder,
    ) -> Result<()> {
        validate_chart_dir(chart_path)?;
        self.parse_chart_at(chart_path, options, builder, 0)
    }

    fn parse_chart_at(
        &mut self,
        chart_path: &Path,
        options: &ParseOptions,
        builder: &dyn DependencyBuilder,
        depth: usize,
    ) -> Result<()> {
        if depth > options.max_depth {
            return Err(InferError::MaxDepthExceeded {
                path: chart_path.to_path_buf(),
                max_depth: options.max_depth,
            });
        }

        for file in find_templates(chart_path)? {
            self.parse_template_file(&file)?;
        }

        if !options.include_subcharts {
            return Ok(());
        }

        let metadata = ChartMetadata::load(chart_path)?;
        if metadata.dependencies.is_empty() {
            return Ok(());
        }

        if metadata.has_remote_dependencies() {
            builder.build(chart_path)?;
        }

        for dependency in &metadata.dependencies {
            let name = dependency.effective_name();
            let subchart_path = dependency.subchart_path(chart_path);

            if let Err(e) = validate_chart_dir(&subchart_path) {
                tracing::debug!(
                    subchart = name,
                    path = %subchart_path.display(),
                    reason = %e,
                    "skipping unavailable subchart"
                );
                continue;
            }

            let mut child = TemplateParser::with_scanner(self.scanner.clone());
            child
                .parse_chart_at(&subchart_path, options, builder, depth + 1)
                .map_err(|source| InferError::Subchart {
                    name: name.to_string(),
                    path: subchart_path.clone(),
                    source: Box::new(source),
                })?;

            tracing::debug!(
                subchart = name,
                values = child.values.len(),
                "parsed subchart"
            );
            self.add_subchart(name, child);
        }

        Ok(())
    }
}
