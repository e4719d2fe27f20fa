//! JSON Schema assembly
//!
//! Turns a flat table of dotted paths into a nested draft 2020-12 document.
//! Paths are processed in lexicographic order; intermediate segments become
//! objects, `[]` segments become arrays whose item schema is refined by the
//! rest of the path. Leaves are typed from their kind:
//!
//! ```text
//! app.name      unknown  ->  "app": { "type": "object", "properties": { "name": {} } }
//! items         array    ->  "items": { "type": "array", "items": {} }
//! config        map      ->  "config": { "type": "object" }
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{MergeStrategy, flatten};
use crate::error::Result;
use crate::parser::TemplateParser;
use crate::scanner::ReferenceScanner;
use crate::value_path::{ARRAY_MARKER, ValueKind, ValueTable};

/// Dialect URI written to `$schema`
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Structural JSON Schema types emitted by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
}

/// One node of the schema tree
///
/// An untyped node with no children serializes as `{}`, which accepts any
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    /// Object node with the given properties
    pub fn object(properties: BTreeMap<String, SchemaNode>) -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            properties,
            items: None,
        }
    }

    /// Turn this node into an object and return its properties
    fn as_object(&mut self) -> &mut BTreeMap<String, SchemaNode> {
        self.schema_type = Some(SchemaType::Object);
        self.items = None;
        &mut self.properties
    }

    /// Turn this node into an array and return its item schema
    fn as_array(&mut self) -> &mut SchemaNode {
        self.schema_type = Some(SchemaType::Array);
        self.properties.clear();
        self.items.get_or_insert_with(Box::default)
    }

    /// Type a leaf without discarding structure learned from other paths
    fn apply_kind(&mut self, kind: ValueKind) {
        if self.schema_type.is_some() {
            return;
        }
        match kind {
            ValueKind::Array => {
                self.as_array();
            }
            ValueKind::Map | ValueKind::Object => self.schema_type = Some(SchemaType::Object),
            ValueKind::Unknown => {}
        }
    }
}

/// Root schema document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchema {
    #[serde(rename = "$schema")]
    pub dialect: String,

    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    pub properties: BTreeMap<String, SchemaNode>,
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl JsonSchema {
    pub fn new(properties: BTreeMap<String, SchemaNode>) -> Self {
        Self {
            dialect: SCHEMA_DIALECT.to_string(),
            schema_type: SchemaType::Object,
            properties,
        }
    }

    /// True when no value is described at all
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Schema of a chart tree before subcharts are nested under their names
#[derive(Debug, Clone, Default)]
pub struct ChartSchema {
    /// Built from the root chart's own values
    pub root: JsonSchema,
    /// Built from each subchart's flattened values, by effective name
    pub subcharts: BTreeMap<String, JsonSchema>,
}

impl ChartSchema {
    /// Nest every subchart schema under its name in the root schema
    pub fn merge(self) -> JsonSchema {
        merge_bundles(self.root, self.subcharts)
    }
}

/// Build a schema document from a value table
pub fn build_schema(table: &ValueTable) -> JsonSchema {
    let mut properties = BTreeMap::new();

    for (path, value) in table {
        insert_path(&mut properties, path, value.kind);
    }

    JsonSchema::new(properties)
}

/// Build the root schema and one schema per direct subchart
///
/// Each subchart schema covers that subchart's whole subtree, so values of
/// nested subcharts appear below their parent subchart.
pub fn generate_chart_schemas<S: ReferenceScanner>(
    parser: &TemplateParser<S>,
    strategy: MergeStrategy,
) -> ChartSchema {
    let subcharts = parser
        .subcharts()
        .iter()
        .map(|(name, child)| (name.clone(), build_schema(&flatten(child, strategy))))
        .collect();

    ChartSchema {
        root: build_schema(parser.values()),
        subcharts,
    }
}

/// Combine a root schema with subchart schemas
///
/// Each subchart becomes one top-level object property named after it whose
/// properties are exactly the subchart schema's properties. A root property
/// with the same name is replaced.
pub fn merge_bundles(
    root: JsonSchema,
    children: impl IntoIterator<Item = (String, JsonSchema)>,
) -> JsonSchema {
    let mut merged = root;

    for (name, child) in children {
        merged
            .properties
            .insert(name, SchemaNode::object(child.properties));
    }

    merged
}

/// Split `items[][]` into `("items", 2)`
fn split_array_markers(segment: &str) -> (&str, usize) {
    let mut name = segment;
    let mut depth = 0;
    while let Some(stripped) = name.strip_suffix(ARRAY_MARKER) {
        name = stripped;
        depth += 1;
    }
    (name, depth)
}

fn insert_path(root: &mut BTreeMap<String, SchemaNode>, path: &str, kind: ValueKind) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = descend(current, segment);
    }

    let (name, depth) = split_array_markers(last);
    let mut node = current.entry(name.to_string()).or_default();

    if depth == 0 {
        node.apply_kind(kind);
        return;
    }

    for _ in 0..depth {
        node = node.as_array();
    }
    if kind.is_structural() && node.schema_type.is_none() {
        node.schema_type = Some(SchemaType::Object);
    }
}

/// Walk into an intermediate segment, returning the properties of the object
/// it designates
fn descend<'a>(
    properties: &'a mut BTreeMap<String, SchemaNode>,
    segment: &str,
) -> &'a mut BTreeMap<String, SchemaNode> {
    let (name, depth) = split_array_markers(segment);
    let mut node = properties.entry(name.to_string()).or_default();

    for _ in 0..depth {
        node = node.as_array();
    }
    node.as_object()
}
