//! Flattening of the parser tree into one value table
//!
//! A chart's own paths come first; each subchart's flattened table is then
//! re-keyed under `<subchart>.` and merged in. Entries already present are
//! never overwritten, so the result does not depend on merge order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::parser::TemplateParser;
use crate::scanner::ReferenceScanner;
use crate::value_path::{ValueKind, ValuePath, ValueTable};

/// Child count above which [`MergeStrategy::Auto`] merges in parallel
pub const PARALLEL_THRESHOLD: usize = 5;

/// How the children of one node are merged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Parallel above [`PARALLEL_THRESHOLD`] children, sequential otherwise
    #[default]
    Auto,
    Sequential,
    /// One task per child, results merged under a single lock
    Parallel,
}

impl MergeStrategy {
    fn resolve(self, children: usize) -> Self {
        match self {
            Self::Auto if children > PARALLEL_THRESHOLD => Self::Parallel,
            Self::Auto => Self::Sequential,
            other => other,
        }
    }
}

/// Flatten a parser and all of its subcharts into one table
///
/// Every node resolves `strategy` against its own child count.
pub fn flatten<S: ReferenceScanner>(node: &TemplateParser<S>, strategy: MergeStrategy) -> ValueTable {
    let mut merged = node.values().clone();
    let subcharts = node.subcharts();

    if subcharts.is_empty() {
        return merged;
    }

    match strategy.resolve(subcharts.len()) {
        MergeStrategy::Parallel => {
            tracing::debug!(children = subcharts.len(), "merging subcharts in parallel");
            merge_parallel(&mut merged, subcharts, strategy);
        }
        _ => merge_sequential(&mut merged, subcharts, strategy),
    }

    merged
}

fn merge_sequential<S: ReferenceScanner>(
    merged: &mut ValueTable,
    subcharts: &BTreeMap<String, TemplateParser<S>>,
    strategy: MergeStrategy,
) {
    for (name, child) in subcharts {
        merge_child(merged, name, flatten(child, strategy));
    }
}

fn merge_parallel<S: ReferenceScanner>(
    merged: &mut ValueTable,
    subcharts: &BTreeMap<String, TemplateParser<S>>,
    strategy: MergeStrategy,
) {
    let shared = Mutex::new(std::mem::take(merged));

    rayon::scope(|scope| {
        for (name, child) in subcharts {
            let shared = &shared;
            scope.spawn(move |_| {
                let table = flatten(child, strategy);
                let mut guard = shared.lock().unwrap_or_else(|e| e.into_inner());
                merge_child(&mut guard, name, table);
            });
        }
    });

    *merged = shared.into_inner().unwrap_or_else(|e| e.into_inner());
}

/// Merge a flattened child table under `name.`
fn merge_child(target: &mut ValueTable, name: &str, child: ValueTable) {
    for value in child.values() {
        let value = value.prefixed(name);
        target.entry(value.path.clone()).or_insert(value);
    }

    let entry = target
        .entry(name.to_string())
        .or_insert_with(|| ValuePath::new(name, ValueKind::Object));
    if entry.kind == ValueKind::Unknown {
        entry.kind = ValueKind::Object;
    }
}
