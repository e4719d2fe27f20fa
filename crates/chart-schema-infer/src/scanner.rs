//! Pattern-based discovery of `.Values` references
//!
//! The scanner works on raw template text with three regular expressions
//! instead of a Go template grammar. It sits behind [`ReferenceScanner`] so a
//! real tokenizer can replace it without touching the parser, aggregator or
//! schema layers.
//!
//! A path match stops at the first character that is not an identifier
//! character, digit, dot or bracket, so trailing pipes, closing delimiters
//! and punctuation never leak into a recorded path:
//!
//! ```text
//! {{ .Values.app.name }}          -> app.name
//! {{ .Values.app.name | quote }}  -> app.name
//! {{ .Values.items[0].name }}     -> items[0].name
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Single identifier: `app`, `name`, `config`
const IDENTIFIER: &str = r"[a-zA-Z][a-zA-Z0-9_]*";

/// Opening delimiter, with optional whitespace trim marker
const PIPELINE_OPEN: &str = r"\{\{-?\s*";

/// Assignment operator with surrounding whitespace
const ASSIGN: &str = r"\s*:=\s*";

/// Where a value path stops: any character that cannot continue a path
const VALUE_BOUNDARY: &str = r"(?:[^a-zA-Z0-9._\[\]]|$)";

/// Where an assigned value may end: a pipe continuation, whitespace, or the
/// closing delimiter
const PIPELINE_BOUNDARY: &str = r"(?:\s*[|}\s]|\s*-?\}\})";

/// `app`, `app.name`, `items[0].name`
fn value_path() -> String {
    format!(r"{IDENTIFIER}(?:\.{IDENTIFIER}|\[\d+\])*?")
}

/// `.Values.path`
static DIRECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\.Values\.({}){VALUE_BOUNDARY}", value_path())).unwrap()
});

/// `{{ $var := .Values.path }}`
static ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{PIPELINE_OPEN}\$({IDENTIFIER}){ASSIGN}\.Values\.({}){PIPELINE_BOUNDARY}",
        value_path()
    ))
    .unwrap()
});

/// `$var.field`
static VARIABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\$({IDENTIFIER})\.({}){VALUE_BOUNDARY}", value_path())).unwrap()
});

/// A local variable bound to a `.Values` path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    /// Variable name without the `$`
    pub variable: &'a str,
    /// Raw path after `.Values.`
    pub path: &'a str,
}

/// A field access through a local variable, e.g. `$db.host`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableReference<'a> {
    /// Variable name without the `$`
    pub variable: &'a str,
    /// Raw field path after the variable
    pub field: &'a str,
}

/// Finds value references in template text
///
/// Returned paths are raw matches; normalization is the caller's job.
pub trait ReferenceScanner: Send + Sync {
    /// `{{ $var := .Values.path }}` bindings, in text order
    fn assignments<'a>(&self, content: &'a str) -> Vec<Assignment<'a>>;

    /// Paths of every direct `.Values.path` reference, in text order
    fn direct_references<'a>(&self, content: &'a str) -> Vec<&'a str>;

    /// Every `$var.field` reference, in text order
    fn variable_references<'a>(&self, content: &'a str) -> Vec<VariableReference<'a>>;
}

/// Regular-expression implementation of [`ReferenceScanner`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternScanner;

impl PatternScanner {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceScanner for PatternScanner {
    fn assignments<'a>(&self, content: &'a str) -> Vec<Assignment<'a>> {
        ASSIGNMENT_RE
            .captures_iter(content)
            .filter_map(|caps| {
                Some(Assignment {
                    variable: caps.get(1)?.as_str(),
                    path: caps.get(2)?.as_str(),
                })
            })
            .collect()
    }

    fn direct_references<'a>(&self, content: &'a str) -> Vec<&'a str> {
        DIRECT_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    fn variable_references<'a>(&self, content: &'a str) -> Vec<VariableReference<'a>> {
        VARIABLE_RE
            .captures_iter(content)
            .filter_map(|caps| {
                Some(VariableReference {
                    variable: caps.get(1)?.as_str(),
                    field: caps.get(2)?.as_str(),
                })
            })
            .collect()
    }
}
