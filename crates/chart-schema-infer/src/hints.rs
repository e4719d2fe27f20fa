//! Usage hints for type inference
//!
//! Classifies a value path from how templates use it. Every `{{ ... }}`
//! expression is tokenized once per file; each occurrence of the reference
//! `.Values.<path>` is then examined in its token neighbourhood:
//!
//! | Usage                                   | Hint             |
//! |-----------------------------------------|------------------|
//! | `{{ range $k, $v := .Values.config }}`  | map iteration    |
//! | `{{ range .Values.items }}`             | array iteration  |
//! | `{{ keys .Values.labels }}`             | map operation    |
//! | `{{ len .Values.hosts }}`               | array operation  |
//! | `{{ .Values.hosts \| first }}`          | array operation  |
//!
//! Precedence: an explicit `[]` marker anywhere in the path, then map
//! hints, then array hints. Anything else is [`ValueKind::Unknown`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::normalize_path;
use crate::value_path::{ARRAY_MARKER, ValueKind};

/// Body of every `{{ ... }}` expression, trim markers excluded
static PIPELINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{-?\s*([^}]+?)\s*-?\}\}").unwrap());

/// Functions whose argument is a map
const MAP_FUNCTIONS: &[&str] = &["keys", "values", "hasKey"];

/// Functions whose argument is a list
const ARRAY_FUNCTIONS: &[&str] = &["len", "index", "append", "first", "last"];

const RANGE: &str = "range";
const DECLARE: &str = ":=";
const COMMA: &str = ",";
const PIPE: &str = "|";

/// Type hints gathered from template pipelines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineHints {
    /// `{{ range .Values.path }}`
    pub array_iteration: bool,
    /// `{{ range $k, $v := .Values.path }}`
    pub map_iteration: bool,
    /// `{{ len .Values.path }}`, `{{ index .Values.path 0 }}`
    pub array_operation: bool,
    /// `{{ keys .Values.path }}`, `{{ hasKey .Values.path "key" }}`
    pub map_operation: bool,
}

impl PipelineHints {
    #[inline]
    pub fn is_map(&self) -> bool {
        self.map_iteration || self.map_operation
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.array_iteration || self.array_operation
    }
}

/// Tokenized pipelines of one template file
#[derive(Debug, Clone, Default)]
pub struct PipelineIndex {
    pipelines: Vec<Vec<String>>,
}

impl PipelineIndex {
    /// Extract and tokenize every `{{ ... }}` expression of `content`
    pub fn new(content: &str) -> Self {
        let pipelines = PIPELINE_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|body| tokenize_pipeline(body.as_str()))
            .filter(|tokens| !tokens.is_empty())
            .collect();

        Self { pipelines }
    }

    /// Number of pipelines found
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Collect hints for the normalized value path `path`
    pub fn hints_for(&self, path: &str) -> PipelineHints {
        let target = format!(".Values.{}", path);
        let mut hints = PipelineHints::default();

        for tokens in &self.pipelines {
            analyze_tokens(tokens, &target, &mut hints);
        }

        hints
    }
}

/// Classify a normalized value path from its usage in one file
pub fn infer_kind(index: &PipelineIndex, path: &str) -> ValueKind {
    if path.contains(ARRAY_MARKER) {
        return ValueKind::Array;
    }

    let hints = index.hints_for(path);

    if hints.is_map() {
        ValueKind::Map
    } else if hints.is_array() {
        ValueKind::Array
    } else {
        ValueKind::Unknown
    }
}

/// Split a pipeline expression into tokens
///
/// Quoted literals stay atomic, `,` and `|` are tokens of their own, and
/// `:=` is one token even without surrounding whitespace. Whitespace,
/// parentheses and a lone `:` or `=` only separate.
pub fn tokenize_pipeline(pipeline: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = pipeline.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(open) = quote {
            current.push(c);
            if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            ',' | '|' => {
                flush(&mut tokens, &mut current);
                tokens.push(c.to_string());
            }
            ':' if chars.peek() == Some(&'=') => {
                chars.next();
                flush(&mut tokens, &mut current);
                tokens.push(DECLARE.to_string());
            }
            ':' | '=' | '(' | ')' => flush(&mut tokens, &mut current),
            c if c.is_whitespace() => flush(&mut tokens, &mut current),
            c => current.push(c),
        }
    }

    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Whether `token` is the reference `target`, allowing the `$` root prefix
/// and numeric indices
fn is_reference(token: &str, target: &str) -> bool {
    let token = token.strip_prefix('$').unwrap_or(token);
    token == target || (token.contains('[') && normalize_path(token) == target)
}

fn analyze_tokens(tokens: &[String], target: &str, hints: &mut PipelineHints) {
    let range_idx = tokens.iter().position(|t| t == RANGE);
    let declare_idx = tokens.iter().position(|t| t == DECLARE);

    for (i, token) in tokens.iter().enumerate() {
        if !is_reference(token, target) {
            continue;
        }

        if let Some(range_idx) = range_idx.filter(|&r| r < i) {
            let two_bindings = declare_idx
                .filter(|&d| d > range_idx && d < i)
                .is_some_and(|d| tokens[range_idx..d].iter().any(|t| t == COMMA));

            if two_bindings {
                hints.map_iteration = true;
                return;
            }
            hints.array_iteration = true;
        }

        if let Some(prev) = i.checked_sub(1).map(|p| tokens[p].as_str()) {
            classify_function(prev, hints);
        }

        if tokens.get(i + 1).is_some_and(|t| t == PIPE) {
            if let Some(next) = tokens.get(i + 2) {
                classify_function(next, hints);
            }
        }
    }
}

fn classify_function(name: &str, hints: &mut PipelineHints) {
    if MAP_FUNCTIONS.contains(&name) {
        hints.map_operation = true;
    } else if ARRAY_FUNCTIONS.contains(&name) {
        hints.array_operation = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(content: &str, path: &str) -> ValueKind {
        infer_kind(&PipelineIndex::new(content), path)
    }

    #[test]
    fn test_tokenize_pipeline() {
        let cases: &[(&str, &[&str])] = &[
            ("range .Values.items", &["range", ".Values.items"]),
            (
                "range $key, $value := .Values.config",
                &["range", "$key", ",", "$value", ":=", ".Values.config"],
            ),
            (".Values.name | quote", &[".Values.name", "|", "quote"]),
            ("keys .Values.metadata", &["keys", ".Values.metadata"]),
            (
                "len .Values.items | default 0",
                &["len", ".Values.items", "|", "default", "0"],
            ),
            (
                r#"default "localhost" .Values.host"#,
                &["default", r#""localhost""#, ".Values.host"],
            ),
            ("if .Values.enabled", &["if", ".Values.enabled"]),
            (" $var := .Values.path ", &["$var", ":=", ".Values.path"]),
            (
                "$a, $b, $c := .Values.tuple",
                &["$a", ",", "$b", ",", "$c", ":=", ".Values.tuple"],
            ),
            (
                "range\t$key,\n$value\t:=\n.Values.config",
                &["range", "$key", ",", "$value", ":=", ".Values.config"],
            ),
            ("a|b", &["a", "|", "b"]),
            ("   range   .Values.items   ", &["range", ".Values.items"]),
            ("simple expression", &["simple", "expression"]),
            ("key: value", &["key", "value"]),
            ("$x:=.Values.y", &["$x", ":=", ".Values.y"]),
            (
                r#"printf "%s | %s" .Values.a"#,
                &["printf", r#""%s | %s""#, ".Values.a"],
            ),
            (
                "gt (len .Values.items) 0",
                &["gt", "len", ".Values.items", "0"],
            ),
        ];

        for (pipeline, expected) in cases {
            assert_eq!(&tokenize_pipeline(pipeline), expected, "pipeline: {pipeline:?}");
        }
    }

    #[test]
    fn test_array_iteration() {
        assert_eq!(kind("{{ range .Values.items }}{{ end }}", "items"), ValueKind::Array);
        assert_eq!(
            kind("{{- range $i := .Values.items }}{{ end }}", "items"),
            ValueKind::Array
        );
    }

    #[test]
    fn test_map_iteration() {
        assert_eq!(
            kind("{{ range $k, $v := .Values.config }}{{ end }}", "config"),
            ValueKind::Map
        );
        assert_eq!(
            kind("{{- range $k,$v:=.Values.config -}}{{ end }}", "config"),
            ValueKind::Map
        );
    }

    #[test]
    fn test_map_operations() {
        assert_eq!(kind("{{ keys .Values.labels }}", "labels"), ValueKind::Map);
        assert_eq!(
            kind(r#"{{ if hasKey .Values.annotations "x" }}"#, "annotations"),
            ValueKind::Map
        );
        assert_eq!(kind("{{ .Values.labels | keys }}", "labels"), ValueKind::Map);
    }

    #[test]
    fn test_array_operations() {
        assert_eq!(kind("{{ len .Values.hosts }}", "hosts"), ValueKind::Array);
        assert_eq!(kind("{{ index .Values.hosts 0 }}", "hosts"), ValueKind::Array);
        assert_eq!(kind("{{ .Values.hosts | first }}", "hosts"), ValueKind::Array);
        assert_eq!(kind("{{ .Values.hosts | len }}", "hosts"), ValueKind::Array);
        assert_eq!(kind("{{ if gt (len .Values.hosts) 1 }}", "hosts"), ValueKind::Array);
    }

    #[test]
    fn test_map_hint_wins_over_array_hint() {
        let content = "{{ len .Values.config }}\n{{ keys .Values.config }}";
        assert_eq!(kind(content, "config"), ValueKind::Map);
    }

    #[test]
    fn test_array_marker_wins() {
        let content = "{{ keys .Values.items }}";
        assert_eq!(kind(content, "items[]"), ValueKind::Array);
        assert_eq!(kind("", "list[]"), ValueKind::Array);
    }

    #[test]
    fn test_array_marker_on_inner_segment() {
        assert_eq!(kind("{{ .Values.items[0].name }}", "items[].name"), ValueKind::Array);
        assert_eq!(kind("", "matrix[][].cell.id"), ValueKind::Array);
    }

    #[test]
    fn test_plain_usage_is_unknown() {
        assert_eq!(kind("{{ .Values.app.name | quote }}", "app.name"), ValueKind::Unknown);
        assert_eq!(kind(r#"{{ default "x" .Values.host }}"#, "host"), ValueKind::Unknown);
    }

    #[test]
    fn test_exact_match_only() {
        // `.Values.items.count` is not a use of `.Values.items`
        assert_eq!(kind("{{ range .Values.items.count }}", "items"), ValueKind::Unknown);
    }

    #[test]
    fn test_root_context_reference() {
        assert_eq!(kind("{{ range $.Values.items }}", "items"), ValueKind::Array);
    }

    #[test]
    fn test_pipeline_index() {
        let index = PipelineIndex::new("a: {{ .Values.a }}\nb: {{- .Values.b -}}\nplain text");
        assert_eq!(index.len(), 2);
        assert!(PipelineIndex::new("no templates here").is_empty());
    }
}
