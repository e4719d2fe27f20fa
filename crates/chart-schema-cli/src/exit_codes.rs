//! Standard exit codes for CLI operations
//!
//! Success is 0. Argument errors are reported by clap with code 2.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Chart error - missing Chart.yaml or templates/, unreadable Chart.yaml
pub const CHART_ERROR: i32 = 3;

/// Template error - a template file could not be read
pub const TEMPLATE_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Dependency error - helm missing, dependency build failed, subchart cycle
pub const DEPENDENCY_ERROR: i32 = 6;

/// Empty schema - no `.Values` reference in any template
pub const EMPTY_SCHEMA_ERROR: i32 = 7;
