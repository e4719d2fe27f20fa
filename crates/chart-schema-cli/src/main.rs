//! chart-schema CLI - JSON Schema for Helm chart values, inferred from templates

use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use chart_schema_core::HelmCli;
use chart_schema_infer::{InferError, ParseOptions, generate_schema, parse_chart_tree};

mod error;
mod exit_codes;

use error::Result;

#[derive(Parser)]
#[command(name = "chart-schema")]
#[command(version)]
#[command(
    about = "Generate a JSON Schema for Helm chart values from template usage",
    long_about = None
)]
struct Cli {
    /// Chart directory
    chart: PathBuf,

    /// Do not descend into the dependencies listed in Chart.yaml
    #[arg(long)]
    no_subcharts: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print every discovered value path with its inferred kind instead of
    /// the schema
    #[arg(long)]
    paths: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(&cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--debug`
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let options = ParseOptions::new().with_subcharts(!cli.no_subcharts);
    tracing::debug!(
        chart = %cli.chart.display(),
        include_subcharts = options.include_subcharts,
        max_depth = options.max_depth,
        paths = cli.paths,
        "resolved options"
    );

    let rendered = if cli.paths {
        render_paths(&cli.chart, &options)?
    } else {
        generate_schema(&cli.chart, &options)?.to_json_pretty()?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))?;
            eprintln!("{} Wrote {}", style("✓").green(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// One `path<TAB>kind` line per entry of the flattened value table
fn render_paths(chart: &Path, options: &ParseOptions) -> Result<String> {
    let parser = parse_chart_tree(chart, options, &HelmCli::new())?;

    if !parser.has_value_paths() {
        return Err(InferError::NoValuePaths {
            path: chart.to_path_buf(),
        }
        .into());
    }

    Ok(parser
        .all_values()
        .values()
        .map(|value| format!("{}\t{}", value.path, value.kind))
        .collect::<Vec<_>>()
        .join("\n"))
}
