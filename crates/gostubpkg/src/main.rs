//! Command-line entry point for generating Go stub packages.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use libgostub::{
    BuildContext, Config, DEFAULT_CONFIG, FormatterKind, FunctionBodies, Gostub, OverrideKey,
};
use tracing::info;

/// Create stub packages from Go packages: exported API kept, bodies replaced with panics.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Package patterns to stub, e.g. ./... or ./pkg/types
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Config file [default: ./gostubpkg.yaml, ignored when missing]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of the Go module to read [default: .]
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for the stubs [default: .]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Generate a go.mod at the root of the stub module
    #[arg(short = 'm', long, default_value_t = false)]
    generate_go_mod: bool,

    /// External import path kept in the stubs. Repeatable, comma-delimited
    #[arg(short, long, value_delimiter = ',')]
    allow_imports: Vec<String>,

    /// Body for a stubbed function, e.g. -f 'pkg.(*Type).Method=return nil'. Repeatable
    #[arg(short = 'f', long = "function-bodies", value_name = "KEY=BODY", value_parser = FunctionBodies::parse_entry)]
    function_bodies: Vec<(OverrideKey, String)>,

    /// Target operating system for file selection [default: host]
    #[arg(long, env = "GOOS")]
    goos: Option<String>,

    /// Target architecture for file selection [default: host]
    #[arg(long, env = "GOARCH")]
    goarch: Option<String>,

    /// Extra build tags, comma-delimited
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Import formatter: native or goimports [default: native]
    #[arg(long)]
    formatter: Option<FormatterKind>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_optional(&PathBuf::from(DEFAULT_CONFIG))?,
    };
    Ok(config)
}

/// Command-line values override config values; lists are concatenated.
fn build(cli: Cli, config: Config) -> anyhow::Result<Gostub> {
    let input_dir = cli
        .input_dir
        .or(config.input_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let output_dir = cli
        .output_dir
        .or(config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let host = BuildContext::host();
    let ctx = BuildContext::new(
        cli.goos.or(config.goos.clone()).unwrap_or(host.goos),
        cli.goarch.or(config.goarch.clone()).unwrap_or(host.goarch),
    )
    .with_tags(config.tags.iter().chain(&cli.tags).cloned());

    let mut bodies = config
        .function_bodies()
        .context("Invalid function-bodies in config file")?;
    for (key, body) in cli.function_bodies {
        bodies.insert(key, body);
    }

    Ok(Gostub::new(input_dir)
        .with_output_dir(output_dir)
        .with_generate_go_mod(cli.generate_go_mod || config.generate_go_mod.unwrap_or(false))
        .with_allow_imports(config.allow_imports.into_iter().chain(cli.allow_imports))
        .with_function_bodies(bodies)
        .with_build_context(ctx)
        .with_formatter(cli.formatter.or(config.formatter).unwrap_or_default()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let patterns = cli.patterns.clone();
    let gostub = build(cli, config)?;
    let written = gostub
        .generate(&patterns)
        .context("Failed to generate stubs")?;
    info!("generated {} files", written.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet) {
        eprintln!("{e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
