use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use pkgraph::config::{AnalyzerConfig, ConflictPolicy};
use pkgraph::core::CodebaseAnalyzer;
use pkgraph::formatters::{JsonFormatter, MarkdownFormatter};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "pkgraph",
    version,
    author = "pkgraph developers",
    about = "Go package structure and dependency graph extractor"
)]
struct Cli {
    /// Project root to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output file path
    #[arg(short, long, value_name = "FILE", default_value = "PKGRAPH.md")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// JSON config file; command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Include `_test.go` files
    #[arg(long)]
    include_tests: bool,

    /// Comma-separated directory names to skip, in addition to the defaults
    #[arg(short, long, value_name = "DIRS", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Which declaration survives when a field or method is redeclared
    #[arg(long, value_enum)]
    conflict_policy: Option<PolicyArg>,

    /// Abort on the first malformed file instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Markdown,
    Json,
    JsonCompact,
}

impl OutputFormat {
    fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::JsonCompact => "json-compact",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum PolicyArg {
    LastWins,
    FirstWins,
}

impl From<PolicyArg> for ConflictPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::LastWins => ConflictPolicy::LastWins,
            PolicyArg::FirstWins => ConflictPolicy::FirstWins,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    run(cli)
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };

    if cli.include_tests {
        config = config.with_tests(true);
    }
    if cli.strict {
        config = config.with_fail_on_malformed(true);
    }
    if let Some(policy) = cli.conflict_policy {
        config = config.with_conflict_policy(policy.into());
    }
    let extra: Vec<&str> = cli
        .exclude
        .iter()
        .map(|dir| dir.trim())
        .filter(|dir| !dir.is_empty())
        .collect();
    Ok(config.with_excluded_dirs(extra))
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();
    let config = build_config(&cli)?;

    tracing::info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        format = cli.format.as_str(),
        "starting analysis"
    );

    let analyzer = CodebaseAnalyzer::with_config(config)?;
    let analysis = analyzer.analyze(&cli.input)?;
    tracing::info!(
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "analysis finished"
    );

    let mut generated_output = cli.output.clone();
    match cli.format {
        OutputFormat::Markdown => {
            MarkdownFormatter::new().format_to_file(&analysis, &cli.output)?;
        }
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let formatter = if cli.format == OutputFormat::Json {
                JsonFormatter::new()
            } else {
                JsonFormatter::compact()
            };
            generated_output = cli.output.with_extension("json");
            formatter.format_to_file(&analysis, &generated_output)?;
        }
    }

    tracing::info!(
        output = %generated_output.display(),
        total_secs = start_time.elapsed().as_secs_f64(),
        "report written"
    );
    Ok(())
}
