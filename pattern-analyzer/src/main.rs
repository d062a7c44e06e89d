//! Column pattern analysis tool.
//!
//! This binary browses a PostgreSQL or Oracle database, samples one column
//! and reports whether its values share a prefix, form a consecutive
//! integer sequence, or match a regular expression.
//!
//! # Security Guarantees
//! - Read-only database sessions only
//! - No credentials stored in presets or logged
//! - Every sample is bounded by a row limit

mod connection;
mod output;

use clap::{Args, Parser, Subcommand};
use connection::ConnectionArgs;
use output::OutputFormat;
use pattern_analyzer_core::{
    AnalysisPipeline, AnalysisRequest, AnalysisType, Analyzer, Dialect, PatternAnalyzerError,
    PresetStore, Sampler, SamplingConfig, SchemaBrowser, logging::init_logging,
    presets::DEFAULT_PRESET_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Exit status for an operation cancelled with Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "pattern-analyzer")]
#[command(about = "Column pattern analysis for PostgreSQL and Oracle")]
#[command(version)]
#[command(long_about = "
Pattern Analyzer - Structural pattern detection for database columns

Samples up to --limit non-null values of one column, sorted ascending, and
checks them against a pattern:
- prefix:   longest prefix shared by every value
- sequence: integers increasing by exactly one
- regex:    user-supplied regular expression (substring match)
- auto:     sequence, then prefix, then no pattern

SECURITY FEATURES:
- Read-only sessions only
- Passwords never written to presets or logs

EXAMPLES:
  pattern-analyzer --url postgres://app@localhost/sales --password-prompt schemas
  pattern-analyzer --url postgres://app@localhost/sales analyze --schema public --table orders --column order_no
  pattern-analyzer --dialect oracle --host ora --database XEPDB1 --username hr analyze --sql 'SELECT email FROM employees' --type regex --pattern '@example\\.com$'
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all log output except errors")]
    pub quiet: bool,

    /// Preset file path
    #[arg(
        long,
        env = "PATTERN_ANALYZER_PRESETS",
        default_value = DEFAULT_PRESET_FILE,
        global = true
    )]
    pub presets: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Test the database connection
    Test,
    /// List non-system schemas
    Schemas,
    /// List non-system tables
    Tables(TablesArgs),
    /// List the columns of one table
    Columns(ColumnsArgs),
    /// Sample a column and analyze it
    Analyze(AnalyzeArgs),
    /// Manage saved analysis presets
    #[command(subcommand)]
    Preset(PresetCommand),
    /// List supported database dialects
    Dialects,
}

#[derive(Args)]
pub struct TablesArgs {
    /// Restrict the listing to one schema
    #[arg(long)]
    pub schema: Option<String>,
}

#[derive(Args)]
pub struct ColumnsArgs {
    #[arg(long)]
    pub schema: String,
    #[arg(long)]
    pub table: String,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Schema of the target column
    #[arg(long, required_unless_present = "sql")]
    pub schema: Option<String>,

    /// Table of the target column
    #[arg(long, required_unless_present = "sql")]
    pub table: Option<String>,

    /// Target column; with --sql, the name results are reported against
    #[arg(long, required_unless_present = "sql")]
    pub column: Option<String>,

    /// Sample with this query instead of a column projection (trusted input)
    #[arg(long)]
    pub sql: Option<String>,

    /// Analysis type: prefix, sequence, regex or auto
    #[arg(long = "type", default_value = "auto")]
    pub analysis_type: AnalysisType,

    /// Regular expression for --type regex
    #[arg(long)]
    pub pattern: Option<String>,

    /// Maximum number of values to sample
    #[arg(long, default_value_t = pattern_analyzer_core::models::DEFAULT_ROW_LIMIT)]
    pub limit: u32,

    /// Inclusive lower bound for numeric columns
    #[arg(long, allow_negative_numbers = true)]
    pub range_start: Option<i64>,

    /// Inclusive upper bound for numeric columns
    #[arg(long, allow_negative_numbers = true)]
    pub range_end: Option<i64>,

    /// Save this request as a preset under NAME
    #[arg(long, value_name = "NAME")]
    pub save_preset: Option<String>,
}

#[derive(Subcommand)]
pub enum PresetCommand {
    /// List saved presets
    List,
    /// Show one preset as JSON
    Show { name: String },
    /// Delete a preset
    Delete { name: String },
    /// Run a saved preset (password taken from the current flags)
    Run { name: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            signal_token.cancel();
        }
    });

    match run(&cli, &cancel).await {
        Ok(code) => code,
        Err(e) if is_cancelled(&e) => {
            eprintln!("operation cancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<PatternAnalyzerError>()
        .is_some_and(PatternAnalyzerError::is_cancelled)
}

async fn run(cli: &Cli, cancel: &CancellationToken) -> anyhow::Result<ExitCode> {
    let format = cli.global.format;
    let presets = PresetStore::new(&cli.global.presets);

    match &cli.command {
        Command::Test => test_connection(cli, cancel).await,
        Command::Schemas => {
            let schemas = browser(cli)?.list_schemas(cancel).await?;
            println!("{}", output::render_names(&schemas, format)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Tables(args) => {
            let tables = browser(cli)?
                .list_tables(args.schema.as_deref(), cancel)
                .await?;
            println!("{}", output::render_tables(&tables, format)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Columns(args) => {
            let columns = browser(cli)?
                .list_columns(&args.schema, &args.table, cancel)
                .await?;
            println!("{}", output::render_columns(&columns, format)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Analyze(args) => {
            let request = build_request(cli, args)?;
            if let Some(name) = &args.save_preset {
                presets.save(name, &request).await?;
                info!(preset = %name, "Preset saved");
            }
            analyze(cli, &request, cancel).await
        }
        Command::Preset(command) => preset_command(cli, &presets, command, cancel).await,
        Command::Dialects => {
            list_dialects();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn browser(cli: &Cli) -> anyhow::Result<SchemaBrowser> {
    Ok(SchemaBrowser::new(
        cli.connection.descriptor()?,
        cli.connection.connection_config()?,
        SamplingConfig::default(),
    ))
}

/// Tests the connection; a failed test exits non-zero without an error.
async fn test_connection(cli: &Cli, cancel: &CancellationToken) -> anyhow::Result<ExitCode> {
    let browser = browser(cli)?;
    info!(target_db = %browser.descriptor(), "Testing database connection...");

    let outcome = browser.test_connection(cancel).await;
    if outcome.cancelled {
        return Err(PatternAnalyzerError::cancelled("test connection").into());
    }

    println!("{}", outcome.message);
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_request(cli: &Cli, args: &AnalyzeArgs) -> anyhow::Result<AnalysisRequest> {
    let mut request = AnalysisRequest::new(cli.connection.descriptor()?, args.analysis_type)
        .with_column(
            args.schema.clone().unwrap_or_default(),
            args.table.clone().unwrap_or_default(),
            args.column.clone().unwrap_or_default(),
        )
        .with_range(args.range_start, args.range_end)
        .with_limit(args.limit);

    if let Some(sql) = &args.sql {
        request = request.with_custom_sql(sql);
    }
    if let Some(pattern) = &args.pattern {
        request = request.with_regex_pattern(pattern);
    }

    request.validate()?;
    Ok(request)
}

async fn analyze(
    cli: &Cli,
    request: &AnalysisRequest,
    cancel: &CancellationToken,
) -> anyhow::Result<ExitCode> {
    let sampler = Sampler::new(
        request.connection.clone(),
        cli.connection.connection_config()?,
        SamplingConfig::default(),
    );
    let pipeline = AnalysisPipeline::new(sampler, Arc::new(Analyzer::new()));

    info!(target_db = %request.connection, "Starting analysis...");
    let result = pipeline.run(request, cancel).await?;

    println!("{}", output::render_result(&result, cli.global.format)?);
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn preset_command(
    cli: &Cli,
    presets: &PresetStore,
    command: &PresetCommand,
    cancel: &CancellationToken,
) -> anyhow::Result<ExitCode> {
    match command {
        PresetCommand::List => {
            let all = presets.list().await?;
            if all.is_empty() && cli.global.format == OutputFormat::Text {
                println!("No presets saved in {}", presets.path().display());
            } else {
                println!("{}", output::render_presets(&all, cli.global.format)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        PresetCommand::Show { name } => {
            let Some(preset) = presets.get(name).await? else {
                anyhow::bail!("no preset named '{name}'");
            };
            println!("{}", serde_json::to_string_pretty(&preset)?);
            Ok(ExitCode::SUCCESS)
        }
        PresetCommand::Delete { name } => {
            if !presets.delete(name).await? {
                anyhow::bail!("no preset named '{name}'");
            }
            println!("Deleted preset '{name}'");
            Ok(ExitCode::SUCCESS)
        }
        PresetCommand::Run { name } => {
            let Some(preset) = presets.get(name).await? else {
                anyhow::bail!("no preset named '{name}'");
            };
            let mut request = preset.request;
            if let Some(password) = cli.connection.resolve_password()? {
                request.connection.credentials.set_password(Some(password));
            }
            analyze(cli, &request, cancel).await
        }
    }
}

/// Lists supported dialects and whether their driver is compiled in.
fn list_dialects() {
    println!("Supported database dialects:");
    for dialect in Dialect::ALL {
        let status = if dialect.is_driver_available() {
            "available"
        } else {
            "driver not compiled in"
        };
        println!(
            "  {:<10} {} (default port {}, {}) [{status}]",
            dialect.as_str(),
            dialect.product_name(),
            dialect.default_port(),
            dialect.database_label()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "pattern-analyzer",
            "--url",
            "postgres://app@localhost/sales",
            "analyze",
            "--schema",
            "public",
            "--table",
            "orders",
            "--column",
            "id",
            "--type",
            "seq",
            "--range-start",
            "-5",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::Analyze(args) = &cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.analysis_type, AnalysisType::Sequence);
        assert_eq!(args.range_start, Some(-5));
        assert_eq!(args.limit, 1000);
        assert_eq!(cli.global.format, OutputFormat::Json);

        let request = build_request(&cli, args).unwrap();
        assert_eq!(request.table_ref().to_string(), "public.orders");
        assert!(!request.use_custom_sql);
    }

    #[test]
    fn test_analyze_requires_target_or_sql() {
        let missing = Cli::try_parse_from(["pattern-analyzer", "analyze", "--schema", "public"]);
        assert!(missing.is_err());

        let cli = Cli::try_parse_from([
            "pattern-analyzer",
            "--url",
            "oracle://hr@ora/XEPDB1",
            "analyze",
            "--sql",
            "SELECT email FROM employees",
            "--type",
            "regex",
            "--pattern",
            "@",
        ])
        .unwrap();
        let Command::Analyze(args) = &cli.command else {
            panic!("expected analyze");
        };
        let request = build_request(&cli, args).unwrap();
        assert!(request.use_custom_sql);
        assert_eq!(request.result_column_name(), "query");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = Cli::try_parse_from([
            "pattern-analyzer",
            "analyze",
            "--sql",
            "SELECT 1",
            "--type",
            "fuzzy",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cancelled_error_detected() {
        let cancelled: anyhow::Error = PatternAnalyzerError::cancelled("sample column").into();
        assert!(is_cancelled(&cancelled));

        let other = anyhow::anyhow!("boom");
        assert!(!is_cancelled(&other));
    }
}
