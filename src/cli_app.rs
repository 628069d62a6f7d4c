//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use render_rename::core::config::{CollisionPolicy, Config};
use render_rename::core::errors::RenameError;
use render_rename::core::paths::resolve_root;
use render_rename::logger::jsonl::JsonlWriter;
use render_rename::rename::renamer::{PassReport, Renamer, RenamerConfig, RunReport};

/// render_rename — strips a render-tag marker from output folders and frames.
///
/// With no arguments, every immediate subdirectory of the current directory
/// whose name contains the marker has the marker removed from the files
/// inside it, then from its own name.
#[derive(Debug, Parser)]
#[command(
    name = "rrn",
    author,
    version,
    about = "Strip render-tag markers from output folders and the frames inside them",
    long_about = None
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(flatten)]
    rename: RenameArgs,
    /// Optional subcommand; omit to run the rename.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// View and check configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct RenameArgs {
    /// Directory to scan (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Marker text to strip (default: -Camera).
    #[arg(long, value_name = "TEXT")]
    marker: Option<String>,
    /// What to do when the stripped name already exists: skip or overwrite.
    #[arg(long, value_name = "POLICY")]
    on_collision: Option<CollisionPolicy>,
    /// Append a JSONL activity log to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
    /// Load and validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Run completed but some candidates were skipped or failed.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<RenameError> for CliError {
    fn from(value: RenameError) -> Self {
        match value {
            RenameError::InvalidConfig { .. }
            | RenameError::MissingConfig { .. }
            | RenameError::ConfigParse { .. } => Self::User(value.to_string()),
            _ => Self::Runtime(value.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        None => run_rename(cli),
        Some(Command::Config(args)) => run_config(cli, args),
        Some(Command::Completions(args)) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Rename run
// ---------------------------------------------------------------------------

fn run_rename(cli: &Cli) -> Result<(), CliError> {
    let config = effective_config(cli)?;
    let root = resolve_root(cli.rename.root.as_deref())?;
    let renamer_config = RenamerConfig::from_config(&config.rename)?;
    let logger = config.logging.jsonl_path.as_ref().map(JsonlWriter::open);

    let mut renamer = Renamer::new(renamer_config, logger);
    let report = renamer.run(&root)?;

    match output_mode(cli) {
        OutputMode::Human => print_report_human(cli, &report),
        OutputMode::Json => {
            let payload = json!({
                "command": "run",
                "complete": report.is_complete(),
                "renamed": report.renamed_count(),
                "skipped": report.skipped_count(),
                "failed": report.failed_count(),
                "report": report,
            });
            write_json_line(&payload)?;
        }
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::Partial(format!(
            "run incomplete: {} skipped, {} failed",
            report.skipped_count(),
            report.failed_count()
        )))
    }
}

fn print_report_human(cli: &Cli, report: &RunReport) {
    if cli.verbose {
        println!("Root: {}", report.root.display());
        println!("Marker: {:?}", report.marker);
        println!("On collision: {}", report.on_collision);
        println!();
    }

    print_pass_human(cli, &report.root, &report.files);
    print_pass_human(cli, &report.root, &report.directories);

    if cli.quiet {
        return;
    }
    if report.renamed_count() == 0 && report.is_complete() {
        println!("Nothing to rename under {}.", report.root.display());
        return;
    }
    println!(
        "\nRenamed {} file(s) and {} director{}; {} skipped, {} failed.",
        report.files.renamed.len(),
        report.directories.renamed.len(),
        if report.directories.renamed.len() == 1 {
            "y"
        } else {
            "ies"
        },
        report.skipped_count(),
        report.failed_count(),
    );
    if cli.verbose {
        println!(
            "  File pass: {} ms, directory pass: {} ms",
            report.files.duration.as_millis(),
            report.directories.duration.as_millis()
        );
    }
}

fn print_pass_human(cli: &Cli, root: &Path, pass: &PassReport) {
    if !cli.quiet {
        for record in &pass.renamed {
            println!(
                "{} {} -> {}",
                "renamed".green(),
                relative(root, &record.from).display(),
                relative(root, &record.to).display()
            );
        }
        for record in &pass.skipped {
            println!(
                "{} {}: {}",
                "skipped".yellow(),
                relative(root, &record.path).display(),
                record.message
            );
        }
    }
    for record in &pass.failed {
        eprintln!(
            "{} {}: {}",
            "failed".red().bold(),
            relative(root, &record.path).display(),
            record.error
        );
    }
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn effective_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli.rename);
    config.validate()?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut Config, args: &RenameArgs) {
    if let Some(marker) = &args.marker {
        config.rename.marker.clone_from(marker);
    }
    if let Some(policy) = args.on_collision {
        config.rename.on_collision = policy;
    }
    if let Some(path) = &args.log_file {
        config.logging.jsonl_path = Some(path.clone());
    }
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = effective_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", config.to_toml()?);
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match effective_config(cli) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Marker: {:?}", config.rename.marker);
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(e)
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("RRN_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
