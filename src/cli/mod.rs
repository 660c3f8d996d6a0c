//! CLI command definitions and handlers

mod history;
mod init;
mod scan;

use crate::config::{load_project_config, ProjectConfig};
use crate::reporters::OutputFormat;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};

const DEFAULT_WORKERS: usize = 8;
const MAX_WORKERS: usize = 64;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > MAX_WORKERS {
        Err(format!("workers cannot exceed {MAX_WORKERS}"))
    } else {
        Ok(n)
    }
}

/// whattodo - find TODO comments and trace their history
#[derive(Parser, Debug)]
#[command(name = "whattodo")]
#[command(
    version,
    about = "Find TODO comments in a source tree and reconstruct how they changed over a file's git history",
    long_about = "whattodo scans a directory for TODO comments, and for a single file walks its \
git history (following renames) to show in which commit each TODO was added or removed.\n\n\
Run without a subcommand to scan the current directory:\n  \
whattodo .",
    after_help = "\
Examples:
  whattodo .                                   Scan current directory
  whattodo scan src -e py,sh -o todos.md       Markdown report of .py and .sh TODOs
  whattodo history src/app.py                  When each TODO in app.py came and went
  whattodo history src/app.py -f json          JSON output for scripting
  whattodo init                                Write an example whattodo.toml"
)]
pub struct Cli {
    /// Directory to scan, or file for `history` (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers for history fetches (1-64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Config file (default: whattodo.toml next to the target)
    #[arg(long, global = true, env = "WHATTODO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory for TODO comments
    #[command(after_help = "\
Examples:
  whattodo scan .                        Text report to stdout
  whattodo scan . -e py -e R             Only Python and R files
  whattodo scan . -o todos.md            Markdown file
  whattodo scan . -o todos.tsv           Tab-separated file")]
    Scan {
        /// File extensions to scan, comma separated or repeated (default: py,R,sh,c,cpp,pl)
        #[arg(long, short = 'e', value_delimiter = ',')]
        extensions: Vec<String>,

        /// Output file (format follows the extension; unknown extensions write TSV)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format: text, markdown (or md), json, tsv
        #[arg(long, short = 'f', value_parser = ["text", "markdown", "md", "json", "tsv"])]
        format: Option<String>,

        /// Custom TODO regex (group 1 is the TODO text)
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Show when each TODO in a file was added or removed
    #[command(after_help = "\
Examples:
  whattodo history src/app.py                  Oldest change first
  whattodo history src/app.py --newest-first   Most recent change first
  whattodo history src/app.py -o history.md    Markdown file
  whattodo history src/app.py --backend git    Use the git binary instead of libgit2")]
    History {
        /// Output format: text, markdown (or md), json
        #[arg(long, short = 'f', value_parser = ["text", "markdown", "md", "json"])]
        format: Option<String>,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Git access: libgit2 (built in) or git (runs the git binary)
        #[arg(long, value_parser = ["libgit2", "git"])]
        backend: Option<String>,

        /// Custom TODO regex (group 1 is the TODO text)
        #[arg(long)]
        pattern: Option<String>,

        /// List the most recent change first
        #[arg(long)]
        newest_first: bool,

        /// Only look at the newest N revisions (0 = all)
        #[arg(long)]
        max_revisions: Option<usize>,
    },

    /// Initialize a whattodo.toml config file with example settings
    Init,

    /// Show version information
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => init::run(&cli.path),

        Some(Commands::Version) => {
            println!("whattodo {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        Some(Commands::Scan {
            extensions,
            output,
            format,
            pattern,
        }) => {
            let config = load_project_config(&cli.path, cli.config.as_deref())?;
            scan::run(
                &cli.path,
                &config,
                &extensions,
                pattern.as_deref(),
                format.as_deref(),
                output.as_deref(),
            )
        }

        Some(Commands::History {
            format,
            output,
            backend,
            pattern,
            newest_first,
            max_revisions,
        }) => {
            let config_root = crate::git::find_repo_root(&cli.path).unwrap_or_else(|| cli.path.clone());
            let config = load_project_config(&config_root, cli.config.as_deref())?;
            let workers = resolve_workers(cli.workers, &config);
            history::run(
                &cli.path,
                &config,
                history::HistoryArgs {
                    format: format.as_deref(),
                    output: output.as_deref(),
                    backend: backend.as_deref(),
                    pattern: pattern.as_deref(),
                    newest_first,
                    max_revisions,
                    workers,
                },
            )
        }

        None => {
            // Check if the path looks like an unknown subcommand
            check_unknown_subcommand(&cli.path)?;
            let config = load_project_config(&cli.path, cli.config.as_deref())?;
            scan::run(&cli.path, &config, &[], None, None, None)
        }
    }
}

/// CLI flag, then config, then the built-in default
fn resolve_workers(flag: Option<usize>, config: &ProjectConfig) -> usize {
    flag.or(config.defaults.workers)
        .unwrap_or(DEFAULT_WORKERS)
        .clamp(1, MAX_WORKERS)
}

/// Pick the output format: `--format`, then the output file's extension,
/// then `defaults.format` from config, then `fallback`.
fn resolve_format(
    flag: Option<&str>,
    output: Option<&Path>,
    config: &ProjectConfig,
    fallback: OutputFormat,
) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return format.parse();
    }
    if let Some(path) = output {
        return Ok(OutputFormat::from_output_path(path).unwrap_or(fallback));
    }
    match config.defaults.format.as_deref() {
        Some(format) => format
            .parse()
            .context("Invalid `defaults.format` in project config"),
        None => Ok(OutputFormat::Text),
    }
}

/// Print `rendered` to stdout, or write it to `output`
fn emit(rendered: &str, output: Option<&Path>, what: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} to {}",
                style("✓").green(),
                what,
                style(path.display()).cyan()
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn check_unknown_subcommand(path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy();
    let looks_like_command = !path.exists()
        && !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.starts_with('.');
    if !looks_like_command {
        return Ok(());
    }
    let known_commands = ["scan", "history", "init", "version"];
    if !known_commands.contains(&path_str.as_ref()) {
        anyhow::bail!(
            "Unknown command '{}'. Run 'whattodo --help' for available commands.\n\nDid you mean one of: {}?",
            path_str,
            known_commands.join(", ")
        );
    }
    Ok(())
}
