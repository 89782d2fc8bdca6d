use std::path::{Path, PathBuf};

use churn_core::{ChurnConfig, ChurnOutput, OutputFormat};
use churn_pulse::report::{ChurnOptions, ChurnReport};
use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

#[derive(Parser)]
#[command(
    name = "churn",
    version,
    about = "Rank files by how often they change",
    long_about = "Rank the files of a git or subversion working copy by how many commits touched them.\n\n\
                   Examples:\n  \
                     churn analyze                          Whole history, files changed 5+ times\n  \
                     churn analyze --since 90               Only the last 90 days\n  \
                     churn analyze --start-date 2024-01-01  Only commits after a date\n  \
                     churn --format yaml analyze            Emit {churn: {changes}} as YAML\n  \
                     churn init                             Write a default .churn.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .churn.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for results.\n\n\
                       Formats:\n  \
                         text      Ranked table (default)\n  \
                         json      {\"churn\": {\"changes\": [...]}}\n  \
                         yaml      The same structure as YAML\n  \
                         markdown  GitHub-flavored Markdown table"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Count how often each file changed
    #[command(long_about = "Count how often each file changed.\n\n\
        Runs `git log --name-only` or `svn log --verbose` in the working copy, counts one\n\
        change per file per commit, drops files below the minimum count, and ranks the\n\
        rest by change count (ties ordered by path).\n\n\
        Examples:\n  churn analyze --path ../project\n  churn analyze --minimum-churn-count 10 --limit 20")]
    Analyze {
        /// Working copy root (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Minimum number of changes for a file to be listed (default: 5)
        #[arg(long)]
        minimum_churn_count: Option<u64>,

        /// Only count commits on or after this date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "since")]
        start_date: Option<String>,

        /// Only count commits from the last N days
        #[arg(long)]
        since: Option<u64>,

        /// Kill the VCS command after this many seconds, 0 to wait forever (default: 300)
        #[arg(long)]
        timeout: Option<u64>,

        /// Maximum results to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a default .churn.toml configuration file
    Init,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Churn Configuration

[churn]
# Files changed fewer times than this are left out.
# minimum_churn_count = 5

# Only scan commits on or after this date (quoted, YYYY-MM-DD).
# start_date = "2024-01-01"

# Or only scan the last N days. Ignored when start_date is set.
# since_days = 180

# Kill git/svn after this many seconds; 0 disables.
# timeout_secs = 300
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    // The working copy's own .churn.toml applies when analyzing another directory.
    let config_root = match &cli.command {
        Some(Command::Analyze { path, .. }) => path.as_path(),
        _ => Path::new("."),
    };
    let mut config = load_config(cli.config.as_deref(), config_root)?;

    match cli.command {
        None => {
            Cli::command().print_help().into_diagnostic()?;
        }
        Some(Command::Analyze {
            path,
            minimum_churn_count,
            start_date,
            since,
            timeout,
            limit,
        }) => {
            // CLI flags override the config file.
            let section = &mut config.churn;
            if let Some(count) = minimum_churn_count {
                section.minimum_churn_count = count;
            }
            if start_date.is_some() {
                section.start_date = start_date;
            }
            if since.is_some() {
                section.start_date = None;
                section.since_days = since;
            }
            if let Some(secs) = timeout {
                section.timeout_secs = secs;
            }

            let today = chrono_today();
            let options = ChurnOptions::from_section(section, today)?;
            log::debug!("options: {options:?}");

            let report = ChurnReport::new(&path, options)?;
            let mut output = report.run()?;
            if let Some(limit) = limit {
                output.churn.changes.truncate(limit);
            }

            print!("{}", render(&output, cli.format)?);
        }
        Some(Command::Init) => {
            let path = Path::new(".churn.toml");
            if path.exists() {
                miette::bail!(".churn.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .churn.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "churn", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>, root: &Path) -> Result<ChurnConfig> {
    if let Some(path) = explicit {
        return Ok(ChurnConfig::from_file(path)?);
    }
    let default_path = root.join(".churn.toml");
    if default_path.exists() {
        log::debug!("loading {}", default_path.display());
        Ok(ChurnConfig::from_file(&default_path)?)
    } else {
        Ok(ChurnConfig::default())
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(verbose)
        .init();
}

fn chrono_today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn render(output: &ChurnOutput, format: OutputFormat) -> Result<String> {
    let changes = output.changes();
    let rendered = match format {
        OutputFormat::Json => format!("{}\n", output.to_json()?),
        OutputFormat::Yaml => output.to_yaml()?,
        OutputFormat::Markdown => {
            let mut out = String::from("# Churn\n\n");
            if changes.is_empty() {
                out.push_str("No files met the minimum churn count.\n");
            } else {
                out.push_str("| Rank | File | Times changed |\n");
                out.push_str("|------|------|---------------|\n");
                for (i, record) in changes.iter().enumerate() {
                    out.push_str(&format!(
                        "| {} | `{}` | {} |\n",
                        i + 1,
                        record.file_path,
                        record.times_changed
                    ));
                }
            }
            out
        }
        OutputFormat::Text => {
            if changes.is_empty() {
                String::from("No files met the minimum churn count.\n")
            } else {
                let mut out = format!("{:>13}  {}\n", "Times changed", "File");
                for record in changes {
                    out.push_str(&format!("{:>13}  {}\n", record.times_changed, record.file_path));
                }
                out
            }
        }
    };
    Ok(rendered)
}
