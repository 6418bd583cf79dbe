use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use citecheck_core::config_file;
use citecheck_core::{CitationDatabase, DatabaseConfig, Report};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

use output::ColorMode;

/// Citation Hallucination Checker - Flag author-year citations missing from the project bibliography
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log database loading and matching decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check text for unverified or known-fabricated citations
    Check {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        databases: DatabaseArgs,

        /// Output JSON only
        #[arg(long)]
        json: bool,

        /// Print nothing; report through the exit code only
        #[arg(short, long)]
        quiet: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Load the citation documents and summarize what they contain
    Database {
        #[command(flatten)]
        databases: DatabaseArgs,

        /// List every loaded citation key
        #[arg(long)]
        list: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Text to check
    #[arg(long)]
    text: Option<String>,

    /// File to check (repeatable; one report per file)
    #[arg(long, value_name = "PATH")]
    file: Vec<PathBuf>,

    /// Read the text to check from standard input
    #[arg(long)]
    stdin: bool,
}

#[derive(Args, Debug)]
struct DatabaseArgs {
    /// Repository root holding the research/ citation documents
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Verified bibliography document (repeatable, replaces the defaults)
    #[arg(long, value_name = "PATH")]
    bibliography: Vec<PathBuf>,

    /// Known-hallucinations document (repeatable, replaces the defaults)
    #[arg(long, value_name = "PATH")]
    hallucinations: Vec<PathBuf>,

    /// Compare surnames case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Verdict for citations listed in both documents
    #[arg(long, value_enum)]
    precedence: Option<PrecedenceArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PrecedenceArg {
    /// The verified listing decides
    Verified,
    /// The suspicious listing decides
    Suspicious,
}

impl From<PrecedenceArg> for citecheck_core::Precedence {
    fn from(arg: PrecedenceArg) -> Self {
        match arg {
            PrecedenceArg::Verified => Self::VerifiedWins,
            PrecedenceArg::Suspicious => Self::SuspiciousWins,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "citecheck_cli=debug,citecheck_core=debug"
    } else {
        "citecheck_cli=warn,citecheck_core=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Returns whether every checked input came back all-clear.
fn run(command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Check {
            input,
            databases,
            json,
            quiet,
            no_color,
        } => {
            let config = resolve_database_config(&databases)?;
            let database = citecheck_core::load_database(&config);
            let reports = check_inputs(input, &database)?;
            let all_clear = reports.iter().all(|(_, r)| r.all_clear);

            if quiet {
                return Ok(all_clear);
            }

            let mut stdout = std::io::stdout().lock();
            if json {
                output::write_json(&mut stdout, &reports)?;
            } else {
                let color = ColorMode(!no_color);
                let show_source = reports.len() > 1;
                for (source, report) in &reports {
                    let source = show_source.then_some(source.as_str());
                    output::print_report(&mut stdout, source, report, color)?;
                }
            }
            stdout.flush()?;
            Ok(all_clear)
        }
        Command::Database {
            databases,
            list,
            no_color,
        } => {
            let config = resolve_database_config(&databases)?;
            let database = citecheck_core::load_database(&config);
            let mut stdout = std::io::stdout().lock();
            output::print_database_summary(
                &mut stdout,
                &config,
                &database,
                list,
                ColorMode(!no_color),
            )?;
            Ok(true)
        }
    }
}

fn check_inputs(
    input: InputArgs,
    database: &CitationDatabase,
) -> anyhow::Result<Vec<(String, Report)>> {
    if let Some(text) = input.text {
        return Ok(vec![(
            "<text>".to_string(),
            citecheck_core::classify(&text, database),
        )]);
    }

    if input.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input as UTF-8 text")?;
        return Ok(vec![(
            "<stdin>".to_string(),
            citecheck_core::classify(&text, database),
        )]);
    }

    input
        .file
        .iter()
        .map(|path| -> anyhow::Result<(String, Report)> {
            let report = citecheck_core::check_file(path, database)?;
            Ok((path.display().to_string(), report))
        })
        .collect()
}

/// Resolve database configuration: CLI flags > env vars > config file > defaults
fn resolve_database_config(args: &DatabaseArgs) -> anyhow::Result<DatabaseConfig> {
    let file_config = config_file::load_config();
    let mut config = file_config.apply(&args.root, DatabaseConfig::for_root(&args.root));

    if let Some(paths) = std::env::var_os("CITECHECK_BIBLIOGRAPHY") {
        config.verified = std::env::split_paths(&paths).collect();
    }
    if let Some(paths) = std::env::var_os("CITECHECK_HALLUCINATIONS") {
        config.suspicious = std::env::split_paths(&paths).collect();
    }

    if !args.bibliography.is_empty() {
        config.verified = args.bibliography.clone();
    }
    if !args.hallucinations.is_empty() {
        config.suspicious = args.hallucinations.clone();
    }
    if args.case_sensitive {
        config.policy.case_sensitive = true;
    }
    if let Some(precedence) = args.precedence {
        config.policy.precedence = precedence.into();
    }

    tracing::debug!(?config, "resolved database configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["citecheck", "check"]).is_err());
        assert!(
            Cli::try_parse_from(["citecheck", "check", "--text", "x", "--stdin"]).is_err()
        );
        assert!(
            Cli::try_parse_from(["citecheck", "check", "--file", "a.md", "--file", "b.md"])
                .is_ok()
        );
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "citecheck",
            "check",
            "--text",
            "Smith (2020)",
            "--root",
            "/repo",
            "--bibliography",
            "/refs.md",
            "--case-sensitive",
            "--precedence",
            "suspicious",
        ])
        .unwrap();
        let Command::Check { databases, .. } = cli.command else {
            panic!("expected check command");
        };
        let config = resolve_database_config(&databases).unwrap();
        assert_eq!(config.verified, vec![PathBuf::from("/refs.md")]);
        assert!(config.policy.case_sensitive);
        assert_eq!(
            config.policy.precedence,
            citecheck_core::Precedence::SuspiciousWins
        );
    }

    #[test]
    fn bad_precedence_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["citecheck", "database", "--precedence", "strict"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        assert!(err.to_string().contains("verified"));
        assert!(err.to_string().contains("suspicious"));
    }

    #[test]
    fn precedence_values_map_to_policy() {
        for (value, expected) in [
            ("verified", citecheck_core::Precedence::VerifiedWins),
            ("suspicious", citecheck_core::Precedence::SuspiciousWins),
        ] {
            let cli = Cli::try_parse_from(["citecheck", "database", "--precedence", value])
                .unwrap();
            let Command::Database { databases, .. } = cli.command else {
                panic!("expected database command");
            };
            assert_eq!(databases.precedence.map(Into::into), Some(expected));
        }
    }

    #[test]
    fn text_input_produces_one_report() {
        let input = InputArgs {
            text: Some("Richardson et al. (2023) found boundaries.".to_string()),
            file: vec![],
            stdin: false,
        };
        let reports = check_inputs(input, &CitationDatabase::default()).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "<text>");
        assert_eq!(reports[0].1.unverified, 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let input = InputArgs {
            text: None,
            file: vec![PathBuf::from("/nonexistent/citecheck/draft.md")],
            stdin: false,
        };
        let err = check_inputs(input, &CitationDatabase::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("draft.md"));
    }
}
