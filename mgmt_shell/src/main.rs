//! # mgmt-shell
//!
//! ```bash
//! # Request document for one line
//! mgmt-shell parse '/subsystem=threads:write-core-threads(count=0,per-cpu=20)'
//!
//! # Completion information for a partial line
//! mgmt-shell --prefix /profile=full probe 'subsystem=threads:wr'
//!
//! # Convert a header block
//! mgmt-shell --config shell.toml rollout '{rollout id=nightly}'
//!
//! # One result per stdin line
//! mgmt-shell repl < lines.txt
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use mgmt_parser::config::runtime::{LoggingPreferences, LogLevel};
use mgmt_parser::{log_info, logging};
use mgmt_shell::config::parse_prefix;
use mgmt_shell::{diagnostic, LineMode, Session, ShellConfig};
use serde_json::Value;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mgmt-shell")]
#[command(version)]
#[command(about = "Parse management operation lines into request documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Address every line starts from, e.g. /profile=full
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// TOML file with a default prefix, parser settings and stored rollout plans
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log parser events to the console
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the request document for a line
    Parse {
        #[arg(allow_hyphen_values = true)]
        line: String,

        /// Print the accumulated parse state instead of the request
        #[arg(long)]
        state: bool,
    },

    /// Print completion information for a partially typed line
    Probe {
        #[arg(allow_hyphen_values = true)]
        line: String,
    },

    /// Print the document of a `{ rollout ... }` header block
    Rollout { block: String },

    /// Read lines from stdin and print one result per line
    Repl {
        #[arg(long, value_enum, default_value = "request")]
        mode: ReplMode,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReplMode {
    Request,
    State,
    Probe,
}

impl From<ReplMode> for LineMode {
    fn from(mode: ReplMode) -> Self {
        match mode {
            ReplMode::Request => LineMode::Request,
            ReplMode::State => LineMode::State,
            ReplMode::Probe => LineMode::Probe,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = init_parser_logging(cli.verbose) {
        log::warn!("Parser logging not initialized: {}", err);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_parser_logging(verbose: bool) -> Result<(), String> {
    let mut preferences = LoggingPreferences::default();
    if verbose {
        preferences.enable_console_logging = true;
        preferences.min_log_level = LogLevel::Debug;
    }
    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()?;
    log::debug!("{}", logging::get_system_diagnostics());
    Ok(())
}

fn load_session(cli: &Cli) -> Result<Session, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            ShellConfig::load(path)?
        }
        None => ShellConfig::default(),
    };
    let mut session = Session::from_config(&config)?;
    if let Some(prefix) = &cli.prefix {
        session = session.with_prefix(parse_prefix(prefix)?);
    }
    Ok(session)
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let session = load_session(cli)?;
    log_info!("Shell session ready", "command" => command_name(&cli.command));

    let (line, result) = match &cli.command {
        Commands::Parse { line, state: false } => (line, session.request(line)),
        Commands::Parse { line, state: true } => (line, session.state(line)),
        Commands::Probe { line } => (line, Ok(session.probe(line))),
        Commands::Rollout { block } => (block, session.rollout(block)),
        Commands::Repl { mode } => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            let summary = session.run_lines(stdin.lock(), &mut stdout, LineMode::from(*mode))?;
            log::info!("{} lines, {} failed", summary.processed, summary.failed);
            return Ok(if summary.failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
    };

    match result {
        Ok(value) => {
            print_value(&value, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprint!("{}", diagnostic(line, &err));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_value(value: &Value, pretty: bool) -> Result<(), serde_json::Error> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Parse { .. } => "parse",
        Commands::Probe { .. } => "probe",
        Commands::Rollout { .. } => "rollout",
        Commands::Repl { .. } => "repl",
    }
}
