//! indexlink CLI - run the editor engine against files on disk.
//!
//! ```text
//! main() -> load config -> init_tracing() -> Session<RcClient> + FileHost
//!                                                   |
//!                                                   v
//!                        diagnose | diagnose-all | fixits | complete | project
//! ```
//!
//! Everything the engine would render into an editor is printed to stdout.

mod headless;

use std::{
    env,
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
};

use anyhow::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use indexlink_config::IndexlinkConfig;
use indexlink_core::{EngineSettings, Session, no_project_message};
use indexlink_indexer::RcClient;

use crate::headless::FileHost;

const USAGE: &str = "\
usage: indexlink <command> [args]

commands:
  diagnose <file>                      show diagnostics for one file
  diagnose-all                         show diagnostics for every indexed file
  fixits <file> [--write]              apply fixits (and save with --write)
  complete <file> <line> <col> [prefix]
  project <file>                       show the project owning <file>";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Diagnose { file: PathBuf },
    DiagnoseAll,
    Fixits { file: PathBuf, write: bool },
    Complete {
        file: PathBuf,
        line: u32,
        col: u32,
        prefix: String,
    },
    Project { file: PathBuf },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!("missing command");
        };
        let file = |index: usize| -> Result<PathBuf> {
            rest.get(index)
                .map(PathBuf::from)
                .with_context(|| format!("{name}: missing <file>"))
        };
        let number = |index: usize, what: &str| -> Result<u32> {
            let raw = rest
                .get(index)
                .with_context(|| format!("{name}: missing <{what}>"))?;
            raw.parse()
                .with_context(|| format!("{name}: invalid <{what}> {raw:?}"))
        };

        match name.as_str() {
            "diagnose" => Ok(Self::Diagnose { file: file(0)? }),
            "diagnose-all" => Ok(Self::DiagnoseAll),
            "fixits" => Ok(Self::Fixits {
                file: file(0)?,
                write: rest.iter().skip(1).any(|arg| arg == "--write"),
            }),
            "complete" => Ok(Self::Complete {
                file: file(0)?,
                line: number(1, "line")?,
                col: number(2, "col")?,
                prefix: rest.get(3).cloned().unwrap_or_default(),
            }),
            "project" => Ok(Self::Project { file: file(0)? }),
            other => bail!("unknown command {other:?}"),
        }
    }
}

fn init_tracing(config: &IndexlinkConfig) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let (log_file, init_warnings) = open_log_file(config);

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return Some(log_path);
    }

    // Output on stdout is the product; never mix log lines into it.
    tracing_subscriber::registry().with(env_filter).init();
    None
}

fn open_log_file(config: &IndexlinkConfig) -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates(config) {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!("Failed to create log dir {}: {e}", parent.display()));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!("Failed to open log file {}: {e}", candidate.display()));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates(config: &IndexlinkConfig) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: configured path, or ~/.indexlink/logs/indexlink.log
    if let Some(path) = config.log.file_path() {
        candidates.push(path);
    }

    // Fallback: ./.indexlink/logs/indexlink.log
    candidates.push(PathBuf::from(".indexlink").join("logs").join("indexlink.log"));

    candidates
}

fn absolute(file: &Path) -> Result<PathBuf> {
    fs::canonicalize(file).with_context(|| format!("cannot resolve {}", file.display()))
}

fn run(command: Command, session: &mut Session<RcClient>) -> Result<()> {
    match command {
        Command::Diagnose { file } => {
            let mut host = FileHost::open(&absolute(&file)?)?;
            let buffer = host.current_buffer_id();
            session.show_diagnostics_list(&mut host, buffer);
            host.print_signs(buffer);
        }
        Command::DiagnoseAll => {
            let mut host = FileHost::empty();
            session.show_all_diagnostics(&mut host);
        }
        Command::Fixits { file, write } => {
            let mut host = FileHost::open(&absolute(&file)?)?;
            let buffer = host.current_buffer_id();
            // Diagnostics must be current before fixits are considered safe.
            session.on_poll(&mut host, buffer);
            session.apply_fixits(&mut host, buffer);
            if write && host.is_buffer_modified(buffer) {
                let path = host.save(buffer)?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Complete {
            file,
            line,
            col,
            prefix,
        } => {
            let host = FileHost::open(&absolute(&file)?)?;
            let buffer = host.current_buffer_id();
            let Some(items) = session.complete(&host, buffer, line, col, &prefix) else {
                bail!("completion failed for {}", file.display());
            };
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Command::Project { file } => {
            let host = FileHost::open(&absolute(&file)?)?;
            let buffer = host.current_buffer_id();
            let state = session.buffer(&host, buffer);
            match state.project() {
                Some(project) => {
                    println!("{}", project.root());
                    println!("index store: {}", project.store_path().display());
                }
                None => println!("{}", no_project_message(state.name())),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let (config, config_error) = match IndexlinkConfig::load() {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (IndexlinkConfig::default(), Some(e)),
    };
    let log_path = init_tracing(&config);
    if let Some(e) = config_error {
        tracing::warn!("Ignoring config: {e}");
        eprintln!("Warning: {e}");
    }

    let indexer = RcClient::resolve(&config.indexer.command_path());
    let mut settings = EngineSettings::from(&config);
    settings.log_path = log_path;
    let mut session = Session::new(indexer, settings);

    match run(command, &mut session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
