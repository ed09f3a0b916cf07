use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use proxycheck::schema::OAuth2;
use proxycheck::AdmissionGate;
use proxycheck::LogLevel;
use proxycheck_validate::PatternCache;
use tracing_subscriber::filter::LevelFilter;

/// Validate OAuth2 filter configurations before they are handed to a proxy.
#[derive(Parser, Debug)]
#[command(name = "proxycheck", version)]
struct Cli {
    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Consumer the candidates are admitted for
    #[arg(long, default_value = "default")]
    consumer: String,

    /// Candidate files, submitted in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Submit every file to the gate. Returns whether all of them were accepted.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let patterns = PatternCache::init();
    tracing::debug!("compiled {} field patterns", patterns);

    let mut gate = AdmissionGate::<OAuth2>::new();
    let mut all_ok = true;

    for (idx, path) in cli.files.iter().enumerate() {
        let version = u64::try_from(idx + 1).context("too many candidate files")?;

        let candidate = match proxycheck::load_candidate::<OAuth2>(path)
            .with_context(|| format!("loading {}", path.display()))
        {
            Ok(candidate) => candidate,
            Err(e) => {
                println!("error: {}", path.display());
                println!("  {:#}", e);
                all_ok = false;
                continue;
            }
        };

        match gate.submit(&cli.consumer, version, candidate) {
            Ok(()) => println!("ok: {}", path.display()),
            Err(rejection) => {
                println!("rejected: {}", path.display());
                match rejection.validation_error() {
                    Some(error) => {
                        println!("  {}", error);
                        println!("  at {}", error.path());
                    }
                    None => println!("  {}", rejection),
                }
                all_ok = false;
            }
        }
    }

    tracing::info!("{}", gate.callbacks().report());
    Ok(all_ok)
}
