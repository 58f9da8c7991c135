//! Command-line utility for controlling a running pdnsd
//!
//! This tool talks to the daemon's status control socket to:
//! - Print the daemon's status report
//! - Mark upstream servers up or down, or retest them
//! - Delete or invalidate cached names
//! - Add records, hosts-style sources and negative cache entries

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use pdnsd_control::{
    ControlClient, ControlConfig, ControlError, DEFAULT_CACHE_DIR, Grammar, Outcome, Reply,
    logging, session,
};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Command-line utility for controlling pdnsd
#[derive(Parser, Debug)]
#[command(name = "pdnsd-ctl")]
#[command(about = "Control a running pdnsd", long_about = None)]
#[command(version, disable_help_subcommand = true)]
struct Cli {
    /// The daemon's cache directory, which holds the control socket
    #[arg(short = 'c', long, env = "PDNSD_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Do not print "Succeeded" after a successful command
    #[arg(short, long)]
    quiet: bool,

    /// Give up if the daemon has not answered within this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log protocol traffic to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Command and its arguments (run `pdnsd-ctl help` for the list)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = ControlConfig::default()
        .with_cache_dir(&cli.cache_dir)
        .with_timeout(cli.timeout.map(Duration::from_secs))
        .with_quiet(cli.quiet);

    match run(&config, &cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, &config);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(config: &ControlConfig, tokens: &[String]) -> Result<(), ControlError> {
    let grammar = Grammar::new(config.capabilities);
    let client = ControlClient::new(config.socket_path()).with_timeout(config.timeout);
    let mut stdout = tokio::io::stdout();

    let outcome = session::run(&grammar, &client, tokens, &mut stdout).await?;
    debug!("Invocation finished: {outcome:?}");

    if outcome == Outcome::Remote(Reply::Succeeded) && !config.quiet {
        stdout.write_all(b"Succeeded\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

/// The single place failures are reported
fn report(error: &ControlError, config: &ControlConfig) {
    match error {
        ControlError::MissingCommand => {
            eprint!("{}", session::help_text());
        }
        ControlError::InvalidSocketPath(_) => {
            eprintln!(
                "Cannot connect to pdnsd control socket at {}.\n\
                 Error: {error}\n\
                 \n\
                 Is pdnsd running with status_ctl enabled?\n\
                 You can select the cache directory with -c or PDNSD_CACHE_DIR",
                config.socket_path().display()
            );
        }
        ControlError::Daemon { .. } => eprintln!("{error}"),
        e if e.is_usage() => {
            eprintln!("{e}");
            eprintln!("Run 'pdnsd-ctl help' for usage");
        }
        e => eprintln!("Error: {e}"),
    }
}
