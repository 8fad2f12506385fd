//! `confapp`: manage the application's configuration from the command line.
//!
//! ```sh
//! confapp config list
//! confapp config list log --hidden
//! confapp config describe update
//! confapp config set --log.level debug --update.period 1h
//! CONFAPP_LOG_LEVEL=warn confapp -c ./config.toml config list
//! ```

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::process;
use std::sync::Mutex;

use clap::FromArgMatches;
use clap::error::ErrorKind;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use confapp::cli::{self, Cli};
use confapp::fields::{self, LOG_FORMAT, LOG_LEVEL, LOG_OUTPUT};
use confapp::{Confapp, ConfigResult, ValueStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn open_log_file(path: &str) -> Result<File, BoxError> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber. `RUST_LOG` wins over `log.level`, and
/// `--verbose` raises the level to debug.
fn init_logging(store: &ValueStore, verbose: bool) -> Result<(), BoxError> {
    let level = if verbose {
        "debug".to_string()
    } else {
        store.read_string(LOG_LEVEL)?
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&level)?,
    };
    let json = store.read_string(LOG_FORMAT)? == "json";
    let output = store.read_string(LOG_OUTPUT)?;
    let file = if output.is_empty() {
        None
    } else {
        Some(Mutex::new(open_log_file(&output)?))
    };

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match (json, file) {
        (true, None) => subscriber.json().with_writer(std::io::stderr).try_init(),
        (false, None) => subscriber.with_writer(std::io::stderr).try_init(),
        (true, Some(file)) => subscriber.json().with_ansi(false).with_writer(file).try_init(),
        (false, Some(file)) => subscriber.with_ansi(false).with_writer(file).try_init(),
    }
}

fn main() {
    let mut cmd = cli::command(&fields::registry());
    let matches = cmd.clone().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let mut ctx = Confapp::builder()
        .registry(fields::registry())
        .cli_override(fields::CONFIG, cli.config.clone())
        .cli_override(fields::VERBOSE, cli.verbose.then_some(true))
        .load()
        .unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        });

    if let Err(e) = init_logging(ctx.store(), cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }
    if let Some(path) = ctx.store().config_path() {
        debug!(path = %path.display(), "using config file");
    }

    let Some(action) = cli::action_from_matches(ctx.registry(), &matches) else {
        cmd.error(ErrorKind::MissingSubcommand, "expected a `config` subcommand")
            .exit();
    };

    match ctx.handle(&action) {
        Ok(ConfigResult::NothingToSet) => {
            cmd.build();
            if let Some(set) = cmd
                .find_subcommand_mut("config")
                .and_then(|config| config.find_subcommand_mut("set"))
                && let Err(e) = set.print_help()
            {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        Ok(ConfigResult::Description(text)) => print!("{text}"),
        Ok(result) => println!("{result}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
