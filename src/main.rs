mod args;
mod commands;
mod params;
mod shared;

use std::env;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::error;

use args::Cli;
use commands::run_convert;
use params::ParameterSet;

// Top-level entrypoint: resolve parameters, run the converter once, and exit
// with the mapped code.
fn main() {
    process::exit(run());
}

// Exit-code policy: 0 when the converter succeeded, the converter's own code
// when it failed, 1 for anything that is this wrapper's fault (bad
// configuration, spawn failure). Configuration errors exit before any
// converter process is started.
fn run() -> i32 {
    if let Err(err) = shared::logging::init_logging() {
        eprintln!("failed to initialize logging: {err}");
        return 1;
    }

    let tokens = match args::canonicalize_args(env::args_os()) {
        Ok(tokens) => tokens,
        Err(err) => {
            error!("{err}");
            return 1;
        }
    };

    let cli = match Cli::try_parse_from(tokens) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return 0;
        }
        Err(err) => {
            error!("{err}");
            return 1;
        }
    };

    let params = match ParameterSet::from_cli(&cli) {
        Ok(params) => params,
        Err(err) => {
            error!("{err}");
            return 1;
        }
    };

    match run_convert(&cli.converter_path, &params) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            1
        }
    }
}
