//! primus - PID 1 supervisor: optional start hook, then the workload.

use std::process;

use log::{error, info};
use primus::cli::{self, Grammar, Invocation};
use primus::{Config, exit_code, hooks, supervisor};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BIN: &str = "primus";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = parse_or_exit();
    info!("{BIN} v{VERSION} starting");

    run_start_hook(&config);

    match supervisor::supervise(&config) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            process::exit(exit_code::FATAL);
        }
    }
}

fn parse_or_exit() -> Config {
    match cli::parse(std::env::args().skip(1), Grammar::Base) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            eprintln!("{}", cli::usage(BIN, Grammar::Base));
            process::exit(0);
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{}", cli::usage(BIN, Grammar::Base));
            process::exit(exit_code::FATAL);
        }
    }
}

/// Run the start hook, if any. A nonzero hook keeps the workload from ever
/// being spawned.
fn run_start_hook(config: &Config) {
    let Some(hook) = &config.pre_hook else {
        return;
    };
    match hooks::run(hook) {
        Ok(0) => {}
        Ok(status) => {
            error!("start hook {} failed with status {}", hook.program(), status);
            process::exit(exit_code::START_HOOK);
        }
        Err(e) => {
            error!("{e}");
            process::exit(exit_code::FATAL);
        }
    }
}
