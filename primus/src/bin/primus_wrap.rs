//! primus-wrap - primus with hook commands on both sides of the workload.
//!
//! The exit hook always runs once the workload is gone, whatever its status
//! was; a failing exit hook replaces the final exit code with a fixed marker
//! after the workload's own outcome has been logged.

use std::process;

use log::{error, info};
use primus::cli::{self, Grammar, Invocation};
use primus::{Config, exit_code, hooks, supervisor};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BIN: &str = "primus-wrap";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = parse_or_exit();
    info!("{BIN} v{VERSION} starting");

    run_start_hook(&config);

    let code = match supervisor::supervise(&config) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            process::exit(exit_code::FATAL);
        }
    };

    run_exit_hook(&config);
    process::exit(code);
}

fn parse_or_exit() -> Config {
    match cli::parse(std::env::args().skip(1), Grammar::Wrap) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            eprintln!("{}", cli::usage(BIN, Grammar::Wrap));
            process::exit(0);
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{}", cli::usage(BIN, Grammar::Wrap));
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

/// Run the exit hook, if any. The workload's outcome is already logged by the
/// time this runs; a nonzero hook only changes the final exit code.
fn run_exit_hook(config: &Config) {
    let Some(hook) = &config.post_hook else {
        return;
    };
    match hooks::run(hook) {
        Ok(0) => {}
        Ok(status) => {
            error!("exit hook {} failed with status {}", hook.program(), status);
            process::exit(exit_code::EXIT_HOOK);
        }
        Err(e) => {
            error!("{e}");
            process::exit(exit_code::FATAL);
        }
    }
}
