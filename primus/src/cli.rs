//! Command-line parsing.
//!
//! The grammar is mode-based rather than flag/value based: `--before`,
//! `--program` and `--after` each switch token collection to their command,
//! and every following token belongs to that command until the next flag.
//! This lets workload lines like `--program /bin/nginx -g daemon off;` pass
//! through untouched, which rules out a declarative parser.

use nix::sys::signal::Signal;
use thiserror::Error;

use crate::signals::{self, SignalMap};
use crate::{CommandSpec, Config};

/// Argument errors. All of them are reported before anything is spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown argument {0:?}")]
    UnknownArgument(String),

    #[error("{0:?} is not a signal name or number")]
    UnknownSignal(String),

    #[error("--map expects a source and a target signal")]
    IncompleteMap,

    #[error("no workload given, --program is required")]
    MissingProgram,
}

/// Which hook flags a binary understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `--map`, `--before`, `--program`.
    Base,
    /// `--map`, `--before`, `--program`, `--after`.
    Wrap,
}

/// Result of a successful parse: a help request or a run configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(Config),
}

#[derive(Clone, Copy)]
enum Slot {
    Before = 0,
    Program = 1,
    After = 2,
}

enum State {
    Neutral,
    MapFrom,
    MapTo(Signal),
    Command(Slot),
}

/// Parse `args` (without the leading binary name) under `grammar`.
pub fn parse<I>(args: I, grammar: Grammar) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut remap = SignalMap::new();
    let mut commands: [Vec<String>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut state = State::Neutral;

    for arg in args {
        // Help wins from any state, even inside a command.
        if arg.eq_ignore_ascii_case("--help") || arg.eq_ignore_ascii_case("-h") {
            return Ok(Invocation::Help);
        }

        if let Some(slot) = command_flag(&arg, grammar) {
            if matches!(state, State::MapFrom | State::MapTo(_)) {
                return Err(CliError::IncompleteMap);
            }
            // A repeated flag starts its command over.
            commands[slot as usize].clear();
            state = State::Command(slot);
            continue;
        }

        match state {
            State::Neutral => {
                if arg.eq_ignore_ascii_case("--map") {
                    state = State::MapFrom;
                } else {
                    return Err(CliError::UnknownArgument(arg));
                }
            }
            State::MapFrom => {
                let from = signals::resolve(&arg).ok_or(CliError::UnknownSignal(arg))?;
                state = State::MapTo(from);
            }
            State::MapTo(from) => {
                let to = signals::resolve(&arg).ok_or(CliError::UnknownSignal(arg))?;
                remap.push(from, to);
                state = State::Neutral;
            }
            State::Command(slot) => {
                commands[slot as usize].push(arg);
            }
        }
    }

    if matches!(state, State::MapFrom | State::MapTo(_)) {
        return Err(CliError::IncompleteMap);
    }

    let [before, program, after] = commands;
    let workload = CommandSpec::new(program).ok_or(CliError::MissingProgram)?;
    Ok(Invocation::Run(Config {
        remap,
        pre_hook: CommandSpec::new(before),
        workload,
        post_hook: CommandSpec::new(after),
    }))
}

fn command_flag(arg: &str, grammar: Grammar) -> Option<Slot> {
    if arg.eq_ignore_ascii_case("--before") {
        Some(Slot::Before)
    } else if arg.eq_ignore_ascii_case("--program") {
        Some(Slot::Program)
    } else if grammar == Grammar::Wrap && arg.eq_ignore_ascii_case("--after") {
        Some(Slot::After)
    } else {
        None
    }
}

/// Render the usage text for `bin`.
pub fn usage(bin: &str, grammar: Grammar) -> String {
    let mut text = format!(
        "usage: {bin} [--map FROM TO]... [--before CMD [ARG ..]] --program CMD [ARG ..]"
    );
    if grammar == Grammar::Wrap {
        text.push_str(" [--after CMD [ARG ..]]");
    }
    text.push_str(
        "\n\n  --map FROM TO   deliver TO to the workload when the supervisor receives FROM;\n                  repeatable, first matching entry applies; signals are names\n                  (with or without a SIG prefix, any case) or numbers\n  --before CMD    run CMD to completion before the workload starts\n  --program CMD   the workload to supervise; its exit status becomes ours\n",
    );
    if grammar == Grammar::Wrap {
        text.push_str("  --after CMD     run CMD once the workload has exited\n");
    }
    text.push_str(&format!(
        "\nexamples:\n  {bin} --map TERM QUIT --program /bin/nginx -g daemon off;\n"
    ));
    if grammar == Grammar::Wrap {
        text.push_str(&format!(
            "  {bin} --before echo hello --program sleep 2 --after echo goodbye\n"
        ));
    }
    text
}
