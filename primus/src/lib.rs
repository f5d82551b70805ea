//! primus - minimal PID 1 supervisor for container workloads.
//!
//! Runs a single workload as a tracked child in its own session, forwards
//! (optionally remapped) signals to it, reaps every descendant reparented to
//! it, and exits with the workload's own status.
//!
//! ## Binaries
//!
//! - **primus**: optional start hook, then the workload.
//! - **primus-wrap**: additionally runs an exit hook after the workload ends.

pub mod cli;
pub mod error;
pub mod hooks;
pub mod signals;
pub mod spawn;
pub mod supervisor;

use std::ffi::CString;

use crate::error::{Error, Result};
use crate::signals::SignalMap;

/// Exit codes of the supervisor process itself.
pub mod exit_code {
    /// Argument errors and internal fatal errors.
    pub const FATAL: i32 = 1;
    /// The start hook exited nonzero; the workload was never spawned.
    pub const START_HOOK: i32 = 2;
    /// The exit hook exited nonzero (returned instead of the workload's code).
    pub const EXIT_HOOK: i32 = 3;
    /// A spawned child could not move into its own session.
    pub const CHILD_SETSID: i32 = 126;
    /// A spawned child could not exec its program image.
    pub const CHILD_EXEC: i32 = 127;
}

/// A parsed command: executable plus arguments, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    /// Build a spec from an argv. An empty argv means "no command".
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(Self { argv })
        }
    }

    /// The executable (first argv element).
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The C-string form `execvp` wants. Converted before forking so the
    /// child does not allocate between fork and exec.
    pub(crate) fn to_exec(&self) -> Result<(CString, Vec<CString>)> {
        let argv = self
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_str()).map_err(|_| Error::BadArgv(arg.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok((argv[0].clone(), argv))
    }
}

/// Immutable run configuration produced by [`cli::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Remap table applied when forwarding signals to the workload.
    pub remap: SignalMap,
    /// Command run to completion before the workload is spawned.
    pub pre_hook: Option<CommandSpec>,
    /// The supervised workload.
    pub workload: CommandSpec,
    /// Command run after the workload has exited (primus-wrap only).
    pub post_hook: Option<CommandSpec>,
}
