//! Workload spawning.

use log::debug;
use nix::sys::signal::{SigSet, SigmaskHow, sigprocmask};
use nix::unistd::{ForkResult, Pid, execvp, fork, setsid};

use crate::error::{Error, Result};
use crate::{CommandSpec, exit_code};

/// Fork the workload into its own session and exec it.
///
/// The child restores the inherited signal mask to unblocked before exec, so
/// the program starts with a normal signal disposition, and calls `setsid()`
/// so a terminal's foreground process group cannot reach it. Only
/// async-signal-safe calls happen between fork and exec; failures surface as
/// the fixed exit codes 126 (setsid) and 127 (exec), which the supervisor
/// observes like any other workload death.
pub fn workload(spec: &CommandSpec, mask: &SigSet) -> Result<Pid> {
    let (file, argv) = spec.to_exec()?;
    match unsafe { fork() }.map_err(Error::Fork)? {
        ForkResult::Child => {
            let _ = sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(mask), None);
            if setsid().is_err() {
                unsafe { libc::_exit(exit_code::CHILD_SETSID) }
            }
            let _ = execvp(&file, &argv);
            unsafe { libc::_exit(exit_code::CHILD_EXEC) }
        }
        ForkResult::Parent { child } => {
            debug!("spawned {} as pid {}", spec.program(), child);
            Ok(child)
        }
    }
}
