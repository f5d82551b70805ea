//! Synchronous hook execution.
//!
//! A hook runs to completion before the workload starts (`--before`) or after
//! it has exited (`--after`). The wait collects any other descendant that
//! terminates first, so a PID 1 instance does not accumulate zombies while a
//! hook runs.

use log::debug;
use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork};

use crate::error::{Error, Result};
use crate::{CommandSpec, exit_code};

/// Run `spec` to completion and return its exit status. A signal death is
/// reported as `128 + signal`; callers gate on zero versus nonzero.
pub fn run(spec: &CommandSpec) -> Result<i32> {
    let (file, argv) = spec.to_exec()?;
    match unsafe { fork() }.map_err(Error::Fork)? {
        ForkResult::Child => {
            let _ = execvp(&file, &argv);
            // Exec failed; nothing sensible is left to do in this image.
            unsafe { libc::_exit(exit_code::CHILD_EXEC) }
        }
        ForkResult::Parent { child } => wait_for(child),
    }
}

/// Block until `target` is reaped, reaping and discarding every other
/// descendant that exits in the meantime.
fn wait_for(target: Pid) -> Result<i32> {
    loop {
        match waitpid(Pid::from_raw(-1), None) {
            Ok(WaitStatus::Exited(pid, code)) if pid == target => return Ok(code),
            Ok(WaitStatus::Signaled(pid, sig, _)) if pid == target => {
                return Ok(128 + sig as i32);
            }
            Ok(status) => {
                debug!("reaped {:?} while waiting for hook {}", status.pid(), target);
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(Error::Wait(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fork_lock;

    fn spec(line: &[&str]) -> CommandSpec {
        CommandSpec::new(line.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn reports_success() {
        let _guard = fork_lock();
        assert_eq!(run(&spec(&["true"])).unwrap(), 0);
    }

    #[test]
    fn reports_the_exit_code() {
        let _guard = fork_lock();
        assert_eq!(run(&spec(&["false"])).unwrap(), 1);
        assert_eq!(run(&spec(&["sh", "-c", "exit 7"])).unwrap(), 7);
    }

    #[test]
    fn reports_exec_failure_as_the_fixed_code() {
        let _guard = fork_lock();
        assert_eq!(
            run(&spec(&["/definitely/not/installed"])).unwrap(),
            exit_code::CHILD_EXEC
        );
    }

    #[test]
    fn reports_a_signal_death_as_128_plus_signal() {
        let _guard = fork_lock();
        let status = run(&spec(&["sh", "-c", "kill -TERM $$"])).unwrap();
        assert_eq!(status, 128 + libc::SIGTERM);
    }
}
