//! The signal supervision loop.
//!
//! All signals are blocked before the workload is forked; the loop then
//! consumes one pending signal per iteration with sigwait and either reaps
//! children, forwards a (possibly remapped) signal to the workload, or drives
//! graceful shutdown. The loop ends on the iteration that reaps the workload
//! itself; its exit status, normalized to the raw code or `128 + signal`,
//! becomes the supervisor's own result.

use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;

use crate::error::{Error, Result};
use crate::signals::{self, SignalMap};
use crate::{Config, spawn};

/// Supervise `config.workload` until it exits and return its aggregated exit
/// code. The start and exit hooks are the binaries' concern, not this loop's.
pub fn supervise(config: &Config) -> Result<i32> {
    let mask = signals::block_all()?;
    let pid = spawn::workload(&config.workload, &mask)?;
    info!("supervising {} (pid {})", config.workload.program(), pid);

    let mut supervisor = Supervisor {
        workload: pid,
        name: config.workload.program(),
        remap: &config.remap,
        alive: true,
        exit_code: 0,
        shutdown_logged: false,
    };

    while supervisor.alive {
        match mask.wait() {
            Ok(sig) => supervisor.dispatch(sig)?,
            // sigwait can hand back a realtime signal the Signal type has no
            // name for; there is no table entry for it either, drop it.
            Err(Errno::EINVAL) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(Error::SigWait(e)),
        }
    }

    if supervisor.exit_code == 0 {
        info!("{} exited cleanly", supervisor.name);
    } else {
        warn!(
            "{} exited with status {}",
            supervisor.name, supervisor.exit_code
        );
    }
    Ok(supervisor.exit_code)
}

/// State owned by the supervision loop. Mutated only from the loop itself;
/// at most one workload is ever tracked.
struct Supervisor<'a> {
    workload: Pid,
    name: &'a str,
    remap: &'a SignalMap,
    alive: bool,
    exit_code: i32,
    shutdown_logged: bool,
}

impl Supervisor<'_> {
    fn dispatch(&mut self, sig: Signal) -> Result<()> {
        debug!("received {}", sig);
        match sig {
            Signal::SIGCHLD => self.reap()?,
            Signal::SIGTERM | Signal::SIGINT => {
                if !self.shutdown_logged {
                    info!("starting graceful shutdown");
                    self.shutdown_logged = true;
                }
                // Both shutdown signals go through the TERM mapping.
                self.forward(self.remap.lookup(Signal::SIGTERM));
            }
            Signal::SIGKILL => {
                // sigwait never returns SIGKILL on a conforming kernel; if a
                // platform delivers it anyway, pass it on untouched.
                self.forward(Signal::SIGKILL);
            }
            other => self.forward(self.remap.lookup(other)),
        }
        Ok(())
    }

    /// Send `sig` to the workload if it is still alive.
    fn forward(&self, sig: Signal) {
        if !self.alive {
            return;
        }
        info!("forwarding {} to {} (pid {})", sig, self.name, self.workload);
        if let Err(e) = kill(self.workload, sig) {
            warn!("could not signal pid {}: {}", self.workload, e);
        }
    }

    /// Drain every currently reapable descendant. Ends the supervision loop
    /// iff one of them is the workload.
    fn reap(&mut self) -> Result<()> {
        loop {
            let status = match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => break,
                Err(Errno::ECHILD) => break,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(Error::Wait(e)),
                Ok(status) => status,
            };
            match (status.pid(), termination_code(&status)) {
                (Some(pid), Some(code)) => self.reaped(pid, code),
                // Without WUNTRACED or WCONTINUED nothing else can be
                // reported for our children.
                _ => return Err(Error::UnexpectedWaitStatus(format!("{status:?}"))),
            }
        }
        Ok(())
    }

    fn reaped(&mut self, pid: Pid, code: i32) {
        if pid == self.workload {
            info!("{} (pid {}) exited with status {}", self.name, pid, code);
            self.alive = false;
            self.exit_code = code;
        } else {
            debug!("reaped pid {} (status {})", pid, code);
        }
    }
}

/// Exit code for a reaped status: the raw code for a normal exit,
/// `128 + signal` for a signal death, nothing for anything else.
fn termination_code(status: &WaitStatus) -> Option<i32> {
    match status {
        WaitStatus::Exited(_, code) => Some(*code),
        WaitStatus::Signaled(_, sig, _) => Some(128 + *sig as i32),
        _ => None,
    }
}
