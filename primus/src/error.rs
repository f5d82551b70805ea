//! Error types for primus.

use nix::errno::Errno;
use thiserror::Error;

/// Fatal supervisor errors. Every variant ends the process; none are retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("fork failed: {0}")]
    Fork(Errno),

    #[error("failed to block signals: {0}")]
    SignalMask(Errno),

    #[error("sigwait failed: {0}")]
    SigWait(Errno),

    #[error("waitpid failed: {0}")]
    Wait(Errno),

    /// A wait status outside the exited/signaled pair. waitpid without
    /// WUNTRACED or WCONTINUED cannot report these for our children.
    #[error("unexpected wait status: {0}")]
    UnexpectedWaitStatus(String),

    #[error("argument contains an interior NUL byte: {0:?}")]
    BadArgv(String),
}

pub type Result<T> = std::result::Result<T, Error>;
