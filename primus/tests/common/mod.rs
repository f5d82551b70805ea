//! Test helpers for primus integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::Signal;
use nix::unistd::Pid;

/// Path of the base supervisor binary.
pub fn primus() -> &'static str {
    env!("CARGO_BIN_EXE_primus")
}

/// Path of the hook-wrapping supervisor binary.
pub fn primus_wrap() -> &'static str {
    env!("CARGO_BIN_EXE_primus-wrap")
}

/// Run a binary to completion and capture its output.
pub fn run(bin: &str, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .output()
        .expect("failed to run binary")
}

/// Spawn a supervisor, giving it a moment to block signals and fork its
/// workload before the test starts signalling it.
pub fn spawn(bin: &str, args: &[&str]) -> Child {
    let child = Command::new(bin)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn supervisor");
    std::thread::sleep(Duration::from_millis(300));
    child
}

/// Send `sig` to a spawned supervisor.
pub fn signal(child: &Child, sig: Signal) {
    nix::sys::signal::kill(Pid::from_raw(child.id() as i32), sig).expect("kill failed");
}

/// Wait for the supervisor and assert it finished within `limit` (i.e. the
/// workload was signalled rather than left to run out its sleep).
pub fn wait_within(mut child: Child, limit: Duration) -> ExitStatus {
    let started = Instant::now();
    let status = child.wait().expect("wait failed");
    assert!(
        started.elapsed() < limit,
        "supervisor took {:?}, limit was {:?}",
        started.elapsed(),
        limit
    );
    status
}

/// A scratch file path under the cargo tmp directory, removed on drop.
pub struct ScratchFile {
    pub path: PathBuf,
}

impl ScratchFile {
    pub fn new(name: &str) -> Self {
        let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR"));
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn arg(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
