//! Signal name resolution, the remap table, and the supervisor's signal mask.

use nix::sys::signal::{SigSet, SigmaskHow, Signal, sigprocmask};

use crate::error::{Error, Result};

/// Resolve a signal token: a positive decimal number naming a known signal,
/// or a case-insensitive name with an optional `SIG` prefix (`term`, `TERM`
/// and `SIGTERM` all resolve to `SIGTERM`).
pub fn resolve(token: &str) -> Option<Signal> {
    if let Ok(num) = token.parse::<i32>() {
        if num <= 0 {
            return None;
        }
        return Signal::try_from(num).ok();
    }
    let upper = token.to_ascii_uppercase();
    let name = upper.strip_prefix("SIG").unwrap_or(&upper);
    Signal::iterator().find(|sig| sig.as_str().strip_prefix("SIG") == Some(name))
}

/// Ordered signal remap table.
///
/// Lookup is first-match-wins over insertion order; unmapped signals resolve
/// to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalMap {
    entries: Vec<(Signal, Signal)>,
}

impl SignalMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. Duplicate `from` entries are kept; only the earliest
    /// one is ever applied.
    pub fn push(&mut self, from: Signal, to: Signal) {
        self.entries.push((from, to));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The signal to deliver when `sig` arrives.
    pub fn lookup(&self, sig: Signal) -> Signal {
        self.entries
            .iter()
            .find(|(from, _)| *from == sig)
            .map(|(_, to)| *to)
            .unwrap_or(sig)
    }
}

/// Block every signal on the calling thread and return the blocked set.
///
/// Must run before the workload is forked: the child inherits the mask and
/// unblocks it again, so no signal can slip through with default disposition
/// in between.
pub fn block_all() -> Result<SigSet> {
    let mask = SigSet::all();
    sigprocmask(SigmaskHow::SIG_BLOCK, Some(&mask), None).map_err(Error::SignalMask)?;
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_names() {
        assert_eq!(resolve("TERM"), Some(Signal::SIGTERM));
        assert_eq!(resolve("term"), Some(Signal::SIGTERM));
        assert_eq!(resolve("SigQuit"), Some(Signal::SIGQUIT));
        assert_eq!(resolve("SIGUSR1"), Some(Signal::SIGUSR1));
        assert_eq!(resolve("hup"), Some(Signal::SIGHUP));
    }

    #[test]
    fn resolve_numbers() {
        assert_eq!(resolve("15"), Some(Signal::SIGTERM));
        assert_eq!(resolve("9"), Some(Signal::SIGKILL));
        assert_eq!(resolve("2"), Some(Signal::SIGINT));
    }

    #[test]
    fn resolve_rejects_unknown_tokens() {
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("SIG"), None);
        assert_eq!(resolve("NOSUCHSIG"), None);
        assert_eq!(resolve("0"), None);
        assert_eq!(resolve("-3"), None);
        assert_eq!(resolve("4096"), None);
    }

    #[test]
    fn empty_map_is_identity() {
        let map = SignalMap::new();
        assert!(map.is_empty());
        assert_eq!(map.lookup(Signal::SIGTERM), Signal::SIGTERM);
        assert_eq!(map.lookup(Signal::SIGUSR2), Signal::SIGUSR2);
    }

    #[test]
    fn first_match_wins_over_duplicates() {
        let mut map = SignalMap::new();
        map.push(Signal::SIGTERM, Signal::SIGQUIT);
        map.push(Signal::SIGTERM, Signal::SIGUSR1);
        assert_eq!(map.lookup(Signal::SIGTERM), Signal::SIGQUIT);
    }

    #[test]
    fn later_distinct_entries_still_apply() {
        let mut map = SignalMap::new();
        map.push(Signal::SIGTERM, Signal::SIGQUIT);
        map.push(Signal::SIGHUP, Signal::SIGUSR1);
        assert_eq!(map.lookup(Signal::SIGHUP), Signal::SIGUSR1);
        assert_eq!(map.lookup(Signal::SIGINT), Signal::SIGINT);
    }
}
