//! Process-wide uid sequences, one per entity kind.
//!
//! Uids are decimal strings handed out in increasing order. A restored
//! session calls [`UidSeq::observe`] for every uid it loads, so freshly
//! generated uids never collide with restored ones.

use crate::libs::error::{GlobalignError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Entity identifier, also the key of every map in a saved session.
pub type Uid = String;

pub struct UidSeq {
    next: AtomicUsize,
}

impl UidSeq {
    pub const fn new() -> Self {
        Self {
            next: AtomicUsize::new(0),
        }
    }

    /// Hand out the next uid.
    pub fn next(&self) -> Uid {
        self.next.fetch_add(1, Ordering::SeqCst).to_string()
    }

    /// Move the sequence past `uid` if it is numeric.
    ///
    /// A uid of `usize::MAX` has no successor and leaves the sequence alone.
    pub fn observe(&self, uid: &str) {
        if let Some(next) = uid.parse::<usize>().ok().and_then(|n| n.checked_add(1)) {
            self.next.fetch_max(next, Ordering::SeqCst);
        }
    }

    /// [`UidSeq::observe`] that rejects a uid with no successor.
    pub fn try_observe(&self, uid: &str) -> Result<()> {
        if uid.parse::<usize>() == Ok(usize::MAX) {
            return Err(GlobalignError::InvalidInput(format!(
                "uid {} leaves no room for new uids",
                uid
            )));
        }
        self.observe(uid);
        Ok(())
    }
}

impl Default for UidSeq {
    fn default() -> Self {
        Self::new()
    }
}

pub static CLUSTER_UIDS: UidSeq = UidSeq::new();
pub static LOCUS_UIDS: UidSeq = UidSeq::new();
pub static GENE_UIDS: UidSeq = UidSeq::new();
pub static ALIGNMENT_UIDS: UidSeq = UidSeq::new();
pub static LINK_UIDS: UidSeq = UidSeq::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_seq_monotonic() {
        let seq = UidSeq::new();
        assert_eq!(seq.next(), "0");
        assert_eq!(seq.next(), "1");
        assert_eq!(seq.next(), "2");
    }

    #[test]
    fn test_uid_seq_observe() {
        let seq = UidSeq::new();
        seq.observe("41");
        assert_eq!(seq.next(), "42");

        // smaller and non-numeric uids leave the sequence alone
        seq.observe("7");
        seq.observe("BGC0000001");
        assert_eq!(seq.next(), "43");

        // no successor, no change
        seq.observe(&usize::MAX.to_string());
        seq.observe("99999999999999999999999");
        assert_eq!(seq.next(), "44");

        assert!(seq.try_observe("100").is_ok());
        assert_eq!(seq.next(), "101");
        let err = seq.try_observe(&usize::MAX.to_string()).unwrap_err();
        assert!(matches!(err, GlobalignError::InvalidInput(_)));
        assert_eq!(seq.next(), "102");
    }
}
