//! Latest-snapshot slot shared between producer and transport
//!
//! Holds one encoded message and a dirty flag. Publishing overwrites the
//! message; taking copies it out and clears the flag. Both happen under a
//! short lock, the network send never does.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;

/// Counters readable while the transport runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Snapshots handed to the slot
    pub published: u64,
    /// Datagrams successfully sent
    pub sent: u64,
    /// Snapshots overwritten before they were sent
    pub coalesced: u64,
    /// Failed sends
    pub send_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    sent: AtomicU64,
    coalesced: AtomicU64,
    send_errors: AtomicU64,
}

#[derive(Debug, Default)]
struct SlotState {
    snapshot: Bytes,
    dirty: bool,
}

/// Single-slot buffer; only the most recent snapshot survives
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    state: Mutex<SlotState>,
    counters: Counters,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot and mark it dirty.
    ///
    /// Returns `true` when an unsent snapshot was overwritten.
    pub fn publish(&self, snapshot: Bytes) -> bool {
        let replaced = {
            let mut state = self.state.lock();
            let replaced = state.dirty;
            state.snapshot = snapshot;
            state.dirty = true;
            replaced
        };

        self.counters.published.fetch_add(1, Ordering::Relaxed);
        if replaced {
            self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Coalesced unsent snapshot");
        }
        replaced
    }

    /// Copy out the snapshot and clear the dirty flag, if it was set
    pub fn take(&self) -> Option<Bytes> {
        let mut state = self.state.lock();
        if !state.dirty {
            return None;
        }
        state.dirty = false;
        Some(state.snapshot.clone())
    }

    /// Whether a snapshot is waiting to be sent
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// Most recently published snapshot, sent or not
    pub fn latest(&self) -> Bytes {
        self.state.lock().snapshot.clone()
    }

    pub(crate) fn record_sent(&self) {
        self.counters.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_error(&self) {
        self.counters.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            published: self.counters.published.load(Ordering::Relaxed),
            sent: self.counters.sent.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            send_errors: self.counters.send_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_slot() {
        let slot = SnapshotSlot::new();
        assert!(!slot.is_dirty());
        assert_eq!(slot.take(), None);
        assert!(slot.latest().is_empty());
    }

    #[test]
    fn test_take_clears_dirty() {
        let slot = SnapshotSlot::new();
        assert!(!slot.publish(Bytes::from_static(b"one")));
        assert!(slot.is_dirty());

        assert_eq!(slot.take(), Some(Bytes::from_static(b"one")));
        assert!(!slot.is_dirty());
        assert_eq!(slot.take(), None);
        assert_eq!(slot.latest(), Bytes::from_static(b"one"));
    }

    #[test]
    fn test_latest_wins() {
        let slot = SnapshotSlot::new();
        slot.publish(Bytes::from_static(b"one"));
        assert!(slot.publish(Bytes::from_static(b"two")));
        assert!(slot.publish(Bytes::from_static(b"three")));

        assert_eq!(slot.take(), Some(Bytes::from_static(b"three")));
        assert_eq!(slot.take(), None);

        let stats = slot.stats();
        assert_eq!(stats.published, 3);
        assert_eq!(stats.coalesced, 2);
        assert_eq!(stats.sent, 0);
    }

    #[test]
    fn test_concurrent_publish() {
        let slot = Arc::new(SnapshotSlot::new());
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        slot.publish(Bytes::from(vec![i; 8]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let taken = slot.take().unwrap();
        assert_eq!(taken.len(), 8);
        assert!(taken.iter().all(|&b| b == taken[0]));
        assert_eq!(slot.stats().published, 400);
        assert_eq!(slot.stats().coalesced, 399);
    }
}
