//! Master-only bookkeeping of per-tile status (§3 `TileAssignment`, §4.6).
//!
//! This mirrors `Work`'s tile list one-for-one but tracks richer state than
//! the single atomic claim cursor can: which worker owns a tile and whether
//! its pixels have actually landed in the image yet.

use std::sync::Mutex;

/// A tile's progress through the master's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    Unassigned,
    InFlight,
    Completed,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    status: TileStatus,
    /// `None` means the master's own local worker thread, mirroring the
    /// source's `assigned_worker_idx = -1` sentinel.
    assigned_worker_idx: Option<usize>,
}

/// Parallel array of per-tile assignment state, guarded by a single mutex
/// (§5: "updated under a spinlock or single-writer policy" — a `Mutex` is
/// the idiomatic Rust single-writer policy here; contention is bounded by
/// `tile_count`, not by render throughput).
pub struct TileAssignment {
    entries: Mutex<Vec<Entry>>,
}

impl TileAssignment {
    pub fn new(tile_count: usize) -> Self {
        Self {
            entries: Mutex::new(
                vec![
                    Entry {
                        status: TileStatus::Unassigned,
                        assigned_worker_idx: None,
                    };
                    tile_count
                ],
            ),
        }
    }

    /// Mark `tile_id` `IN_FLIGHT`, recording which worker claimed it.
    pub fn mark_in_flight(&self, tile_id: usize, assigned_worker_idx: Option<usize>) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(tile_id) {
            entry.status = TileStatus::InFlight;
            entry.assigned_worker_idx = assigned_worker_idx;
        }
    }

    /// Mark `tile_id` `COMPLETED`. No-op if out of range.
    pub fn mark_completed(&self, tile_id: usize) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(tile_id) {
            entry.status = TileStatus::Completed;
        }
    }

    pub fn status(&self, tile_id: usize) -> Option<TileStatus> {
        self.entries.lock().unwrap().get(tile_id).map(|e| e.status)
    }

    pub fn completed_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.status == TileStatus::Completed)
            .count()
    }

    pub fn all_completed(&self) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .all(|e| e.status == TileStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unassigned() {
        let table = TileAssignment::new(4);
        assert_eq!(table.status(0), Some(TileStatus::Unassigned));
        assert!(!table.all_completed());
    }

    #[test]
    fn transitions_through_lifecycle() {
        let table = TileAssignment::new(2);
        table.mark_in_flight(0, Some(3));
        assert_eq!(table.status(0), Some(TileStatus::InFlight));
        table.mark_completed(0);
        assert_eq!(table.status(0), Some(TileStatus::Completed));
        assert!(!table.all_completed());
        table.mark_in_flight(1, None);
        table.mark_completed(1);
        assert!(table.all_completed());
    }

    #[test]
    fn out_of_range_tile_id_is_ignored() {
        let table = TileAssignment::new(1);
        table.mark_in_flight(99, Some(0));
        assert_eq!(table.status(99), None);
    }
}
