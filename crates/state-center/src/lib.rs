#![allow(dead_code)]
//! Per-Run ledgers owned exclusively by the Run Controller.
//!
//! `HistoryLedger` is written only by the loop after each decision and read
//! by prompt assembly; `FailedTargetLedger` is written by the Action
//! Executor on failures and decayed by the loop on successes, then read by
//! prompt assembly for the "steer away from" hint. Neither needs a mutex
//! for cross-task access: both live behind the single cooperative loop
//! driving a Run, so `parking_lot::Mutex` here is only to let the ledgers
//! be shared behind an `Arc` with the event bus and HTTP status handlers
//! without threading `&mut` everywhere.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use wayfarer_core_types::{Decision, HistoryEntry, HISTORY_RETAIN};

/// Append-only (bounded) log of recent decisions, read back into the
/// prompt, the loop-guard hint, and the stagnation detector.
#[derive(Default)]
pub struct HistoryLedger {
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(HISTORY_RETAIN)),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Append a decision, discarding the oldest entry once the ledger
    /// exceeds `HISTORY_RETAIN`.
    pub fn push(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock();
        entries.push_back(entry);
        while entries.len() > HISTORY_RETAIN {
            entries.pop_front();
        }
    }

    pub fn push_decision(&self, decision: Decision) {
        self.push(HistoryEntry {
            decision,
            timestamp: chrono::Utc::now(),
        });
    }

    /// The last `n` entries, oldest first, capped to what's retained.
    pub fn last(&self, n: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Failure counts keyed by SoM mark id, charged by the Action Executor
/// and decayed by the loop when a mark is later acted on successfully.
#[derive(Default)]
pub struct FailedTargetLedger {
    counts: Mutex<HashMap<u32, u32>>,
}

impl FailedTargetLedger {
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Charge a failure against `mark_id`.
    pub fn charge(&self, mark_id: u32) {
        *self.counts.lock().entry(mark_id).or_insert(0) += 1;
    }

    /// Decay the count for a mark that was just acted on successfully.
    /// Removes the entry entirely once it reaches zero.
    pub fn record_success(&self, mark_id: u32) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(&mark_id) {
            if *count <= 1 {
                counts.remove(&mark_id);
            } else {
                *count -= 1;
            }
        }
    }

    pub fn count(&self, mark_id: u32) -> u32 {
        self.counts.lock().get(&mark_id).copied().unwrap_or(0)
    }

    /// Snapshot of all charged marks, for the prompt's "steer away from"
    /// hint, sorted by descending failure count.
    pub fn snapshot(&self) -> Vec<(u32, u32)> {
        let mut entries: Vec<(u32, u32)> = self.counts.lock().iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }

    pub fn clear(&self) {
        self.counts.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core_types::ActionKind;

    fn decision(action: ActionKind, target: Option<&str>) -> Decision {
        Decision {
            thought: "t".into(),
            action,
            target_id: target.map(|s| s.to_string()),
            value: None,
        }
    }

    #[test]
    fn history_caps_at_retain_limit() {
        let ledger = HistoryLedger::new();
        for i in 0..15 {
            ledger.push_decision(decision(ActionKind::Click, Some(&i.to_string())));
        }
        assert_eq!(ledger.len(), HISTORY_RETAIN);
        let last = ledger.last(HISTORY_RETAIN);
        assert_eq!(last.first().unwrap().decision.target_id.as_deref(), Some("5"));
        assert_eq!(last.last().unwrap().decision.target_id.as_deref(), Some("14"));
    }

    #[test]
    fn failed_target_charge_and_decay() {
        let ledger = FailedTargetLedger::new();
        ledger.charge(3);
        ledger.charge(3);
        assert_eq!(ledger.count(3), 2);
        ledger.record_success(3);
        assert_eq!(ledger.count(3), 1);
        ledger.record_success(3);
        assert_eq!(ledger.count(3), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn snapshot_sorted_descending() {
        let ledger = FailedTargetLedger::new();
        ledger.charge(1);
        ledger.charge(2);
        ledger.charge(2);
        let snap = ledger.snapshot();
        assert_eq!(snap[0], (2, 2));
        assert_eq!(snap[1], (1, 1));
    }
}
