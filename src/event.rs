//! Chain event types consumed by the accrual engine.
//!
//! See the `event_source` module for the collaborator contract that supplies
//! these, and `event_source`'s doc comment for the persisted event schema
//! this crate does not itself implement (ingestion and storage are out of
//! scope; this module only models what a sorted stream of events looks like
//! once fetched).

use serde::{Deserialize, Serialize};

/// Desired ("target") or actual ("state") power status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Power {
    Up,
    Down,
}

/// A single chain event relevant to uptime accrual, carrying its own
/// `(timestamp, event_index)` ordering key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    /// The node self-reported cumulative seconds of uptime since its last
    /// boot.
    NodeUptimeReported {
        uptime: u64,
        timestamp: i64,
        event_index: u32,
    },
    /// The chain-level desired power state for the node changed.
    PowerTargetChanged {
        target: Power,
        timestamp: i64,
        event_index: u32,
    },
    /// The chain-recorded actual power state of the node changed.
    PowerStateChanged {
        state: Power,
        down_block: Option<u64>,
        timestamp: i64,
        event_index: u32,
    },
}

impl Event {
    /// The `(timestamp, event_index)` ordering key shared by all variants.
    pub fn sort_key(&self) -> (i64, u32) {
        match self {
            Event::NodeUptimeReported {
                timestamp,
                event_index,
                ..
            } => (*timestamp, *event_index),
            Event::PowerTargetChanged {
                timestamp,
                event_index,
                ..
            } => (*timestamp, *event_index),
            Event::PowerStateChanged {
                timestamp,
                event_index,
                ..
            } => (*timestamp, *event_index),
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.sort_key().0
    }
}

/// Sorts events ascending by `(timestamp, event_index)`, the canonical total
/// order the accrual engine requires on entry.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|e| e.sort_key());
}

/// Whether a slice of events is already sorted per [`sort_events`]. The
/// engine treats unsorted input as a programming error rather than silently
/// re-sorting it, so callers should assert this at the boundary.
pub fn is_sorted(events: &[Event]) -> bool {
    events.windows(2).all(|w| w[0].sort_key() <= w[1].sort_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptime(uptime: u64, timestamp: i64, event_index: u32) -> Event {
        Event::NodeUptimeReported {
            uptime,
            timestamp,
            event_index,
        }
    }

    #[test]
    fn sort_events_orders_by_timestamp_then_index() {
        let mut events = vec![
            uptime(10, 100, 2),
            uptime(20, 100, 1),
            uptime(30, 50, 5),
        ];
        sort_events(&mut events);
        assert_eq!(events[0].sort_key(), (50, 5));
        assert_eq!(events[1].sort_key(), (100, 1));
        assert_eq!(events[2].sort_key(), (100, 2));
    }

    #[test]
    fn is_sorted_detects_out_of_order_input() {
        let ordered = vec![uptime(1, 1, 0), uptime(2, 2, 0)];
        assert!(is_sorted(&ordered));

        let unordered = vec![uptime(2, 2, 0), uptime(1, 1, 0)];
        assert!(!is_sorted(&unordered));
    }
}
