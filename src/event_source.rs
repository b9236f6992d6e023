//! The collaborator contract the accrual engine is driven by.
//!
//! Fetching events from tfchain, a GraphQL proxy, or a local event-store
//! database is out of scope for this crate. Those concerns live in the
//! ingestion pipeline. This module only defines the narrow interface the
//! engine needs, plus an in-memory implementation suitable for tests and for
//! the demo CLI.
//!
//! ## Persisted event schema (collaborator reference, not implemented here)
//!
//! For compatibility with upstream ingesters, a production `EventSource`
//! backs onto a store with roughly this shape:
//!
//! - `NodeUptimeReported(node_id, uptime, timestamp_hint, block, event_index, timestamp)`,
//!   unique on `(event_index, block)`.
//! - `PowerTargetChanged(farm_id, node_id, target, block, event_index, timestamp)`,
//!   unique on `(event_index, block)`.
//! - `PowerStateChanged(farm_id, node_id, state, down_block, block, event_index, timestamp)`,
//!   unique on `(event_index, block)`.
//! - `PowerState(node_id, state, down_block, down_time, target, block, timestamp)`,
//!   unique on `(node_id, block)`.
//! - `processed_blocks(block_number PRIMARY KEY)`.
//! - `kv(key UNIQUE, value)` with keys `checkpoint_block`, `checkpoint_time`.
//!
//! All timestamps in that schema are seconds, not milliseconds.

use serde::{Deserialize, Serialize};

use crate::event::{sort_events, Event, Power};

/// Window within which an initial-power row is considered to describe the
/// start of a period.
pub const PERIOD_CATCH: i64 = 30;

/// The node's power configuration as of (approximately) the period start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitialPower {
    pub state: Power,
    /// Timestamp at which the node went Down, if `state` is Down.
    pub down_time: Option<i64>,
    pub target: Power,
    /// Block time of the first block in the period.
    pub timestamp: Option<i64>,
}

impl Default for InitialPower {
    /// If no row exists, the node is presumed to have been fully Up since
    /// before the period started.
    fn default() -> Self {
        InitialPower {
            state: Power::Up,
            down_time: None,
            target: Power::Up,
            timestamp: None,
        }
    }
}

/// Supplies time-ordered events and the initial power snapshot for a node.
pub trait EventSource {
    /// All events for `node_id` with timestamp in `[t_start, t_end]`, sorted
    /// ascending by `(timestamp, event_index)`.
    fn get_events(&self, node_id: u32, t_start: i64, t_end: i64) -> Vec<Event>;

    /// The power row within [`PERIOD_CATCH`] seconds of `period_start`, if
    /// any. Implementations may tolerate absence; the engine defaults to
    /// `InitialPower::default()` when `None` is returned.
    fn get_initial_power(&self, node_id: u32, period_start: i64) -> Option<InitialPower>;
}

/// An in-memory fixture of events and initial-power rows, keyed by node.
/// Suitable for tests and for the demo CLI, which loads one of these from a
/// JSON file instead of talking to a real chain or indexer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryEventSource {
    events: std::collections::HashMap<u32, Vec<Event>>,
    initial_power: std::collections::HashMap<u32, InitialPower>,
}

impl InMemoryEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds events for a node, re-sorting the node's full event list
    /// afterwards so callers don't need to pre-sort themselves.
    pub fn push_events(&mut self, node_id: u32, mut events: Vec<Event>) -> &mut Self {
        let entry = self.events.entry(node_id).or_default();
        entry.append(&mut events);
        sort_events(entry);
        self
    }

    pub fn set_initial_power(&mut self, node_id: u32, power: InitialPower) -> &mut Self {
        self.initial_power.insert(node_id, power);
        self
    }
}

impl EventSource for InMemoryEventSource {
    fn get_events(&self, node_id: u32, t_start: i64, t_end: i64) -> Vec<Event> {
        self.events
            .get(&node_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| {
                        let ts = e.timestamp();
                        ts >= t_start && ts <= t_end
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_initial_power(&self, node_id: u32, _period_start: i64) -> Option<InitialPower> {
        self.initial_power.get(&node_id).copied()
    }
}
