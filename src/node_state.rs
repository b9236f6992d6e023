//! The mutable per-node accumulator driven by the accrual engine.

use chrono::{Local, TimeZone};

use crate::event::Power;
use crate::period::Period;

/// The triple tracked for the node's current report window:
/// `(last_reported_at, last_reported_uptime, accumulated_uptime_this_period)`.
pub type UptimeInfo = (i64, u64, u64);

/// `(booted_at, detected_at)`: when the node is believed to have last
/// booted, and the timestamp of the event that revealed it.
pub type BootTime = (i64, i64);

/// One row of the credit log: the outcome of a single `credit_uptime` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditRecord {
    pub timestamp: i64,
    pub credited: u64,
    pub elapsed: i64,
    pub downtime: i64,
    pub note: String,
}

impl CreditRecord {
    /// Local-time rendering of `timestamp`, used by the CSV exporter.
    pub fn date(&self) -> String {
        Local
            .timestamp_opt(self.timestamp, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}

/// A declared interval over which accrued uptime gaps are forgiven. The
/// engine only accumulates `uptime` and `events` here; it does not apply the
/// credit back into [`NodeState::uptime`]. That adjustment is left to the
/// consumer.
#[derive(Debug, Clone)]
pub struct GracePeriod {
    pub name: String,
    pub start: i64,
    /// Exclusive end, mirroring the half-open credit interval
    /// `[at_ts - seconds, at_ts)` it is intersected against.
    pub end: i64,
    pub uptime: i64,
    pub events: Vec<CreditRecord>,
}

impl GracePeriod {
    pub fn new(name: impl Into<String>, start: i64, end: i64) -> Self {
        GracePeriod {
            name: name.into(),
            start,
            end,
            uptime: 0,
            events: Vec::new(),
        }
    }

    /// Intersects `[credit_start, credit_end)` with this grace period and, if
    /// the overlap is non-empty, accrues its width and records the event.
    fn apply_credit(&mut self, credit_start: i64, credit_end: i64, record: &CreditRecord) {
        let overlap_start = credit_start.max(self.start);
        let overlap_end = credit_end.min(self.end);
        if overlap_end > overlap_start {
            self.uptime += overlap_end - overlap_start;
            self.events.push(record.clone());
        }
    }
}

/// The mutable accumulator for a single `(node_id, period)` pair.
pub struct NodeState {
    pub id: u32,
    pub period: Period,
    pub end_ts: i64,

    pub power_target: Power,
    pub power_state: Power,
    /// Set when the node went Down because its target was Down
    /// (farmer-bot-initiated sleep).
    pub power_managed: Option<i64>,
    /// Set on the first `PowerTargetChanged(Up)` received while `power_state`
    /// is Down.
    pub power_manage_boot: Option<i64>,

    pub uptime_info: Option<UptimeInfo>,
    pub boot_time: Option<BootTime>,

    pub last_uptime_added_ts: i64,
    pub uptime: u64,
    pub downtime: i64,
    pub boot_duration_violations: u32,

    pub events: Vec<CreditRecord>,
    pub grace_periods: Vec<GracePeriod>,
}

impl NodeState {
    pub fn new(id: u32, period: Period) -> Self {
        NodeState {
            id,
            end_ts: period.end,
            period,
            power_target: Power::Up,
            power_state: Power::Up,
            power_managed: None,
            power_manage_boot: None,
            uptime_info: None,
            boot_time: None,
            last_uptime_added_ts: period.start,
            uptime: 0,
            downtime: 0,
            boot_duration_violations: 0,
            events: Vec::new(),
            grace_periods: Vec::new(),
        }
    }

    pub fn with_grace_periods(mut self, grace_periods: Vec<GracePeriod>) -> Self {
        self.grace_periods = grace_periods;
        self
    }

    /// Records a credit of `seconds` of uptime at `at_ts`.
    ///
    /// When `post_period` is true, `elapsed` is measured against
    /// `self.end_ts` rather than `at_ts`, matching the scaling used for
    /// credits granted after the period officially ended. `last_uptime_added_ts`
    /// is still advanced to `at_ts` unconditionally in both cases, matching
    /// the reference Python implementation: at most one scheduled-wake and
    /// one normal post-period credit can happen, and their `elapsed` windows
    /// may legitimately overlap as a result.
    pub fn credit_uptime(&mut self, seconds: u64, at_ts: i64, note: impl Into<String>, post_period: bool) {
        self.uptime += seconds;

        let elapsed = if post_period {
            self.end_ts - self.last_uptime_added_ts
        } else {
            at_ts - self.last_uptime_added_ts
        };
        let downtime = elapsed - seconds as i64;
        self.downtime += downtime;

        let record = CreditRecord {
            timestamp: at_ts,
            credited: seconds,
            elapsed,
            downtime,
            note: note.into(),
        };

        let credit_start = at_ts - seconds as i64;
        for grace_period in &mut self.grace_periods {
            grace_period.apply_credit(credit_start, at_ts, &record);
        }

        self.events.push(record);
        self.last_uptime_added_ts = at_ts;
    }
}
