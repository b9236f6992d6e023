//! Error taxonomy for the accrual engine.
//!
//! Only data invariants and timestamp assertions are modeled as `Err`. Domain
//! violations (uptime too high, clock skew, slow boot) and stale/garbage
//! reports are non-fatal: they are recorded via [`crate::logger::MintingLogger`]
//! and accrual continues for the remaining events.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccrualError {
    /// An uptime event arrived with `uptime_info` set but no `boot_time`.
    /// Indicates event-ordering corruption upstream.
    #[error(
        "node {node_id} reported uptime at {timestamp} but has no recorded boot time"
    )]
    MissingBootTime { node_id: u32, timestamp: i64 },

    /// A timestamp-ordering assertion failed: either a scheduled-wake delta
    /// went negative, or a `PowerStateChanged` event is older than the
    /// node's `uptime_info`.
    #[error("node {node_id} observed a timestamp travel backwards at {timestamp}: {detail}")]
    TimeTravel {
        node_id: u32,
        timestamp: i64,
        detail: String,
    },
}
