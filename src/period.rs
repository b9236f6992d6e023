//! Minting period arithmetic.
//!
//! A minting period is a fixed-length window identified by an integer offset
//! from [`FIRST_PERIOD_START_TIMESTAMP`]. There are twelve per calendar year,
//! aligned roughly (but not exactly) to month boundaries.

use chrono::{Local, TimeZone};
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamp of the start of the first minting period.
pub const FIRST_PERIOD_START_TIMESTAMP: i64 = 1_522_501_000;

/// Duration of a standard minting period, in seconds. One twelfth of a
/// four-year leap cycle: `24 * 60 * 60 * (365 * 3 + 366 * 2) / 60`.
pub const STANDARD_PERIOD_DURATION: i64 = 24 * 60 * 60 * (365 * 3 + 366 * 2) / 60;

/// A minting period, i.e. a half-open-ish window `[start, end]` plus the
/// human-readable month/year it roughly corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub offset: i64,
    pub start: i64,
    pub end: i64,
    pub month: u32,
    pub year: i32,
}

impl Period {
    /// The period containing the current point in time.
    pub fn current() -> Period {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the epoch")
            .as_secs() as i64;
        Period::from_timestamp(now)
    }

    /// The period containing the given UNIX timestamp.
    pub fn from_timestamp(ts: i64) -> Period {
        let offset = (ts - FIRST_PERIOD_START_TIMESTAMP).div_euclid(STANDARD_PERIOD_DURATION);
        Period::from_offset(offset)
    }

    /// The period at the given offset from [`FIRST_PERIOD_START_TIMESTAMP`].
    pub fn from_offset(offset: i64) -> Period {
        let start = FIRST_PERIOD_START_TIMESTAMP + STANDARD_PERIOD_DURATION * offset;
        let end = start + STANDARD_PERIOD_DURATION;

        // Each minting period falls almost entirely into a single month. The
        // start or end day might be in a different month though, so we use
        // the middle of the period to get the "human" interpretation.
        let middle = Local
            .timestamp_opt((start + end) / 2, 0)
            .single()
            .expect("period midpoint is an unambiguous local time");

        Period {
            offset,
            start,
            end,
            month: middle.format("%m").to_string().parse().unwrap(),
            year: middle.format("%Y").to_string().parse().unwrap(),
        }
    }

    /// The duration of the period in seconds.
    ///
    /// The Python implementation this was ported from has no return
    /// statement on its equivalent method and silently yields nothing; we
    /// expose the value explicitly instead of reproducing that defect.
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether the given timestamp falls within `[start, end]`.
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }
}
