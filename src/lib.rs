//! Offline replay of the ThreeFold Grid v3 uptime accrual and farmer-bot
//! compliance state machine.
//!
//! This crate reimplements the minting-period uptime accounting used to
//! determine real node payouts: given a time-ordered stream of chain events
//! for a single node, it replays them through [`accrual::process_period`],
//! [`accrual::process_post_period`], and [`accrual::final_check`], producing
//! a [`node_state::NodeState`] with a full credit log.
//!
//! Computing payout amounts, resource pricing, reward distribution, network
//! I/O and persistence are out of scope; see [`event_source::EventSource`]
//! for the collaborator interface a real ingestion pipeline would implement.

pub mod accrual;
pub mod csv_export;
pub mod error;
pub mod event;
pub mod event_source;
pub mod logger;
pub mod node_state;
/// Utilities to work with minting periods.
pub mod period;
