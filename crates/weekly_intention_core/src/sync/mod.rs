//! Connectivity observation and the advisory sync status indicator.
//!
//! # Invariants
//! - Status never gates store or mirror operations.
//! - Reachability is produced off the main context and consumed on it.

pub mod reachability;
pub mod status;
