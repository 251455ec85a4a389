//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for intention records.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Week writes are atomic: dedup, update and delete happen in one
//!   transaction.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod intention_repo;
