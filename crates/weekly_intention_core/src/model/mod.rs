//! Domain model for weekly intentions.
//!
//! # Responsibility
//! - Define the week identity (`WeekStart`) and the persisted record shape.
//! - Keep text normalization rules in one place.
//!
//! # Invariants
//! - A record's only external identity is its `WeekStart`.
//! - Persisted text is always trimmed and never empty.

pub mod intention;
pub mod week;
