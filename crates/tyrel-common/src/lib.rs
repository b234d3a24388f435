//! Common types and utilities for the tyrel engine.
//!
//! This crate provides foundational types used across all tyrel crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Engine limits and thresholds

// String interning for attribute names and string literals
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;
