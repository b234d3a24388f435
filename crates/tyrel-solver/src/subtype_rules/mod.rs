//! Subtype rules, one module per type family.
//!
//! Each module adds an `impl` block to [`SubtypeChecker`](crate::subtype::SubtypeChecker).

mod conditionals;
mod functions;
mod intrinsics;
mod literals;
mod objects;
mod tuples;
mod unions;
