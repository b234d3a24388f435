//! Centralized limits and thresholds for the engine.
//!
//! Every bound here is a resource bound of the evaluator, not a property of
//! the type language. Exceeding one of them is reported as a depth/budget
//! rejection, never as a domain verdict.
//!
//! Solver recursion limits are consumed through
//! `tyrel_solver::recursion::RecursionProfile`, which reads its defaults
//! from the constants below.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of meta-type evaluation (conditional, mapped,
/// alias application).
///
/// ```text
/// type Loop<T> = Loop<[T]>;   // never settles; rejected once this depth is hit
/// ```
pub const MAX_EVALUATE_DEPTH: u32 = 50;

/// Maximum nesting depth of structural subtype checks.
///
/// Structural comparison of nested records legitimately goes deeper than
/// evaluation before a cycle is found, hence the larger bound.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum record nesting a deep transformation descends into.
pub const MAX_DEEP_TRANSFORM_DEPTH: u32 = 50;

// =============================================================================
// Operation Counts
// =============================================================================

/// Total work budget of a single evaluator or subtype checker.
pub const MAX_ITERATIONS: u32 = 100_000;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Maximum number of keys a mapped type may iterate over.
pub const MAX_MAPPED_KEYS: usize = 500;

/// Maximum number of string literals a template literal may expand into.
///
/// ```text
/// type Digit = "0" | "1" | ... | "9";
/// type Five = `${Digit}${Digit}${Digit}${Digit}${Digit}`;  // 100 000 members
/// ```
pub const TEMPLATE_LITERAL_EXPANSION_LIMIT: usize = 10_000;

/// Maximum number of members produced when an intersection is distributed
/// over union members, `(A | B) & (C | D)` → `A & C | A & D | ...`.
pub const MAX_INTERSECTION_DISTRIBUTION: usize = 1_000;
