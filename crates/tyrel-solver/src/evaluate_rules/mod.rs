//! Evaluation rules for each meta-type.
//!
//! Each module adds an `impl` block to [`TypeEvaluator`](crate::evaluate::TypeEvaluator).

pub mod conditional;
pub mod index_access;
pub mod infer_pattern;
pub mod keyof;
pub mod mapped;
pub mod string_intrinsic;
pub mod template_literal;
