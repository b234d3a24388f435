//! Structural Type-Relation Solver
//!
//! This crate implements the type-level engine of tyrel:
//!
//! - **Interning**: every type expression becomes a `TypeId`; normalising
//!   constructors make equivalent expressions share one id
//! - **Evaluation**: conditional types with distribution and `infer`,
//!   mapped types with key remapping, `keyof`, indexed access, template
//!   literals and alias application
//! - **Relations**: structural subtyping, the `Equal` / `Alike` / `IsAny`
//!   oracle and conditional selection
//! - **Transforms**: `Pick`, `Omit`, `Exclude`, `Extract`, modifier
//!   toggles, key remapping and deep transformation
//! - **Gate**: `Expect`, which accepts exactly the literal `true` type
//!
//! Key properties:
//! - O(1) structural identity via interning (`TypeId` comparison)
//! - Coinductive handling of recursive subtype checks
//! - Bounded evaluation: runaway recursion is a rejection, not a hang
pub mod assertion;
pub mod canonicalize;
mod db;
pub mod def;
pub mod diagnostics;
mod evaluate;
pub mod evaluate_rules;
mod format;
mod instantiate;
mod intern;
pub mod objects;
pub mod options;
pub mod recursion;
mod relations;
mod subtype;
mod subtype_rules;
mod transform;
pub mod type_queries;
pub mod types;

pub use assertion::{is_false, is_true};
pub use canonicalize::{CanonicalForm, canonicalize, canonicalize_with};
pub use db::TypeDatabase;
pub use def::{DefId, DefinitionInfo, DefinitionStore, NoopResolver, TypeResolver};
pub use diagnostics::{Rejection, codes};
pub use evaluate::{TypeEvaluator, evaluate_type};
pub use format::TypeFormatter;
pub use instantiate::{MAX_INSTANTIATION_DEPTH, TypeSubstitution, instantiate_type};
pub use intern::{TypeInterner, format_number};
pub use objects::checked_record;
pub use options::{RenameCollisionPolicy, SolverOptions};
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};
pub use relations::{Distribution, is_alike, is_any_type, is_equal};
pub use subtype::{Evaluate, SubtypeChecker, SubtypeResult, is_subtype_of};
pub use transform::{DeepRule, KeyRemap};
pub use types::{
    ConditionalType, FunctionShape, IntrinsicKind, LiteralValue, MappedModifier, MappedType,
    ObjectShape, OrderedFloat, ParamInfo, PropertyInfo, StringIntrinsicKind, TemplateSpan,
    TupleElement, TypeApplication, TypeData, TypeId, TypeParamInfo,
};
pub use tyrel_common::interner::Atom;
