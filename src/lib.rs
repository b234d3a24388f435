//! tyrel: a type-relation and transformation engine.
//!
//! Types are reified as interned [`TypeId`]s. The [`Engine`] owns the
//! interner, the alias definitions and the solver options, and exposes the
//! vocabulary used to write compile-time type tests:
//!
//! - the oracle: `equal`, `not_equal`, `alike`, `is_any`, `not_any`
//! - transforms: `pick`, `omit`, `exclude`, `extract`, modifier toggles,
//!   `rename_filter` and `deep_transform`
//! - the gate: `expect`, `is_true`, `is_false`
//!
//! The heavy lifting lives in [`tyrel_solver`]; this crate wires it
//! together and renders rejections.

pub mod engine;
pub mod tracing_config;

pub use engine::{Diagnostic, Engine};
pub use tyrel_solver::{
    Atom, ConditionalType, DeepRule, DefId, Distribution, FunctionShape, KeyRemap, MappedModifier,
    MappedType, ParamInfo, PropertyInfo, Rejection, RenameCollisionPolicy, SolverOptions,
    StringIntrinsicKind, TemplateSpan, TupleElement, TypeData, TypeDatabase, TypeFormatter,
    TypeId, TypeInterner, TypeParamInfo, codes,
};
