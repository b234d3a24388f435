//! Structural subtype checking.
//!
//! `S <: T` holds when every value of `S` is a value of `T`. This is the
//! "extends" relation of conditional types and of the relation oracle.
//!
//! The checker asks an [`Evaluate`] implementation to reduce meta-types on
//! either side before comparing them, so `keyof X`, `X[K]` or an alias
//! application relate by what they evaluate to. Conditionals that stay
//! deferred (their check type is a free type parameter) relate
//! structurally: identical `extends` types, mutually related check types,
//! related branches.
//!
//! Recursion through `(source, target)` pairs is coinductive: a pair that
//! is already being checked is assumed to hold.

use crate::db::TypeDatabase;
use crate::def::NoopResolver;
use crate::evaluate::TypeEvaluator;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Meta-type reduction hook used by the subtype checker.
pub trait Evaluate {
    fn evaluate_type(&mut self, type_id: TypeId) -> TypeId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtypeResult {
    True,
    False,
    /// Assumed to hold because the pair is already on the stack.
    Provisional,
}

impl SubtypeResult {
    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, SubtypeResult::True | SubtypeResult::Provisional)
    }

    #[inline]
    pub fn is_false(self) -> bool {
        matches!(self, SubtypeResult::False)
    }

    #[inline]
    pub(crate) fn from_bool(value: bool) -> Self {
        if value {
            SubtypeResult::True
        } else {
            SubtypeResult::False
        }
    }
}

pub struct SubtypeChecker<'a, 'e> {
    pub(crate) interner: &'a dyn TypeDatabase,
    evaluator: &'e mut dyn Evaluate,
    guard: RecursionGuard<(TypeId, TypeId)>,
    cache: FxHashMap<(TypeId, TypeId), bool>,
}

impl<'a, 'e> SubtypeChecker<'a, 'e> {
    pub fn new(interner: &'a dyn TypeDatabase, evaluator: &'e mut dyn Evaluate) -> Self {
        SubtypeChecker {
            interner,
            evaluator,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
            cache: FxHashMap::default(),
        }
    }

    pub fn with_profile(mut self, profile: RecursionProfile) -> Self {
        self.guard = RecursionGuard::with_profile(profile);
        self
    }

    pub fn is_subtype_of(&mut self, source: TypeId, target: TypeId) -> bool {
        self.check_subtype(source, target).is_true()
    }

    /// Check `source <: target`.
    pub(crate) fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if let Some(result) = self.check_fast_path(source, target) {
            return result;
        }

        let source = self.resolve_meta(source);
        let target = self.resolve_meta(target);
        if let Some(result) = self.check_fast_path(source, target) {
            return result;
        }

        if let Some(&cached) = self.cache.get(&(source, target)) {
            return SubtypeResult::from_bool(cached);
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => return SubtypeResult::Provisional,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(source = source.0, target = target.0, "subtype check too deep");
                return SubtypeResult::False;
            }
        }
        let result = self.check_subtype_inner(source, target);
        self.guard.leave((source, target));

        if result != SubtypeResult::Provisional {
            self.cache.insert((source, target), result.is_true());
        }
        result
    }

    /// Rules that need no structure: identity, top and bottom types, errors.
    fn check_fast_path(&self, source: TypeId, target: TypeId) -> Option<SubtypeResult> {
        if source == target {
            return Some(SubtypeResult::True);
        }
        let result = match (source, target) {
            (_, TypeId::ANY | TypeId::UNKNOWN) => true,
            (TypeId::NEVER, _) => true,
            // Errors relate both ways so one failure does not cascade.
            (TypeId::ERROR, _) | (_, TypeId::ERROR) => true,
            (TypeId::ANY, _) => target != TypeId::NEVER,
            (_, TypeId::NEVER) => false,
            _ => return None,
        };
        Some(SubtypeResult::from_bool(result))
    }

    /// Reduce meta-types through the evaluator; other types come back unchanged.
    fn resolve_meta(&mut self, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        match self.interner.lookup(type_id) {
            Some(
                TypeData::Conditional(_)
                | TypeData::Mapped(_)
                | TypeData::KeyOf(_)
                | TypeData::IndexAccess(_, _)
                | TypeData::TemplateLiteral(_)
                | TypeData::StringIntrinsic { .. }
                | TypeData::Lazy(_)
                | TypeData::Application(_),
            ) => self.evaluator.evaluate_type(type_id),
            _ => type_id,
        }
    }

    fn check_subtype_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let interner = self.interner;

        // `boolean` is `true | false` everywhere but against itself.
        if source == TypeId::BOOLEAN {
            return self.check_members_all(&[TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE], target);
        }

        let (Some(source_key), Some(target_key)) = (interner.lookup(source), interner.lookup(target))
        else {
            return SubtypeResult::False;
        };

        if let TypeData::Union(list_id) = source_key {
            let members = interner.type_list(list_id);
            return self.check_members_all(&members, target);
        }
        if let TypeData::Union(list_id) = target_key {
            let members = interner.type_list(list_id);
            return self.check_union_target(source, &members);
        }
        if let TypeData::Intersection(list_id) = target_key {
            let members = interner.type_list(list_id);
            return self.check_intersection_target(source, &members);
        }
        if let TypeData::Intersection(list_id) = source_key {
            let members = interner.type_list(list_id);
            return self.check_intersection_source(&members, target);
        }

        match (&source_key, &target_key) {
            (TypeData::TypeParameter(info), _) => {
                let constraint = info.constraint.unwrap_or(TypeId::UNKNOWN);
                self.check_subtype(constraint, target)
            }
            (_, TypeData::TypeParameter(_)) | (TypeData::Infer(_), _) | (_, TypeData::Infer(_)) => {
                SubtypeResult::False
            }
            (TypeData::Conditional(s_cond), TypeData::Conditional(t_cond)) => {
                self.check_conditional_subtype(*s_cond, *t_cond)
            }
            (TypeData::Conditional(s_cond), _) => self.check_conditional_source(*s_cond, target),
            (TypeData::KeyOf(_), _) => {
                let any_key = interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);
                self.check_subtype(any_key, target)
            }
            (TypeData::Intrinsic(s_kind), TypeData::Intrinsic(t_kind)) => {
                self.check_intrinsic_subtype(*s_kind, *t_kind)
            }
            (TypeData::Literal(literal), _) => self.check_literal_subtype(source, literal, target),
            (TypeData::TemplateLiteral(_) | TypeData::StringIntrinsic { .. }, _) => {
                SubtypeResult::from_bool(target == TypeId::STRING)
            }
            (_, TypeData::Intrinsic(IntrinsicKind::Object)) => {
                SubtypeResult::from_bool(self.is_object_like(&source_key))
            }
            (TypeData::Function(_), TypeData::Intrinsic(IntrinsicKind::Function)) => {
                SubtypeResult::True
            }
            (_, TypeData::Object(t_shape)) if interner.object_shape(*t_shape).properties.is_empty() => {
                // `{}` holds every non-nullish value.
                SubtypeResult::from_bool(!matches!(
                    source,
                    TypeId::NULL | TypeId::UNDEFINED | TypeId::VOID | TypeId::UNKNOWN
                ))
            }
            (TypeData::Object(s_shape), TypeData::Object(t_shape)) => {
                self.check_object_subtype(*s_shape, *t_shape)
            }
            (TypeData::Tuple(s_list), TypeData::Tuple(t_list)) => {
                self.check_tuple_subtype(*s_list, *t_list)
            }
            (TypeData::Tuple(s_list), TypeData::Array(t_elem)) => {
                self.check_tuple_to_array(*s_list, *t_elem)
            }
            (TypeData::Array(s_elem), TypeData::Array(t_elem)) => self.check_subtype(*s_elem, *t_elem),
            (TypeData::Array(_), TypeData::Tuple(t_list)) => self.check_array_to_tuple(source, *t_list),
            (TypeData::Function(s_shape), TypeData::Function(t_shape)) => {
                self.check_function_subtype(*s_shape, *t_shape)
            }
            _ => SubtypeResult::False,
        }
    }

    fn is_object_like(&self, key: &TypeData) -> bool {
        matches!(
            key,
            TypeData::Object(_)
                | TypeData::Tuple(_)
                | TypeData::Array(_)
                | TypeData::Function(_)
                | TypeData::Mapped(_)
                | TypeData::Intrinsic(IntrinsicKind::Function)
        )
    }
}

/// Check `source <: target` with no alias definitions available.
pub fn is_subtype_of(interner: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    let mut evaluator: TypeEvaluator<'_, NoopResolver> = TypeEvaluator::new(interner);
    evaluator.is_subtype(source, target)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
