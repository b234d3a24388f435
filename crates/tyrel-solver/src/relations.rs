//! Equivalence oracle and conditional selection.
//!
//! `equal` uses the invariant-position embedding: each side is wrapped as
//! `<G>() => G extends X ? 1 : 2` and the two wrappers must be mutually
//! assignable. Deferred conditionals only relate when their `extends`
//! types are identical, so the embedding is sensitive to modifiers and to
//! `any`, unlike plain mutual assignability.

use crate::canonicalize::{CanonicalForm, canonicalize_with};
use crate::db::TypeDatabase;
use crate::def::{NoopResolver, TypeResolver};
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::type_queries::contains_infer_types;
use crate::types::*;
use tracing::{debug, trace};

use crate::evaluate_rules::infer_pattern::InferBindings;

/// Whether a conditional distributes over a union value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Distribution {
    /// `S extends P ? ...`: the subject is a naked type parameter.
    #[default]
    Naked,
    /// `[S] extends [P] ? ...`: the union is matched as one value.
    Wrapped,
}

/// Name of the subject parameter of the invariant embedding.
const EMBED_PARAM: &str = "G";

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Fully evaluated canonical form.
    ///
    /// Recursive aliases are folded, so twins with the same structure
    /// normalize to the same id.
    pub fn normalize(&mut self, type_id: TypeId) -> TypeId {
        let deep = self.evaluate_deep_folded(type_id);
        canonicalize_with(self.interner(), deep, CanonicalForm::default())
    }

    /// Canonical form with intersections of records merged.
    pub fn normalize_merged(&mut self, type_id: TypeId) -> TypeId {
        let deep = self.evaluate_deep_folded(type_id);
        canonicalize_with(
            self.interner(),
            deep,
            CanonicalForm {
                merge_intersections: true,
            },
        )
    }

    /// `<G>() => G extends T ? 1 : 2`
    fn invariant_embedding(&self, type_id: TypeId) -> TypeId {
        let interner = self.interner();
        let subject = TypeParamInfo::new(interner.intern_string(EMBED_PARAM));
        let check_type = interner.type_param(subject.clone());
        let conditional = interner.conditional(ConditionalType {
            check_type,
            extends_type: type_id,
            true_type: interner.literal_number(1.0),
            false_type: interner.literal_number(2.0),
            is_distributive: true,
        });
        interner.function(FunctionShape {
            type_params: vec![subject],
            params: Vec::new(),
            return_type: conditional,
        })
    }

    fn equal_normalized(&mut self, left: TypeId, right: TypeId) -> bool {
        if left == right {
            return true;
        }
        let left_embedded = self.invariant_embedding(left);
        let right_embedded = self.invariant_embedding(right);
        let result = self.is_subtype(left_embedded, right_embedded)
            && self.is_subtype(right_embedded, left_embedded);
        trace!(left = left.0, right = right.0, result, "invariant embedding");
        result
    }

    /// `Equal<X, Y>`
    pub fn equal(&mut self, left: TypeId, right: TypeId) -> bool {
        if left == right {
            return true;
        }
        let left = self.normalize(left);
        let right = self.normalize(right);
        let result = self.equal_normalized(left, right);
        debug!(left = left.0, right = right.0, result, "equal");
        result
    }

    pub fn not_equal(&mut self, left: TypeId, right: TypeId) -> bool {
        !self.equal(left, right)
    }

    /// `Alike<X, Y>`: equal after merging intersections of records.
    pub fn alike(&mut self, left: TypeId, right: TypeId) -> bool {
        if left == right {
            return true;
        }
        let left = self.normalize_merged(left);
        let right = self.normalize_merged(right);
        let result = self.equal_normalized(left, right);
        debug!(left = left.0, right = right.0, result, "alike");
        result
    }

    /// `IsAny<T>`: `0 extends (1 & T)`.
    pub fn is_any(&mut self, type_id: TypeId) -> bool {
        let interner = self.interner();
        let evaluated = self.evaluate(type_id);
        let target = interner.intersection2(interner.literal_number(1.0), evaluated);
        self.is_subtype(interner.literal_number(0.0), target)
    }

    pub fn not_any(&mut self, type_id: TypeId) -> bool {
        !self.is_any(type_id)
    }

    /// `Equal<X, Y>` as the literal `true` or `false` type.
    pub fn equal_type(&mut self, left: TypeId, right: TypeId) -> TypeId {
        bool_type(self.equal(left, right))
    }

    pub fn alike_type(&mut self, left: TypeId, right: TypeId) -> TypeId {
        bool_type(self.alike(left, right))
    }

    /// `Value extends Pattern`, with `infer` placeholders allowed in the pattern.
    pub fn conforms(&mut self, value: TypeId, pattern: TypeId) -> bool {
        let value = self.evaluate(value);
        let pattern = self.evaluate(pattern);
        if contains_infer_types(self.interner(), pattern) {
            let mut bindings = InferBindings::default();
            return self.match_infer_pattern(value, pattern, &mut bindings);
        }
        self.is_subtype(value, pattern)
    }

    /// `Subject extends Pattern ? IfMatch : IfNoMatch` with `Subject := value`.
    ///
    /// `pattern`, `if_match` and `if_no_match` may mention `subject`; the
    /// branches may mention placeholders declared in `pattern`.
    pub fn select(
        &mut self,
        subject: &TypeParamInfo,
        value: TypeId,
        pattern: TypeId,
        if_match: TypeId,
        if_no_match: TypeId,
        distribution: Distribution,
    ) -> TypeId {
        let interner = self.interner();
        let subject_type = interner.type_param(subject.clone());
        let (check_type, extends_type) = match distribution {
            Distribution::Naked => (subject_type, pattern),
            Distribution::Wrapped => (
                interner.tuple(vec![TupleElement::required(subject_type)]),
                interner.tuple(vec![TupleElement::required(pattern)]),
            ),
        };
        let conditional = interner.conditional(ConditionalType {
            check_type,
            extends_type,
            true_type: if_match,
            false_type: if_no_match,
            is_distributive: distribution == Distribution::Naked,
        });
        let substitution = TypeSubstitution::single(subject.name, value);
        let instantiated = instantiate_type(interner, conditional, &substitution);
        self.evaluate(instantiated)
    }
}

fn bool_type(value: bool) -> TypeId {
    if value {
        TypeId::BOOLEAN_TRUE
    } else {
        TypeId::BOOLEAN_FALSE
    }
}

// =============================================================================
// Free-function entry points (no alias definitions)
// =============================================================================

pub fn is_equal(interner: &dyn TypeDatabase, left: TypeId, right: TypeId) -> bool {
    let mut evaluator: TypeEvaluator<'_, NoopResolver> = TypeEvaluator::new(interner);
    evaluator.equal(left, right)
}

pub fn is_alike(interner: &dyn TypeDatabase, left: TypeId, right: TypeId) -> bool {
    let mut evaluator: TypeEvaluator<'_, NoopResolver> = TypeEvaluator::new(interner);
    evaluator.alike(left, right)
}

pub fn is_any_type(interner: &dyn TypeDatabase, type_id: TypeId) -> bool {
    let mut evaluator: TypeEvaluator<'_, NoopResolver> = TypeEvaluator::new(interner);
    evaluator.is_any(type_id)
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod tests;
