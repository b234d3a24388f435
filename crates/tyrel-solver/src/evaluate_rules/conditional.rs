//! Conditional type evaluation.
//!
//! Handles `C extends E ? T : F`, including distribution over unions and
//! placeholder binding via `infer`.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::type_queries::{
    collect_infer_params, contains_infer_types, contains_type_parameters, distribution_members,
};
use crate::types::*;
use tracing::trace;

use super::infer_pattern::InferBindings;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate a conditional type.
    ///
    /// A distributive conditional whose check type is a union (or `boolean`,
    /// or `never`) is evaluated once per member and the results unioned.
    pub(crate) fn evaluate_conditional(
        &mut self,
        cond_type_id: TypeId,
        cond: &ConditionalType,
    ) -> TypeId {
        let check_type = self.evaluate(cond.check_type);

        if cond.is_distributive
            && let Some(members) = distribution_members(self.interner(), check_type)
        {
            trace!(
                cond = cond_type_id.0,
                members = members.len(),
                "distributing conditional"
            );
            let results: Vec<TypeId> = members
                .into_iter()
                .map(|member| self.resolve_conditional(member, cond))
                .collect();
            return self.interner().union(results);
        }

        self.resolve_conditional(check_type, cond)
    }

    /// Pick the branch for one (already distributed) check type.
    fn resolve_conditional(&mut self, check_type: TypeId, cond: &ConditionalType) -> TypeId {
        let interner = self.interner();
        let extends_type = self.evaluate(cond.extends_type);

        // `any` satisfies and fails every pattern at once.
        if check_type == TypeId::ANY {
            if extends_type == TypeId::ANY || extends_type == TypeId::UNKNOWN {
                return self.evaluate(cond.true_type);
            }
            let true_branch = self.evaluate(cond.true_type);
            let false_branch = self.evaluate(cond.false_type);
            return interner.union2(true_branch, false_branch);
        }

        if contains_type_parameters(interner, check_type)
            || contains_type_parameters(interner, extends_type)
        {
            trace!(check = check_type.0, "conditional deferred on free type parameter");
            return interner.conditional(ConditionalType {
                check_type,
                extends_type,
                true_type: cond.true_type,
                false_type: cond.false_type,
                is_distributive: cond.is_distributive,
            });
        }

        if contains_infer_types(interner, extends_type) {
            let mut bindings = InferBindings::default();
            if !self.match_infer_pattern(check_type, extends_type, &mut bindings) {
                return self.evaluate(cond.false_type);
            }
            let mut substitution = TypeSubstitution::new();
            for param in collect_infer_params(interner, extends_type) {
                let bound = bindings
                    .get(&param.name)
                    .copied()
                    .unwrap_or(param.constraint.unwrap_or(TypeId::UNKNOWN));
                substitution.insert(param.name, bound);
            }
            let true_type = instantiate_type(interner, cond.true_type, &substitution);
            return self.evaluate(true_type);
        }

        if self.is_subtype(check_type, extends_type) {
            self.evaluate(cond.true_type)
        } else {
            self.evaluate(cond.false_type)
        }
    }
}
