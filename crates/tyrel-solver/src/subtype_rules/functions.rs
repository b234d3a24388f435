//! Function signature subtype checking.
//!
//! Parameters are compared contravariantly and the return type
//! covariantly. A `void` target return accepts any source return. Generic
//! signatures with the same number of type parameters are aligned by
//! renaming the source's parameters to the target's.

use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl SubtypeChecker<'_, '_> {
    pub(crate) fn check_function_subtype(
        &mut self,
        source: FunctionShapeId,
        target: FunctionShapeId,
    ) -> SubtypeResult {
        let interner = self.interner;
        let target_shape = interner.function_shape(target);
        let mut source_shape = (*interner.function_shape(source)).clone();

        if !source_shape.type_params.is_empty() {
            let mut substitution = TypeSubstitution::new();
            if source_shape.type_params.len() == target_shape.type_params.len() {
                for (source_param, target_param) in
                    source_shape.type_params.iter().zip(&target_shape.type_params)
                {
                    substitution.insert(source_param.name, interner.type_param(target_param.clone()));
                }
            } else {
                for param in &source_shape.type_params {
                    substitution.insert(param.name, param.constraint.unwrap_or(TypeId::UNKNOWN));
                }
            }
            for param in &mut source_shape.params {
                param.type_id = instantiate_type(interner, param.type_id, &substitution);
            }
            source_shape.return_type = instantiate_type(interner, source_shape.return_type, &substitution);
        }

        let target_has_rest = target_shape.params.iter().any(|p| p.rest);
        let source_required = source_shape
            .params
            .iter()
            .filter(|p| !p.optional && !p.rest)
            .count();
        if !target_has_rest && source_required > target_shape.params.len() {
            return SubtypeResult::False;
        }

        let mut result = SubtypeResult::True;
        for (idx, target_param) in target_shape.params.iter().enumerate() {
            let source_type = match source_shape.params.get(idx) {
                Some(source_param) if source_param.rest => {
                    match interner.lookup(source_param.type_id) {
                        Some(TypeData::Array(inner)) => inner,
                        _ => source_param.type_id,
                    }
                }
                Some(source_param) => source_param.type_id,
                None => match source_shape.params.last() {
                    Some(last) if last.rest => match interner.lookup(last.type_id) {
                        Some(TypeData::Array(inner)) => inner,
                        _ => last.type_id,
                    },
                    _ => continue,
                },
            };
            let target_type = match (target_param.rest, interner.lookup(target_param.type_id)) {
                (true, Some(TypeData::Array(inner))) => inner,
                _ => target_param.type_id,
            };
            match self.check_subtype(target_type, source_type) {
                SubtypeResult::False => return SubtypeResult::False,
                SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                SubtypeResult::True => {}
            }
        }

        if target_shape.return_type == TypeId::VOID {
            return result;
        }
        match self.check_subtype(source_shape.return_type, target_shape.return_type) {
            SubtypeResult::False => SubtypeResult::False,
            SubtypeResult::Provisional => SubtypeResult::Provisional,
            SubtypeResult::True => result,
        }
    }
}
