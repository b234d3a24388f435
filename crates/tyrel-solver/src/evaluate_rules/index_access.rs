//! Index access type evaluation.
//!
//! Handles `T[K]`: record attribute lookup, tuple and array indexing, and
//! distribution over unions on either side.

use crate::def::TypeResolver;
use crate::diagnostics::Rejection;
use crate::evaluate::TypeEvaluator;
use crate::objects::merge_record_members;
use crate::type_queries::{contains_type_parameters, literal_key_atom};
use crate::types::*;

use super::template_literal::is_numeric_text;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Helper to evaluate a nested index access through the main driver.
    fn recurse_index_access(&mut self, object_type: TypeId, index_type: TypeId) -> TypeId {
        let index_access = self.interner().index_access(object_type, index_type);
        self.evaluate(index_access)
    }

    /// Evaluate an index access type: T[K]
    ///
    /// An optional attribute yields its declared type; no `undefined` is added.
    pub(crate) fn evaluate_index_access(&mut self, object_type: TypeId, index_type: TypeId) -> TypeId {
        let interner = self.interner();
        let object = self.evaluate(object_type);
        let index = self.evaluate(index_type);

        if object == TypeId::ANY || index == TypeId::ANY {
            return TypeId::ANY;
        }
        if object == TypeId::ERROR || index == TypeId::ERROR {
            return TypeId::ERROR;
        }
        if index == TypeId::NEVER {
            return TypeId::NEVER;
        }

        // T[A | B] -> T[A] | T[B]
        if let Some(TypeData::Union(list_id)) = interner.lookup(index) {
            let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
            let results = members
                .into_iter()
                .map(|member| self.recurse_index_access(object, member))
                .collect();
            return interner.union(results);
        }

        if contains_type_parameters(interner, object) || contains_type_parameters(interner, index) {
            return interner.index_access(object, index);
        }

        match interner.lookup(object) {
            Some(TypeData::Union(list_id)) => {
                let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
                let results = members
                    .into_iter()
                    .map(|member| self.recurse_index_access(member, index))
                    .collect();
                interner.union(results)
            }
            Some(TypeData::Object(shape_id)) => {
                let Some(name) = literal_key_atom(interner, index) else {
                    self.reject(Rejection::NonLiteralKey { key: index });
                    return TypeId::ERROR;
                };
                let shape = interner.object_shape(shape_id);
                match shape.property(name) {
                    Some(prop) => prop.type_id,
                    None => {
                        self.reject(Rejection::MissingProperty { object, key: index });
                        TypeId::ERROR
                    }
                }
            }
            Some(TypeData::Intersection(list_id)) => {
                let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
                match merge_record_members(interner, &members) {
                    Some(merged) => self.recurse_index_access(merged, index),
                    None => {
                        self.reject(Rejection::MissingProperty { object, key: index });
                        TypeId::ERROR
                    }
                }
            }
            Some(TypeData::Array(element)) => {
                if index == TypeId::NUMBER || self.numeric_index(index).is_some() {
                    element
                } else {
                    self.reject(Rejection::MissingProperty { object, key: index });
                    TypeId::ERROR
                }
            }
            Some(TypeData::Tuple(list_id)) => self.evaluate_tuple_index(object, list_id, index),
            _ => {
                self.reject(Rejection::MissingProperty { object, key: index });
                TypeId::ERROR
            }
        }
    }

    fn evaluate_tuple_index(&mut self, object: TypeId, list_id: TupleListId, index: TypeId) -> TypeId {
        let interner = self.interner();
        let elements = interner.tuple_list(list_id);
        let element_type = |element: &TupleElement| match (element.rest, interner.lookup(element.type_id)) {
            (true, Some(TypeData::Array(inner))) => inner,
            _ => element.type_id,
        };

        if index == TypeId::NUMBER {
            return interner.union(elements.iter().map(element_type).collect());
        }
        let Some(position) = self.numeric_index(index) else {
            self.reject(Rejection::MissingProperty { object, key: index });
            return TypeId::ERROR;
        };
        let fixed = elements.iter().take_while(|element| !element.rest).count();
        if position < fixed {
            return elements[position].type_id;
        }
        match elements.get(fixed) {
            // Positions past the fixed prefix land in the rest element or the suffix.
            Some(rest) if rest.rest => {
                let mut candidates = vec![element_type(rest)];
                candidates.extend(elements[fixed + 1..].iter().map(|element| element.type_id));
                interner.union(candidates)
            }
            _ => {
                self.reject(Rejection::MissingProperty { object, key: index });
                TypeId::ERROR
            }
        }
    }

    /// Position denoted by a number literal or a numeric string literal.
    fn numeric_index(&self, index: TypeId) -> Option<usize> {
        let interner = self.interner();
        let value = match interner.lookup(index)? {
            TypeData::Literal(LiteralValue::Number(value)) => value.0,
            TypeData::Literal(LiteralValue::String(atom)) => {
                let text = interner.resolve_atom_ref(atom);
                if !is_numeric_text(&text) {
                    return None;
                }
                text.parse::<f64>().ok()?
            }
            _ => return None,
        };
        (value >= 0.0 && value.fract() == 0.0).then_some(value as usize)
    }
}
