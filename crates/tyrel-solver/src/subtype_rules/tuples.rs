//! Tuple and array subtype checking.
//!
//! - `[A, B] <: [C, D]` element-wise, with optional elements only relating
//!   to optional positions
//! - `[A, B] <: T[]` if every element relates to `T`
//! - a rest element in the target absorbs the source elements between its
//!   fixed prefix and suffix

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl SubtypeChecker<'_, '_> {
    /// Element type a rest element spreads: `...T[]` gives `T`.
    fn rest_element_type(&self, element: &TupleElement) -> TypeId {
        match self.interner.lookup(element.type_id) {
            Some(TypeData::Array(inner)) => inner,
            _ => element.type_id,
        }
    }

    pub(crate) fn check_tuple_subtype(
        &mut self,
        source: TupleListId,
        target: TupleListId,
    ) -> SubtypeResult {
        let source_elems = self.interner.tuple_list(source);
        let target_elems = self.interner.tuple_list(target);
        let source_rest = source_elems.iter().position(|e| e.rest);
        let target_rest = target_elems.iter().position(|e| e.rest);

        match (source_rest, target_rest) {
            (None, None) => {
                if source_elems.len() > target_elems.len() {
                    return SubtypeResult::False;
                }
                let mut result = SubtypeResult::True;
                for (idx, target_elem) in target_elems.iter().enumerate() {
                    let Some(source_elem) = source_elems.get(idx) else {
                        if target_elem.optional {
                            continue;
                        }
                        return SubtypeResult::False;
                    };
                    if source_elem.optional && !target_elem.optional {
                        return SubtypeResult::False;
                    }
                    match self.check_subtype(source_elem.type_id, target_elem.type_id) {
                        SubtypeResult::False => return SubtypeResult::False,
                        SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                        SubtypeResult::True => {}
                    }
                }
                result
            }
            (None, Some(rest_idx)) => {
                let prefix = &target_elems[..rest_idx];
                let suffix = &target_elems[rest_idx + 1..];
                if source_elems.len() < prefix.len() + suffix.len() {
                    return SubtypeResult::False;
                }
                let suffix_start = source_elems.len() - suffix.len();
                let rest_type = self.rest_element_type(&target_elems[rest_idx]);

                let pairs = prefix
                    .iter()
                    .map(|t| t.type_id)
                    .zip(source_elems.iter())
                    .chain(suffix.iter().map(|t| t.type_id).zip(source_elems[suffix_start..].iter()))
                    .map(|(target_type, source_elem)| (source_elem.type_id, target_type))
                    .chain(
                        source_elems[prefix.len()..suffix_start]
                            .iter()
                            .map(|source_elem| (source_elem.type_id, rest_type)),
                    )
                    .collect::<Vec<_>>();
                let mut result = SubtypeResult::True;
                for (source_type, target_type) in pairs {
                    match self.check_subtype(source_type, target_type) {
                        SubtypeResult::False => return SubtypeResult::False,
                        SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                        SubtypeResult::True => {}
                    }
                }
                result
            }
            (Some(_), None) => SubtypeResult::False,
            (Some(s_idx), Some(t_idx)) => {
                if s_idx != t_idx || source_elems.len() != target_elems.len() {
                    return SubtypeResult::False;
                }
                let mut result = SubtypeResult::True;
                for (source_elem, target_elem) in source_elems.iter().zip(target_elems.iter()) {
                    match self.check_subtype(source_elem.type_id, target_elem.type_id) {
                        SubtypeResult::False => return SubtypeResult::False,
                        SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                        SubtypeResult::True => {}
                    }
                }
                result
            }
        }
    }

    pub(crate) fn check_tuple_to_array(&mut self, source: TupleListId, element: TypeId) -> SubtypeResult {
        let source_elems = self.interner.tuple_list(source);
        let mut result = SubtypeResult::True;
        for source_elem in source_elems.iter() {
            let source_type = if source_elem.rest {
                self.rest_element_type(source_elem)
            } else {
                source_elem.type_id
            };
            match self.check_subtype(source_type, element) {
                SubtypeResult::False => return SubtypeResult::False,
                SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                SubtypeResult::True => {}
            }
        }
        result
    }

    /// `T[] <: [...U]` holds when the target is a lone rest element.
    pub(crate) fn check_array_to_tuple(&mut self, source: TypeId, target: TupleListId) -> SubtypeResult {
        let target_elems = self.interner.tuple_list(target);
        match &target_elems[..] {
            [only] if only.rest => self.check_subtype(source, only.type_id),
            _ => SubtypeResult::False,
        }
    }
}
