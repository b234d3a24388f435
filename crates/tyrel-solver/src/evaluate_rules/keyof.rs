//! `keyof` evaluation.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::intern::format_number;
use crate::objects::key_union;
use crate::objects::ordered_properties;
use crate::type_queries::contains_type_parameters;
use crate::types::*;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate `keyof T`.
    ///
    /// - records give the union of their attribute names as string literals
    /// - tuples give their index names, arrays give `number`
    /// - `keyof (A | B)` is the keys common to both, `keyof (A & B)` the keys of either
    /// - `keyof any` and `keyof never` are `string | number | symbol`
    pub(crate) fn evaluate_keyof(&mut self, operand: TypeId) -> TypeId {
        let interner = self.interner();
        let operand = self.evaluate(operand);

        match operand {
            TypeId::ANY | TypeId::NEVER => {
                return interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);
            }
            TypeId::ERROR => return TypeId::ERROR,
            _ => {}
        }

        match interner.lookup(operand) {
            Some(TypeData::Object(shape_id)) => {
                key_union(interner, &ordered_properties(interner, shape_id))
            }
            Some(TypeData::Tuple(list_id)) => {
                let elements = interner.tuple_list(list_id);
                let fixed = elements.iter().take_while(|element| !element.rest).count();
                let mut keys: Vec<TypeId> = (0..fixed)
                    .map(|idx| interner.literal_string(&format_number(idx as f64)))
                    .collect();
                if fixed < elements.len() {
                    keys.push(TypeId::NUMBER);
                }
                interner.union(keys)
            }
            Some(TypeData::Array(_)) => TypeId::NUMBER,
            Some(TypeData::Union(list_id)) => {
                let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
                let keys = members
                    .into_iter()
                    .map(|member| {
                        let keyof = interner.keyof(member);
                        self.evaluate(keyof)
                    })
                    .collect();
                interner.intersection(keys)
            }
            Some(TypeData::Intersection(list_id)) => {
                let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
                let keys = members
                    .into_iter()
                    .map(|member| {
                        let keyof = interner.keyof(member);
                        self.evaluate(keyof)
                    })
                    .collect();
                interner.union(keys)
            }
            _ if contains_type_parameters(interner, operand) => interner.keyof(operand),
            Some(TypeData::Mapped(_) | TypeData::Conditional(_)) => interner.keyof(operand),
            _ => TypeId::NEVER,
        }
    }
}
