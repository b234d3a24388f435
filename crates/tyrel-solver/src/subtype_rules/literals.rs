//! Literal type subtype checking.
//!
//! A literal relates to its primitive, and a string literal relates to a
//! template literal or string intrinsic pattern whose text it matches.

use crate::evaluate_rules::template_literal::text_matches_type;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;
use tracing::trace;

impl SubtypeChecker<'_, '_> {
    pub(crate) fn check_literal_subtype(
        &mut self,
        source: TypeId,
        literal: &LiteralValue,
        target: TypeId,
    ) -> SubtypeResult {
        let interner = self.interner;
        let result = match literal {
            LiteralValue::String(atom) => {
                target == TypeId::STRING
                    || match interner.lookup(target) {
                        Some(TypeData::TemplateLiteral(_) | TypeData::StringIntrinsic { .. }) => {
                            text_matches_type(interner, &interner.resolve_atom_ref(*atom), target)
                        }
                        _ => false,
                    }
            }
            LiteralValue::Number(_) => target == TypeId::NUMBER,
            LiteralValue::Boolean(_) => target == TypeId::BOOLEAN,
        };
        if !result {
            trace!(source = source.0, target = target.0, "literal does not relate");
        }
        SubtypeResult::from_bool(result)
    }
}
