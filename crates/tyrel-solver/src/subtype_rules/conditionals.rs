//! Deferred conditional type subtype checking.
//!
//! A conditional whose check type is still a free type parameter cannot be
//! resolved, so it is related by structure.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl SubtypeChecker<'_, '_> {
    /// `C1 extends E1 ? T1 : F1 <: C2 extends E2 ? T2 : F2` if `E1` and `E2`
    /// are identical, `C1` and `C2` relate both ways and the branches relate.
    pub(crate) fn check_conditional_subtype(
        &mut self,
        source: ConditionalTypeId,
        target: ConditionalTypeId,
    ) -> SubtypeResult {
        let source_cond = self.interner.conditional_type(source);
        let target_cond = self.interner.conditional_type(target);

        if source_cond.extends_type != target_cond.extends_type {
            return SubtypeResult::False;
        }
        let steps = [
            (source_cond.check_type, target_cond.check_type),
            (target_cond.check_type, source_cond.check_type),
            (source_cond.true_type, target_cond.true_type),
            (source_cond.false_type, target_cond.false_type),
        ];
        let mut result = SubtypeResult::True;
        for (from, to) in steps {
            match self.check_subtype(from, to) {
                SubtypeResult::False => return SubtypeResult::False,
                SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                SubtypeResult::True => {}
            }
        }
        result
    }

    /// A deferred conditional relates to a target both its branches relate to.
    pub(crate) fn check_conditional_source(
        &mut self,
        source: ConditionalTypeId,
        target: TypeId,
    ) -> SubtypeResult {
        let cond = self.interner.conditional_type(source);
        let branches = [cond.true_type, cond.false_type];
        self.check_members_all(&branches, target)
    }
}
