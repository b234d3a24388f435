//! Union and intersection type subtype checking.
//!
//! - `(A | B) <: T` if `A <: T` and `B <: T`
//! - `S <: (A | B)` if `S <: A` or `S <: B`
//! - `S <: (A & B)` if `S <: A` and `S <: B`
//! - `(A & B) <: T` if some member relates, or the members are records whose
//!   merge relates

use crate::objects::merge_record_members;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl SubtypeChecker<'_, '_> {
    pub(crate) fn check_members_all(&mut self, members: &[TypeId], target: TypeId) -> SubtypeResult {
        let mut result = SubtypeResult::True;
        for &member in members {
            match self.check_subtype(member, target) {
                SubtypeResult::False => return SubtypeResult::False,
                SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                SubtypeResult::True => {}
            }
        }
        result
    }

    pub(crate) fn check_union_target(&mut self, source: TypeId, members: &[TypeId]) -> SubtypeResult {
        for &member in members {
            let result = self.check_subtype(source, member);
            if result.is_true() {
                return result;
            }
        }
        SubtypeResult::False
    }

    pub(crate) fn check_intersection_target(
        &mut self,
        source: TypeId,
        members: &[TypeId],
    ) -> SubtypeResult {
        let mut result = SubtypeResult::True;
        for &member in members {
            match self.check_subtype(source, member) {
                SubtypeResult::False => return SubtypeResult::False,
                SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                SubtypeResult::True => {}
            }
        }
        result
    }

    pub(crate) fn check_intersection_source(
        &mut self,
        members: &[TypeId],
        target: TypeId,
    ) -> SubtypeResult {
        for &member in members {
            let result = self.check_subtype(member, target);
            if result.is_true() {
                return result;
            }
        }
        match merge_record_members(self.interner, members) {
            Some(merged) => self.check_subtype(merged, target),
            None => SubtypeResult::False,
        }
    }
}
