//! Intrinsic (primitive) type subtype checking.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl SubtypeChecker<'_, '_> {
    /// Check if an intrinsic type is a subtype of another intrinsic type.
    ///
    /// Top and bottom types are settled before this is reached; what is left
    /// is the fixed hierarchy between primitives:
    /// - `undefined` <: `void`
    /// - `Function` <: `object`
    /// - every other pair only relates to itself
    pub(crate) fn check_intrinsic_subtype(
        &self,
        source: IntrinsicKind,
        target: IntrinsicKind,
    ) -> SubtypeResult {
        if source == target {
            return SubtypeResult::True;
        }
        SubtypeResult::from_bool(matches!(
            (source, target),
            (IntrinsicKind::Undefined, IntrinsicKind::Void)
                | (IntrinsicKind::Function, IntrinsicKind::Object)
        ))
    }
}
