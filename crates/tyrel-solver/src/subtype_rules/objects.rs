//! Record subtype checking.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl SubtypeChecker<'_, '_> {
    /// Width and depth subtyping between records.
    ///
    /// Every attribute of the target must be present in the source with a
    /// related value type, unless the target attribute is optional. An
    /// optional source attribute does not satisfy a required target one.
    /// `readonly` does not affect assignability.
    pub(crate) fn check_object_subtype(
        &mut self,
        source: ObjectShapeId,
        target: ObjectShapeId,
    ) -> SubtypeResult {
        let source_shape = self.interner.object_shape(source);
        let target_shape = self.interner.object_shape(target);

        let mut result = SubtypeResult::True;
        for target_prop in &target_shape.properties {
            let Some(source_prop) = source_shape.property(target_prop.name) else {
                if target_prop.optional {
                    continue;
                }
                return SubtypeResult::False;
            };
            if source_prop.optional && !target_prop.optional {
                return SubtypeResult::False;
            }
            match self.check_subtype(source_prop.type_id, target_prop.type_id) {
                SubtypeResult::False => return SubtypeResult::False,
                SubtypeResult::Provisional => result = SubtypeResult::Provisional,
                SubtypeResult::True => {}
            }
        }
        result
    }
}
