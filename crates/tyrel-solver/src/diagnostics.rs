//! Static rejections.
//!
//! Every failure of the engine is a [`Rejection`]: an expression did not
//! satisfy a required constraint, or evaluation hit a resource bound.
//! Rejections carry structured data (`TypeId`s, atoms) and are rendered to
//! text lazily with [`Rejection::render`], so rejections collected and then
//! discarded during evaluation never pay for formatting.

use crate::db::TypeDatabase;
use crate::def::DefId;
use crate::format::TypeFormatter;
use crate::types::TypeId;
use std::fmt;
use tyrel_common::interner::Atom;

/// Stable numeric codes of each rejection kind.
pub mod codes {
    pub const EXPECTED_TRUE: u32 = 9001;
    pub const EXPECTED_FALSE: u32 = 9002;
    pub const KEYS_NOT_IN_SOURCE: u32 = 9003;
    pub const KEY_COLLISION: u32 = 9004;
    pub const DUPLICATE_ATTRIBUTE: u32 = 9005;
    pub const CONSTRAINT_VIOLATION: u32 = 9006;
    pub const NON_LITERAL_KEY: u32 = 9007;
    pub const MISSING_PROPERTY: u32 = 9008;
    pub const ARITY_MISMATCH: u32 = 9009;
    pub const UNKNOWN_DEFINITION: u32 = 9010;
    pub const DEPTH_EXCEEDED: u32 = 9011;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Gate argument is not the literal `true` type.
    ExpectedTrue { found: TypeId },
    /// Gate argument is not the literal `false` type.
    ExpectedFalse { found: TypeId },
    /// Key argument names keys the source record does not have.
    KeysNotInSource { source: TypeId, keys: TypeId },
    /// Two source keys were renamed onto the same result key.
    KeyCollision {
        key: Atom,
        first: TypeId,
        second: TypeId,
    },
    /// A record was declared with the same attribute name twice.
    DuplicateAttribute { name: Atom },
    /// Alias argument does not satisfy its parameter constraint.
    ConstraintViolation { argument: TypeId, constraint: TypeId },
    /// A mapped key evaluated to something other than a literal key.
    NonLiteralKey { key: TypeId },
    /// Indexed access with a key the object does not have.
    MissingProperty { object: TypeId, key: TypeId },
    /// Alias applied to the wrong number of arguments.
    ArityMismatch {
        def_id: DefId,
        min: usize,
        max: usize,
        found: usize,
    },
    UnknownDefinition { def_id: DefId },
    /// Evaluation exhausted its recursion depth or work budget.
    DepthExceeded { type_id: TypeId },
}

impl Rejection {
    pub fn code(&self) -> u32 {
        match self {
            Rejection::ExpectedTrue { .. } => codes::EXPECTED_TRUE,
            Rejection::ExpectedFalse { .. } => codes::EXPECTED_FALSE,
            Rejection::KeysNotInSource { .. } => codes::KEYS_NOT_IN_SOURCE,
            Rejection::KeyCollision { .. } => codes::KEY_COLLISION,
            Rejection::DuplicateAttribute { .. } => codes::DUPLICATE_ATTRIBUTE,
            Rejection::ConstraintViolation { .. } => codes::CONSTRAINT_VIOLATION,
            Rejection::NonLiteralKey { .. } => codes::NON_LITERAL_KEY,
            Rejection::MissingProperty { .. } => codes::MISSING_PROPERTY,
            Rejection::ArityMismatch { .. } => codes::ARITY_MISMATCH,
            Rejection::UnknownDefinition { .. } => codes::UNKNOWN_DEFINITION,
            Rejection::DepthExceeded { .. } => codes::DEPTH_EXCEEDED,
        }
    }

    /// Resource bounds are engine limits, not verdicts about the types.
    pub fn is_resource_bound(&self) -> bool {
        matches!(self, Rejection::DepthExceeded { .. })
    }

    /// Human-readable message with the types involved spelled out.
    pub fn render(&self, db: &dyn TypeDatabase) -> String {
        let fmt = TypeFormatter::new(db);
        let message = match self {
            Rejection::ExpectedTrue { found } => {
                format!("Type '{}' does not satisfy the constraint 'true'.", fmt.format(*found))
            }
            Rejection::ExpectedFalse { found } => {
                format!("Type '{}' does not satisfy the constraint 'false'.", fmt.format(*found))
            }
            Rejection::KeysNotInSource { source, keys } => format!(
                "Type '{}' does not satisfy the constraint 'keyof {}'.",
                fmt.format(*keys),
                fmt.format(*source)
            ),
            Rejection::KeyCollision { key, first, second } => format!(
                "Keys {} and {} both map to '{}'.",
                fmt.format(*first),
                fmt.format(*second),
                db.resolve_atom(*key)
            ),
            Rejection::DuplicateAttribute { name } => {
                format!("Duplicate identifier '{}'.", db.resolve_atom(*name))
            }
            Rejection::ConstraintViolation {
                argument,
                constraint,
            } => format!(
                "Type '{}' does not satisfy the constraint '{}'.",
                fmt.format(*argument),
                fmt.format(*constraint)
            ),
            Rejection::NonLiteralKey { key } => format!(
                "Type '{}' cannot be used as an attribute name.",
                fmt.format(*key)
            ),
            Rejection::MissingProperty { object, key } => format!(
                "Property {} does not exist on type '{}'.",
                fmt.format(*key),
                fmt.format(*object)
            ),
            Rejection::ArityMismatch { min, max, found, .. } if min == max => {
                format!("Expected {min} type arguments, but got {found}.")
            }
            Rejection::ArityMismatch { min, max, found, .. } => {
                format!("Expected {min}-{max} type arguments, but got {found}.")
            }
            Rejection::UnknownDefinition { def_id } => {
                format!("Cannot find definition #{}.", def_id.0)
            }
            Rejection::DepthExceeded { type_id } => format!(
                "Type instantiation is excessively deep and possibly infinite: '{}'.",
                fmt.format(*type_id)
            ),
        };
        format!("error TY{}: {}", self.code(), message)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ExpectedTrue { found } => {
                write!(f, "expected literal true, found type #{}", found.0)
            }
            Rejection::ExpectedFalse { found } => {
                write!(f, "expected literal false, found type #{}", found.0)
            }
            Rejection::KeysNotInSource { source, keys } => write!(
                f,
                "keys #{} are not keys of source type #{}",
                keys.0, source.0
            ),
            Rejection::KeyCollision { key, first, second } => write!(
                f,
                "keys #{} and #{} collide on attribute {}",
                first.0, second.0, key.0
            ),
            Rejection::DuplicateAttribute { name } => {
                write!(f, "duplicate attribute {}", name.0)
            }
            Rejection::ConstraintViolation {
                argument,
                constraint,
            } => write!(
                f,
                "type #{} does not satisfy constraint #{}",
                argument.0, constraint.0
            ),
            Rejection::NonLiteralKey { key } => write!(f, "non-literal key type #{}", key.0),
            Rejection::MissingProperty { object, key } => {
                write!(f, "key #{} does not exist on type #{}", key.0, object.0)
            }
            Rejection::ArityMismatch {
                def_id,
                min,
                max,
                found,
            } => write!(
                f,
                "definition #{} expects {}..={} arguments, got {}",
                def_id.0, min, max, found
            ),
            Rejection::UnknownDefinition { def_id } => {
                write!(f, "unknown definition #{}", def_id.0)
            }
            Rejection::DepthExceeded { type_id } => {
                write!(f, "evaluation depth exceeded at type #{}", type_id.0)
            }
        }
    }
}

impl std::error::Error for Rejection {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeInterner;

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            codes::EXPECTED_TRUE,
            codes::EXPECTED_FALSE,
            codes::KEYS_NOT_IN_SOURCE,
            codes::KEY_COLLISION,
            codes::DUPLICATE_ATTRIBUTE,
            codes::CONSTRAINT_VIOLATION,
            codes::NON_LITERAL_KEY,
            codes::MISSING_PROPERTY,
            codes::ARITY_MISMATCH,
            codes::UNKNOWN_DEFINITION,
            codes::DEPTH_EXCEEDED,
        ];
        let mut sorted = all.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());
    }

    #[test]
    fn test_render_expected_true() {
        let interner = TypeInterner::new();
        let rejection = Rejection::ExpectedTrue {
            found: TypeId::BOOLEAN_FALSE,
        };
        assert_eq!(rejection.code(), codes::EXPECTED_TRUE);
        assert_eq!(
            rejection.render(&interner),
            "error TY9001: Type 'false' does not satisfy the constraint 'true'."
        );
    }

    #[test]
    fn test_render_key_collision_names_both_keys() {
        let interner = TypeInterner::new();
        let key = interner.intern_string("a");
        let rejection = Rejection::KeyCollision {
            key,
            first: interner.literal_string("_a"),
            second: interner.literal_string("a"),
        };
        let text = rejection.render(&interner);
        assert!(text.contains("\"_a\""), "{text}");
        assert!(text.contains("'a'"), "{text}");
    }

    #[test]
    fn test_depth_exceeded_is_resource_bound() {
        let rejection = Rejection::DepthExceeded {
            type_id: TypeId::ERROR,
        };
        assert!(rejection.is_resource_bound());
        assert!(!Rejection::ExpectedTrue { found: TypeId::NEVER }.is_resource_bound());
        assert!(rejection.to_string().contains("depth"));
    }
}
