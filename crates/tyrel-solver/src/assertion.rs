//! Assertion gate.
//!
//! `expect` accepts exactly the literal `true` type; `expect_false`
//! exactly the literal `false` type. The gate evaluates its argument and
//! then only checks membership in the singleton.

use crate::def::TypeResolver;
use crate::diagnostics::Rejection;
use crate::evaluate::TypeEvaluator;
use crate::types::TypeId;
use tracing::debug;

/// `IsTrue<T>`
#[inline]
pub fn is_true(type_id: TypeId) -> bool {
    type_id == TypeId::BOOLEAN_TRUE
}

/// `IsFalse<T>`
#[inline]
pub fn is_false(type_id: TypeId) -> bool {
    type_id == TypeId::BOOLEAN_FALSE
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// `Expect<T>`
    pub fn expect(&mut self, type_id: TypeId) -> Result<(), Rejection> {
        let mark = self.rejection_mark();
        let found = self.evaluate(type_id);
        self.checked(mark, found)?;
        if is_true(found) {
            return Ok(());
        }
        debug!(found = found.0, "expect rejected");
        Err(Rejection::ExpectedTrue { found })
    }

    pub fn expect_false(&mut self, type_id: TypeId) -> Result<(), Rejection> {
        let mark = self.rejection_mark();
        let found = self.evaluate(type_id);
        self.checked(mark, found)?;
        if is_false(found) {
            return Ok(());
        }
        debug!(found = found.0, "expect_false rejected");
        Err(Rejection::ExpectedFalse { found })
    }

    /// `Expect<Equal<X, Y>>`
    pub fn expect_equal(&mut self, left: TypeId, right: TypeId) -> Result<(), Rejection> {
        let verdict = self.equal_type(left, right);
        self.expect(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeInterner;

    #[test]
    fn test_membership_checks() {
        assert!(is_true(TypeId::BOOLEAN_TRUE));
        assert!(!is_true(TypeId::BOOLEAN));
        assert!(!is_true(TypeId::ANY));
        assert!(is_false(TypeId::BOOLEAN_FALSE));
        assert!(!is_false(TypeId::NEVER));
    }

    #[test]
    fn test_expect_accepts_only_literal_true() {
        let interner = TypeInterner::new();
        let mut evaluator = TypeEvaluator::new(&interner);
        assert!(evaluator.expect(TypeId::BOOLEAN_TRUE).is_ok());
        for rejected in [TypeId::BOOLEAN_FALSE, TypeId::BOOLEAN, TypeId::ANY, TypeId::NEVER] {
            assert_eq!(
                evaluator.expect(rejected),
                Err(Rejection::ExpectedTrue { found: rejected })
            );
        }
        let one = interner.literal_number(1.0);
        assert_eq!(
            evaluator.expect(one),
            Err(Rejection::ExpectedTrue { found: one })
        );
    }

    #[test]
    fn test_expect_false_is_dual() {
        let interner = TypeInterner::new();
        let mut evaluator = TypeEvaluator::new(&interner);
        assert!(evaluator.expect_false(TypeId::BOOLEAN_FALSE).is_ok());
        assert_eq!(
            evaluator.expect_false(TypeId::BOOLEAN_TRUE),
            Err(Rejection::ExpectedFalse {
                found: TypeId::BOOLEAN_TRUE
            })
        );
    }

    #[test]
    fn test_expect_evaluates_its_argument() {
        let interner = TypeInterner::new();
        let mut evaluator = TypeEvaluator::new(&interner);
        let verdict = interner.conditional(crate::types::ConditionalType {
            check_type: interner.literal_string("a"),
            extends_type: TypeId::STRING,
            true_type: TypeId::BOOLEAN_TRUE,
            false_type: TypeId::BOOLEAN_FALSE,
            is_distributive: false,
        });
        assert!(evaluator.expect(verdict).is_ok());
        assert!(evaluator.expect_false(verdict).is_err());
    }

    #[test]
    fn test_expect_equal() {
        let interner = TypeInterner::new();
        let mut evaluator = TypeEvaluator::new(&interner);
        assert!(evaluator.expect_equal(TypeId::STRING, TypeId::STRING).is_ok());
        assert_eq!(
            evaluator.expect_equal(TypeId::STRING, TypeId::ANY),
            Err(Rejection::ExpectedTrue {
                found: TypeId::BOOLEAN_FALSE
            })
        );
    }
}
