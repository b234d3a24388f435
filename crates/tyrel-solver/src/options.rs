//! Solver configuration.

use crate::recursion::RecursionProfile;
use serde::{Deserialize, Serialize};
use tyrel_common::limits;

/// What a key remap does when two source keys land on the same result key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenameCollisionPolicy {
    /// Reject the transformation with `Rejection::KeyCollision`.
    #[default]
    Reject,
    /// Keep one attribute whose value is the union of the colliding values.
    UnionValues,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverOptions {
    pub evaluation: RecursionProfile,
    pub subtype: RecursionProfile,
    pub deep_transform: RecursionProfile,
    pub rename_collision: RenameCollisionPolicy,
    pub max_mapped_keys: usize,
    pub template_expansion_limit: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            evaluation: RecursionProfile::TypeEvaluation,
            subtype: RecursionProfile::SubtypeCheck,
            deep_transform: RecursionProfile::DeepTransform,
            rename_collision: RenameCollisionPolicy::Reject,
            max_mapped_keys: limits::MAX_MAPPED_KEYS,
            template_expansion_limit: limits::TEMPLATE_LITERAL_EXPANSION_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_limits() {
        let options = SolverOptions::default();
        assert_eq!(options.max_mapped_keys, limits::MAX_MAPPED_KEYS);
        assert_eq!(options.rename_collision, RenameCollisionPolicy::Reject);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let options: SolverOptions =
            serde_json::from_str(r#"{ "renameCollision": "unionValues", "maxMappedKeys": 8 }"#)
                .unwrap();
        assert_eq!(options.rename_collision, RenameCollisionPolicy::UnionValues);
        assert_eq!(options.max_mapped_keys, 8);
        assert_eq!(options.evaluation, RecursionProfile::TypeEvaluation);
    }

    #[test]
    fn test_round_trip_uses_camel_case() {
        let json = serde_json::to_value(SolverOptions::default()).unwrap();
        assert_eq!(json["renameCollision"], "reject");
        assert_eq!(json["templateExpansionLimit"], 10_000);
    }
}
