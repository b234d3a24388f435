//! Property tests for the oracle and the transforms.
//!
//! Types are generated as plain descriptions and lowered into a fresh
//! engine per case, since a `TypeId` only means something to the interner
//! that produced it. Properties:
//!
//! 1. `Equal` is reflexive and symmetric; `NotEqual` is its negation
//! 2. `Pick<T, keyof T>` and `Omit<T, never>` are `T`
//! 3. The identity rename is `T`
//! 4. `Exclude<X, never>` is `X`; `Exclude<never, X>` is `never`
//! 5. `Exclude<X, U> | Extract<X, U>` is `X`
//! 6. Toggling readonly never changes assignability
//! 7. Attribute declaration order never affects `Equal`

use std::collections::BTreeMap;

use proptest::prelude::*;
use tyrel::{Engine, KeyRemap, TypeId};

#[derive(Clone, Debug)]
enum Shape {
    Number,
    String,
    Boolean,
    Literal(&'static str),
    List(Box<Shape>),
    /// Attributes in declaration order; names are unique.
    Record(Vec<(&'static str, Attribute)>),
    Union(Vec<Shape>),
}

#[derive(Clone, Debug)]
struct Attribute {
    shape: Shape,
    readonly: bool,
    optional: bool,
}

const NAME_POOL: &[&str] = &["a", "b", "c", "id", "name", "value"];
const LITERAL_POOL: &[&str] = &["x", "y", "z", "on", "off"];

fn arb_leaf() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Number),
        Just(Shape::String),
        Just(Shape::Boolean),
        prop::sample::select(LITERAL_POOL).prop_map(Shape::Literal),
    ]
}

fn arb_record(inner: BoxedStrategy<Shape>) -> impl Strategy<Value = Shape> {
    prop::collection::btree_map(
        prop::sample::select(NAME_POOL),
        (inner, any::<bool>(), any::<bool>()).prop_map(|(shape, readonly, optional)| Attribute {
            shape,
            readonly,
            optional,
        }),
        0..=4,
    )
    .prop_map(|attributes: BTreeMap<_, _>| attributes.into_iter().collect::<Vec<_>>())
    .prop_shuffle()
    .prop_map(Shape::Record)
}

/// Shapes of bounded depth. Depth 0 = leaves only.
fn arb_shape(depth: u32) -> BoxedStrategy<Shape> {
    if depth == 0 {
        return arb_leaf().boxed();
    }
    let inner = arb_shape(depth - 1);
    prop_oneof![
        3 => arb_leaf(),
        1 => inner.clone().prop_map(|s| Shape::List(Box::new(s))),
        1 => prop::collection::vec(inner.clone(), 2..=3).prop_map(Shape::Union),
        2 => arb_record(inner),
    ]
    .boxed()
}

fn arb_top_record() -> impl Strategy<Value = Shape> {
    arb_record(arb_shape(1))
}

fn arb_literal_union() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(LITERAL_POOL), 0..=4)
}

fn lower(engine: &Engine, shape: &Shape) -> TypeId {
    let interner = engine.interner();
    match shape {
        Shape::Number => TypeId::NUMBER,
        Shape::String => TypeId::STRING,
        Shape::Boolean => TypeId::BOOLEAN,
        Shape::Literal(text) => engine.literal(text),
        Shape::List(element) => interner.array(lower(engine, element)),
        Shape::Union(members) => {
            interner.union(members.iter().map(|m| lower(engine, m)).collect())
        }
        Shape::Record(attributes) => {
            let attributes = attributes
                .iter()
                .map(|(name, attribute)| {
                    let mut prop = engine.attribute(name, lower(engine, &attribute.shape));
                    if attribute.readonly {
                        prop = prop.readonly();
                    }
                    if attribute.optional {
                        prop = prop.optional();
                    }
                    prop
                })
                .collect();
            engine.record(attributes).expect("names are unique")
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_equal_is_reflexive(shape in arb_shape(2)) {
        let engine = Engine::new();
        let ty = lower(&engine, &shape);
        prop_assert!(engine.equal(ty, ty).unwrap());
        prop_assert!(engine.expect_equal(ty, ty).is_ok());
    }

    #[test]
    fn prop_equal_is_symmetric(left in arb_shape(2), right in arb_shape(2)) {
        let engine = Engine::new();
        let a = lower(&engine, &left);
        let b = lower(&engine, &right);
        let forward = engine.equal(a, b).unwrap();
        prop_assert_eq!(forward, engine.equal(b, a).unwrap());
        prop_assert_eq!(!forward, engine.not_equal(a, b).unwrap());
    }

    #[test]
    fn prop_pick_all_keys_is_identity(shape in arb_top_record()) {
        let engine = Engine::new();
        let source = lower(&engine, &shape);
        let picked = engine.pick(source, engine.interner().keyof(source)).unwrap();
        prop_assert!(engine.equal(picked, source).unwrap());
    }

    #[test]
    fn prop_omit_never_is_identity(shape in arb_top_record()) {
        let engine = Engine::new();
        let source = lower(&engine, &shape);
        let omitted = engine.omit(source, TypeId::NEVER).unwrap();
        prop_assert!(engine.equal(omitted, source).unwrap());
    }

    #[test]
    fn prop_identity_rename_is_identity(shape in arb_top_record()) {
        let engine = Engine::new();
        let source = lower(&engine, &shape);
        let renamed = engine
            .rename_filter(source, &KeyRemap::identity(engine.interner()))
            .unwrap();
        prop_assert!(engine.equal(renamed, source).unwrap());
    }

    #[test]
    fn prop_exclude_never(names in arb_literal_union()) {
        let engine = Engine::new();
        let union = engine.keys(&names);
        prop_assert_eq!(engine.exclude(union, TypeId::NEVER).unwrap(), union);
        prop_assert_eq!(engine.exclude(TypeId::NEVER, union).unwrap(), TypeId::NEVER);
    }

    #[test]
    fn prop_exclude_and_extract_partition(names in arb_literal_union(), removed in arb_literal_union()) {
        let engine = Engine::new();
        let union = engine.keys(&names);
        let filter = engine.keys(&removed);
        let kept = engine.exclude(union, filter).unwrap();
        let taken = engine.extract(union, filter).unwrap();
        let rejoined = engine.interner().union(vec![kept, taken]);
        prop_assert!(engine.equal(rejoined, union).unwrap());
    }

    #[test]
    fn prop_readonly_preserves_assignability(shape in arb_top_record()) {
        let engine = Engine::new();
        let source = lower(&engine, &shape);
        let frozen = engine.readonly(source, true).unwrap();
        prop_assert!(engine.is_subtype(source, frozen).unwrap());
        prop_assert!(engine.is_subtype(frozen, source).unwrap());
    }

    #[test]
    fn prop_attribute_order_is_irrelevant(shape in arb_top_record()) {
        let engine = Engine::new();
        let Shape::Record(attributes) = &shape else {
            unreachable!("arb_top_record yields records");
        };
        let reversed = Shape::Record(attributes.iter().rev().cloned().collect());
        let forward = lower(&engine, &shape);
        let backward = lower(&engine, &reversed);
        prop_assert!(engine.equal(forward, backward).unwrap());
        prop_assert!(engine.equal(backward, forward).unwrap());
    }
}
