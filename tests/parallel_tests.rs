//! Independent queries against one engine from many threads.

use rayon::prelude::*;
use tyrel::{Engine, TypeId};

fn record_with(engine: &Engine, names: &[&str]) -> TypeId {
    engine
        .record(
            names
                .iter()
                .map(|name| engine.attribute(name, TypeId::NUMBER))
                .collect(),
        )
        .unwrap()
}

#[test]
fn test_parallel_queries_agree_with_sequential() {
    let engine = Engine::new();
    let names: Vec<String> = (0..64).map(|i| format!("k{i}")).collect();

    let parallel: Vec<(TypeId, bool)> = names
        .par_iter()
        .map(|name| {
            let source = record_with(&engine, &[name.as_str(), "shared"]);
            let picked = engine.pick(source, engine.literal("shared")).unwrap();
            let omitted = engine.omit(source, engine.literal("shared")).unwrap();
            let frozen = engine.readonly(omitted, true).unwrap();
            (picked, engine.equal(frozen, omitted).unwrap())
        })
        .collect();

    // Every thread interned the same `{ shared: number }`.
    let shared = record_with(&engine, &["shared"]);
    for (picked, frozen_equal) in &parallel {
        assert_eq!(*picked, shared);
        assert!(!frozen_equal);
    }

    for name in &names {
        let source = record_with(&engine, &[name.as_str(), "shared"]);
        let omitted = engine.omit(source, engine.literal("shared")).unwrap();
        assert_eq!(omitted, record_with(&engine, &[name.as_str()]));
    }
}

#[test]
fn test_parallel_alias_evaluation() {
    let engine = Engine::new();
    let interner = engine.interner();
    let t = engine.param("T");
    let t_type = interner.type_param(t.clone());
    // type Wrap<T> = T extends string ? T[] : never
    let body = engine.conditional(t_type, TypeId::STRING, interner.array(t_type), TypeId::NEVER);
    let wrap = engine.define("Wrap", vec![t], body);

    let results: Vec<bool> = (0..128)
        .into_par_iter()
        .map(|i| {
            let literal = engine.literal(&format!("v{}", i % 8));
            let applied = engine.apply(wrap, vec![literal]);
            engine
                .equal(applied, engine.interner().array(literal))
                .unwrap()
        })
        .collect();
    assert!(results.into_iter().all(|ok| ok));
}
