//! End-to-end tests of the engine vocabulary.
//!
//! Each test writes type expressions the way a type-level test suite
//! would: build the types, apply the utilities, then gate the result with
//! `expect_equal`.

use tyrel::{
    DeepRule, Distribution, Engine, KeyRemap, MappedModifier, MappedType, Rejection,
    RenameCollisionPolicy, SolverOptions, TypeId, codes,
};

/// `{ a: number; b?: string; readonly c: boolean }`
fn sample(engine: &Engine) -> TypeId {
    engine
        .record(vec![
            engine.attribute("a", TypeId::NUMBER),
            engine.attribute("b", TypeId::STRING).optional(),
            engine.attribute("c", TypeId::BOOLEAN).readonly(),
        ])
        .unwrap()
}

// =============================================================================
// Oracle
// =============================================================================

#[test]
fn test_equal_is_modifier_sensitive() {
    let engine = Engine::new();
    let plain = engine.record(vec![engine.attribute("a", TypeId::NUMBER)]).unwrap();
    let frozen = engine
        .record(vec![engine.attribute("a", TypeId::NUMBER).readonly()])
        .unwrap();
    let optional = engine
        .record(vec![engine.attribute("a", TypeId::NUMBER).optional()])
        .unwrap();

    // Mutually assignable, yet not equal.
    assert!(engine.is_subtype(plain, frozen).unwrap());
    assert!(engine.is_subtype(frozen, plain).unwrap());
    assert!(!engine.equal(plain, frozen).unwrap());
    assert!(engine.not_equal(plain, frozen).unwrap());
    assert!(!engine.equal(plain, optional).unwrap());
    assert!(engine.equal(frozen, frozen).unwrap());
}

#[test]
fn test_equal_distinguishes_any() {
    let engine = Engine::new();
    assert!(!engine.equal(TypeId::ANY, TypeId::STRING).unwrap());
    assert!(!engine.equal(TypeId::ANY, TypeId::UNKNOWN).unwrap());
    assert!(engine.is_any(TypeId::ANY).unwrap());
    assert!(engine.not_any(TypeId::UNKNOWN).unwrap());
    assert!(engine.not_any(TypeId::NEVER).unwrap());
}

#[test]
fn test_alike_versus_equal_on_intersections() {
    let engine = Engine::new();
    let left = engine.record(vec![engine.attribute("a", TypeId::NUMBER)]).unwrap();
    let right = engine.record(vec![engine.attribute("b", TypeId::STRING)]).unwrap();
    let both = engine.interner().intersection2(left, right);
    let flat = engine
        .record(vec![
            engine.attribute("a", TypeId::NUMBER),
            engine.attribute("b", TypeId::STRING),
        ])
        .unwrap();

    assert!(!engine.equal(both, flat).unwrap());
    assert!(engine.alike(both, flat).unwrap());
    assert_eq!(engine.alike_type(both, flat).unwrap(), TypeId::BOOLEAN_TRUE);
}

// =============================================================================
// Gate
// =============================================================================

#[test]
fn test_expect_accepts_only_true() {
    let engine = Engine::new();
    assert!(engine.expect(TypeId::BOOLEAN_TRUE).is_ok());
    assert_eq!(
        engine.expect(TypeId::BOOLEAN),
        Err(Rejection::ExpectedTrue {
            found: TypeId::BOOLEAN
        })
    );
    assert!(engine.expect(TypeId::ANY).is_err());
    assert!(engine.expect(TypeId::NEVER).is_err());
    assert!(engine.expect_false(TypeId::BOOLEAN_FALSE).is_ok());

    assert!(engine.is_true(TypeId::BOOLEAN_TRUE).unwrap());
    assert!(!engine.is_true(TypeId::BOOLEAN).unwrap());
    assert!(engine.is_false(TypeId::BOOLEAN_FALSE).unwrap());
}

#[test]
fn test_is_true_evaluates_its_argument() {
    let engine = Engine::new();
    let verdict = engine.equal_type(TypeId::STRING, TypeId::STRING).unwrap();
    assert!(engine.is_true(verdict).unwrap());

    // string extends string ? true : false
    let conditional = engine.conditional(
        TypeId::STRING,
        TypeId::STRING,
        TypeId::BOOLEAN_TRUE,
        TypeId::BOOLEAN_FALSE,
    );
    assert!(engine.is_true(conditional).unwrap());
    assert!(engine.expect(conditional).is_ok());
}

#[test]
fn test_failed_expectation_renders() {
    let engine = Engine::new();
    let rejection = engine
        .expect_equal(TypeId::STRING, TypeId::NUMBER)
        .unwrap_err();
    let diagnostic = engine.render(&rejection);
    assert_eq!(diagnostic.code, codes::EXPECTED_TRUE);
    assert_eq!(
        diagnostic.message_text,
        "Type 'false' does not satisfy the constraint 'true'."
    );

    let json = serde_json::to_value(&diagnostic).unwrap();
    assert_eq!(json["code"], codes::EXPECTED_TRUE);
    assert!(json["messageText"].is_string());
}

// =============================================================================
// Aliases and the conditional evaluator
// =============================================================================

#[test]
fn test_user_defined_exclude_alias() {
    let engine = Engine::new();
    let interner = engine.interner();
    let t = engine.param("T");
    let u = engine.param("U");
    let t_type = interner.type_param(t.clone());
    let u_type = interner.type_param(u.clone());

    // type MyExclude<T, U> = T extends U ? never : T
    let body = engine.conditional(t_type, u_type, TypeId::NEVER, t_type);
    let my_exclude = engine.define("MyExclude", vec![t, u], body);

    let abc = engine.keys(&["a", "b", "c"]);
    let applied = engine.apply(my_exclude, vec![abc, engine.literal("a")]);
    assert!(engine.expect_equal(applied, engine.keys(&["b", "c"])).is_ok());

    // The built-in transform agrees.
    let builtin = engine.exclude(abc, engine.literal("a")).unwrap();
    assert!(engine.equal(applied, builtin).unwrap());
}

#[test]
fn test_wrapped_check_does_not_distribute() {
    let engine = Engine::new();
    let subject = engine.param("S");
    let value = engine.interner().union(vec![engine.literal("a"), TypeId::NUMBER]);
    let yes = engine.literal("yes");
    let no = engine.literal("no");

    let naked = engine
        .select(&subject, value, TypeId::STRING, yes, no, Distribution::Naked)
        .unwrap();
    assert_eq!(naked, engine.interner().union(vec![yes, no]));

    let wrapped = engine
        .select(&subject, value, TypeId::STRING, yes, no, Distribution::Wrapped)
        .unwrap();
    assert_eq!(wrapped, no);
}

#[test]
fn test_infer_extracts_element_type() {
    let engine = Engine::new();
    let interner = engine.interner();
    let t = engine.param("T");
    let e = engine.param("E");
    let t_type = interner.type_param(t.clone());

    // type ElementOf<T> = T extends (infer E)[] ? E : never
    let body = engine.conditional(
        t_type,
        interner.array(interner.infer(e.clone())),
        interner.type_param(e),
        TypeId::NEVER,
    );
    let element_of = engine.define("ElementOf", vec![t], body);

    let applied = engine.apply(element_of, vec![interner.array(TypeId::STRING)]);
    assert_eq!(engine.evaluate(applied).unwrap(), TypeId::STRING);

    let not_an_array = engine.apply(element_of, vec![TypeId::NUMBER]);
    assert_eq!(engine.evaluate(not_an_array).unwrap(), TypeId::NEVER);
}

#[test]
fn test_alias_arity_mismatch_is_rejected() {
    let engine = Engine::new();
    let t = engine.param("T");
    let t_type = engine.interner().type_param(t.clone());
    let id = engine.define("Id", vec![t], t_type);

    let applied = engine.apply(id, vec![TypeId::STRING, TypeId::NUMBER]);
    let rejection = engine.evaluate(applied).unwrap_err();
    assert!(matches!(rejection, Rejection::ArityMismatch { found: 2, .. }));
    assert_eq!(
        engine.render(&rejection).message_text,
        "Expected 1 type arguments, but got 2."
    );
}

#[test]
fn test_mapped_alias_with_keyof() {
    let engine = Engine::new();
    let interner = engine.interner();
    let t = engine.param("T");
    let p = engine.param("P");
    let t_type = interner.type_param(t.clone());
    let p_type = interner.type_param(p.clone());

    // type Mutable<T> = { -readonly [P in keyof T]: T[P] }
    let body = interner.mapped(MappedType {
        type_param: p,
        constraint: interner.keyof(t_type),
        name_type: None,
        template: interner.index_access(t_type, p_type),
        readonly_modifier: Some(MappedModifier::Remove),
        optional_modifier: None,
    });
    let mutable = engine.define("Mutable", vec![t], body);

    let source = sample(&engine);
    let applied = engine.apply(mutable, vec![source]);
    let expected = engine.readonly(source, false).unwrap();
    assert!(engine.expect_equal(applied, expected).is_ok());
    assert_eq!(engine.debug(applied), "{ a: number; b?: string; c: boolean }");
}

#[test]
fn test_recursive_alias_equals_itself() {
    let engine = Engine::new();
    // type Node = { next: Node | null }
    let node = engine.declare("Node", Vec::new());
    let next = engine.interner().union(vec![engine.alias(node), TypeId::NULL]);
    engine.set_body(node, engine.record(vec![engine.attribute("next", next)]).unwrap());
    // type Link = { next: Link | null }
    let link = engine.declare("Link", Vec::new());
    let next = engine.interner().union(vec![engine.alias(link), TypeId::NULL]);
    engine.set_body(link, engine.record(vec![engine.attribute("next", next)]).unwrap());

    assert_eq!(engine.equal(engine.alias(node), engine.alias(node)), Ok(true));
    assert!(engine.expect_equal(engine.alias(node), engine.alias(link)).is_ok());
    assert_eq!(engine.debug(engine.alias(node)), "{ next: null | Node }");
}

// =============================================================================
// Transforms
// =============================================================================

#[test]
fn test_pick_and_omit() {
    let engine = Engine::new();
    let source = sample(&engine);

    let picked = engine.pick(source, engine.keys(&["a", "c"])).unwrap();
    assert_eq!(engine.display(picked), "{ a: number; readonly c: boolean }");

    let omitted = engine.omit(source, engine.keys(&["a", "c"])).unwrap();
    assert_eq!(engine.display(omitted), "{ b?: string }");

    let rejection = engine.pick(source, engine.literal("missing")).unwrap_err();
    assert_eq!(rejection.code(), codes::KEYS_NOT_IN_SOURCE);
}

#[test]
fn test_extract_and_exclude() {
    let engine = Engine::new();
    let mixed = engine
        .interner()
        .union(vec![engine.literal("a"), TypeId::NUMBER, TypeId::BOOLEAN]);
    assert_eq!(engine.extract(mixed, TypeId::STRING).unwrap(), engine.literal("a"));
    assert_eq!(
        engine.exclude(mixed, TypeId::STRING).unwrap(),
        engine.interner().union(vec![TypeId::NUMBER, TypeId::BOOLEAN])
    );
}

#[test]
fn test_modifier_toggles() {
    let engine = Engine::new();
    let source = sample(&engine);

    let partial = engine.optional(source, true).unwrap();
    assert_eq!(
        engine.display(partial),
        "{ a?: number; b?: string; readonly c?: boolean }"
    );
    let required_b = engine
        .optional_keys(source, false, engine.literal("b"))
        .unwrap();
    assert_eq!(
        engine.display(required_b),
        "{ a: number; b: string; readonly c: boolean }"
    );
    let frozen_a = engine
        .readonly_keys(source, true, engine.literal("a"))
        .unwrap();
    assert_eq!(
        engine.display(frozen_a),
        "{ readonly a: number; b?: string; readonly c: boolean }"
    );
}

#[test]
fn test_rename_filter() {
    let engine = Engine::new();
    let source = engine
        .record(vec![
            engine.attribute("name", TypeId::STRING),
            engine.attribute("age", TypeId::NUMBER),
        ])
        .unwrap();
    let getters = engine
        .rename_filter(source, &KeyRemap::getter(engine.interner()))
        .unwrap();
    assert_eq!(engine.display(getters), "{ getName: string; getAge: number }");

    let numbers = engine.pick_by_value(source, TypeId::NUMBER).unwrap();
    assert_eq!(engine.display(numbers), "{ age: number }");
    let rest = engine.omit_by_value(source, TypeId::NUMBER).unwrap();
    assert_eq!(engine.display(rest), "{ name: string }");
}

#[test]
fn test_rename_collision_policy() {
    let strict = Engine::new();
    let build = |engine: &Engine| {
        engine
            .record(vec![
                engine.attribute("_id", TypeId::NUMBER),
                engine.attribute("id", TypeId::STRING),
            ])
            .unwrap()
    };
    let source = build(&strict);
    let remap = KeyRemap::strip_prefix(strict.interner(), "_");
    let rejection = strict.rename_filter(source, &remap).unwrap_err();
    assert_eq!(rejection.code(), codes::KEY_COLLISION);
    assert_eq!(
        strict.render(&rejection).message_text,
        "Keys \"_id\" and \"id\" both map to 'id'."
    );

    let lenient = Engine::with_options(SolverOptions {
        rename_collision: RenameCollisionPolicy::UnionValues,
        ..SolverOptions::default()
    });
    let source = build(&lenient);
    let remap = KeyRemap::strip_prefix(lenient.interner(), "_");
    let merged = lenient.rename_filter(source, &remap).unwrap();
    assert_eq!(lenient.display(merged), "{ id: number | string }");
}

#[test]
fn test_deep_readonly_and_merge() {
    let engine = Engine::new();
    let inner = engine.record(vec![engine.attribute("b", TypeId::NUMBER)]).unwrap();
    let outer = engine.record(vec![engine.attribute("a", inner)]).unwrap();

    let frozen = engine.deep_transform(outer, DeepRule::Readonly(true)).unwrap();
    assert_eq!(
        engine.display(frozen),
        "{ readonly a: { readonly b: number } }"
    );

    let overlay = engine.record(vec![engine.attribute("a", TypeId::STRING)]).unwrap();
    let merged = engine.merge(outer, overlay).unwrap();
    assert!(engine.expect_equal(merged, overlay).is_ok());
}

#[test]
fn test_duplicate_attribute_is_rejected() {
    let engine = Engine::new();
    let rejection = engine
        .record(vec![
            engine.attribute("a", TypeId::NUMBER),
            engine.attribute("a", TypeId::STRING),
        ])
        .unwrap_err();
    assert_eq!(engine.render(&rejection).message_text, "Duplicate identifier 'a'.");
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_options_from_json() {
    let options: SolverOptions =
        serde_json::from_str(r#"{ "renameCollision": "unionValues" }"#).unwrap();
    let engine = Engine::with_options(options);
    assert_eq!(
        engine.options().rename_collision,
        RenameCollisionPolicy::UnionValues
    );
    assert_eq!(
        engine.options().max_mapped_keys,
        SolverOptions::default().max_mapped_keys
    );
}

#[test]
fn test_key_budget_is_an_engine_bound() {
    let mut engine = Engine::new();
    engine.set_options(SolverOptions {
        max_mapped_keys: 2,
        ..SolverOptions::default()
    });
    let source = sample(&engine);
    let rejection = engine.readonly(source, true).unwrap_err();
    assert!(rejection.is_resource_bound());
}

#[test]
fn test_tracing_init_is_idempotent() {
    // No-op unless TYREL_LOG or RUST_LOG is set.
    tyrel::tracing_config::init_tracing();
    tyrel::tracing_config::init_tracing();
    assert_eq!(Engine::new().equal(TypeId::STRING, TypeId::STRING), Ok(true));
}
