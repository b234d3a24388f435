use super::*;

#[test]
fn test_interner_intrinsics() {
    let interner = TypeInterner::new();
    assert!(interner.is_empty());
    assert_eq!(
        interner.lookup(TypeId::STRING),
        Some(TypeData::Intrinsic(IntrinsicKind::String))
    );
    assert_eq!(
        interner.lookup(TypeId::BOOLEAN_TRUE),
        Some(TypeData::Literal(LiteralValue::Boolean(true)))
    );
    assert_eq!(interner.intern(TypeData::Intrinsic(IntrinsicKind::Never)), TypeId::NEVER);
    assert_eq!(interner.literal_boolean(false), TypeId::BOOLEAN_FALSE);
}

#[test]
fn test_interner_deduplication() {
    let interner = TypeInterner::new();
    let first = interner.literal_string("hello");
    let second = interner.literal_string("hello");
    let other = interner.literal_string("world");
    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_union_normalization() {
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let b = interner.literal_string("b");

    assert_eq!(interner.union(vec![]), TypeId::NEVER);
    assert_eq!(interner.union(vec![a]), a);
    assert_eq!(interner.union(vec![a, TypeId::NEVER]), a);
    assert_eq!(interner.union(vec![a, b]), interner.union(vec![b, a]));
    assert_eq!(interner.union(vec![a, a, b]), interner.union(vec![a, b]));

    let nested = interner.union(vec![interner.union(vec![a, b]), TypeId::NUMBER]);
    let flat = interner.union(vec![a, b, TypeId::NUMBER]);
    assert_eq!(nested, flat);
}

#[test]
fn test_union_absorption() {
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let one = interner.literal_number(1.0);

    assert_eq!(interner.union(vec![a, TypeId::STRING]), TypeId::STRING);
    assert_eq!(interner.union(vec![one, TypeId::NUMBER]), TypeId::NUMBER);
    assert_eq!(interner.union(vec![a, TypeId::ANY]), TypeId::ANY);
    assert_eq!(interner.union(vec![a, TypeId::UNKNOWN]), TypeId::UNKNOWN);
    assert_eq!(
        interner.union(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE]),
        TypeId::BOOLEAN
    );
    assert_eq!(
        interner.union(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN]),
        TypeId::BOOLEAN
    );
}

#[test]
fn test_intersection_normalization() {
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let x = interner.intern_string("x");
    let record = interner.object(vec![PropertyInfo::new(x, TypeId::NUMBER)]);

    assert_eq!(interner.intersection(vec![]), TypeId::UNKNOWN);
    assert_eq!(interner.intersection2(record, TypeId::UNKNOWN), record);
    assert_eq!(interner.intersection2(record, TypeId::NEVER), TypeId::NEVER);
    assert_eq!(interner.intersection2(record, TypeId::ANY), TypeId::ANY);
    assert_eq!(interner.intersection2(a, TypeId::STRING), a);
    assert_eq!(interner.intersection2(TypeId::STRING, TypeId::NUMBER), TypeId::NEVER);
    assert_eq!(
        interner.intersection2(a, interner.literal_string("b")),
        TypeId::NEVER
    );
    assert_eq!(interner.intersection2(TypeId::STRING, TypeId::OBJECT), TypeId::NEVER);
}

#[test]
fn test_intersection_distributes_over_union() {
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let one = interner.literal_number(1.0);
    // ("a" | 1) & string  =>  "a"
    let mixed = interner.union(vec![a, one]);
    assert_eq!(interner.intersection2(mixed, TypeId::STRING), a);
}

#[test]
fn test_object_attribute_order_is_not_identity() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let ab = interner.object(vec![
        PropertyInfo::new(a, TypeId::NUMBER),
        PropertyInfo::new(b, TypeId::STRING),
    ]);
    let ba = interner.object(vec![
        PropertyInfo::new(b, TypeId::STRING),
        PropertyInfo::new(a, TypeId::NUMBER),
    ]);
    assert_eq!(ab, ba);

    // The first declaration fixes the display order.
    let Some(TypeData::Object(shape_id)) = interner.lookup(ab) else {
        panic!("expected a record");
    };
    let order = interner.display_order(shape_id).expect("order recorded");
    assert_eq!(order.as_ref(), &[a, b]);
}

#[test]
fn test_object_modifiers_are_identity() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let plain = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let readonly = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER).readonly()]);
    let optional = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER).optional()]);
    assert_ne!(plain, readonly);
    assert_ne!(plain, optional);
    assert_ne!(readonly, optional);
}

#[test]
fn test_template_literal_normalization() {
    let interner = TypeInterner::new();
    let text = |s: &str| TemplateSpan::Text(interner.intern_string(s));

    let all_text = interner.template_literal(vec![text("get"), text("Name")]);
    assert_eq!(all_text, interner.literal_string("getName"));

    let inlined = interner.template_literal(vec![
        text("id_"),
        TemplateSpan::Type(interner.literal_number(7.0)),
    ]);
    assert_eq!(inlined, interner.literal_string("id_7"));

    let with_hole = interner.template_literal(vec![text("a"), TemplateSpan::Type(TypeId::STRING)]);
    assert!(matches!(
        interner.lookup(with_hole),
        Some(TypeData::TemplateLiteral(_))
    ));

    let never = interner.template_literal(vec![text("a"), TemplateSpan::Type(TypeId::NEVER)]);
    assert_eq!(never, TypeId::NEVER);
}

#[test]
fn test_literal_text() {
    let interner = TypeInterner::new();
    assert_eq!(interner.literal_text(interner.literal_number(42.0)).as_deref(), Some("42"));
    assert_eq!(interner.literal_text(interner.literal_number(1.5)).as_deref(), Some("1.5"));
    assert_eq!(interner.literal_text(TypeId::BOOLEAN_TRUE).as_deref(), Some("true"));
    assert_eq!(interner.literal_text(TypeId::NULL).as_deref(), Some("null"));
    assert_eq!(interner.literal_text(TypeId::STRING), None);
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(0.0), "0");
    assert_eq!(format_number(-3.0), "-3");
    assert_eq!(format_number(2.5), "2.5");
}

#[test]
fn test_concurrent_interning_agrees() {
    use std::sync::Arc;

    let interner = Arc::new(TypeInterner::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = Arc::clone(&interner);
            std::thread::spawn(move || {
                let x = interner.intern_string("x");
                let a = interner.literal_string("a");
                let b = interner.literal_string("b");
                interner.object(vec![PropertyInfo::new(x, interner.union(vec![a, b]))])
            })
        })
        .collect();
    let ids: Vec<TypeId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}
