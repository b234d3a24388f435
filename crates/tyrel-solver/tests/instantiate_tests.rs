use super::*;
use crate::TypeInterner;
use crate::instantiate::MAX_INSTANTIATION_DEPTH;

fn param(interner: &TypeInterner, name: &str) -> TypeParamInfo {
    TypeParamInfo::new(interner.intern_string(name))
}

#[test]
fn test_substitution_basic() {
    let interner = TypeInterner::new();
    let t_name = interner.intern_string("T");
    let u_name = interner.intern_string("U");

    let mut subst = TypeSubstitution::new();
    assert!(subst.is_empty());

    subst.insert(t_name, TypeId::STRING);
    assert_eq!(subst.get(t_name), Some(TypeId::STRING));
    assert_eq!(subst.get(u_name), None);
    assert_eq!(subst.len(), 1);
}

#[test]
fn test_substitution_from_args_fills_defaults() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let u = TypeParamInfo {
        // U = T[]
        default: Some(interner.array(interner.type_param(t.clone()))),
        ..param(&interner, "U")
    };
    let v = param(&interner, "V");

    let subst = TypeSubstitution::from_args(&interner, &[t.clone(), u.clone(), v.clone()], &[TypeId::STRING]);
    assert_eq!(subst.get(t.name), Some(TypeId::STRING));
    assert_eq!(subst.get(u.name), Some(interner.array(TypeId::STRING)));
    assert_eq!(subst.get(v.name), Some(TypeId::UNKNOWN));
}

#[test]
fn test_instantiate_structural_types() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let t_type = interner.type_param(t.clone());
    let x = interner.intern_string("x");

    let record = interner.object(vec![PropertyInfo::new(x, interner.array(t_type)).readonly()]);
    let subst = TypeSubstitution::single(t.name, TypeId::NUMBER);
    let result = instantiate_type(&interner, record, &subst);

    let expected = interner.object(vec![
        PropertyInfo::new(x, interner.array(TypeId::NUMBER)).readonly(),
    ]);
    assert_eq!(result, expected);
}

#[test]
fn test_instantiate_empty_substitution_is_identity() {
    let interner = TypeInterner::new();
    let t_type = interner.type_param(param(&interner, "T"));
    let subst = TypeSubstitution::new();
    assert_eq!(instantiate_type(&interner, t_type, &subst), t_type);
}

#[test]
fn test_function_type_params_shadow() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let t_type = interner.type_param(t.clone());
    // <T>(x: T) => T keeps its own T.
    let generic = interner.function(FunctionShape {
        type_params: vec![t.clone()],
        params: vec![ParamInfo::unnamed(t_type)],
        return_type: t_type,
    });
    let subst = TypeSubstitution::single(t.name, TypeId::STRING);
    assert_eq!(instantiate_type(&interner, generic, &subst), generic);
}

#[test]
fn test_mapped_variable_shadows() {
    let interner = TypeInterner::new();
    let k = param(&interner, "K");
    let k_type = interner.type_param(k.clone());
    let mapped = interner.mapped(MappedType {
        type_param: k.clone(),
        constraint: k_type,
        name_type: None,
        template: k_type,
        readonly_modifier: None,
        optional_modifier: None,
    });
    let a = interner.literal_string("a");
    let result = instantiate_type(&interner, mapped, &TypeSubstitution::single(k.name, a));

    // The constraint is outside the binder; the template is inside it.
    let expected = interner.mapped(MappedType {
        type_param: k,
        constraint: a,
        name_type: None,
        template: k_type,
        readonly_modifier: None,
        optional_modifier: None,
    });
    assert_eq!(result, expected);
}

#[test]
fn test_distributive_conditional_maps_over_union() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let t_type = interner.type_param(t.clone());
    let cond = interner.conditional(ConditionalType {
        check_type: t_type,
        extends_type: TypeId::STRING,
        true_type: interner.array(t_type),
        false_type: TypeId::NEVER,
        is_distributive: true,
    });

    let arg = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let result = instantiate_type(&interner, cond, &TypeSubstitution::single(t.name, arg));
    let Some(TypeData::Union(list_id)) = interner.lookup(result) else {
        panic!("expected one conditional per member");
    };
    assert_eq!(interner.type_list(list_id).len(), 2);
}

#[test]
fn test_distribution_over_never_is_never() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let t_type = interner.type_param(t.clone());
    let cond = interner.conditional(ConditionalType {
        check_type: t_type,
        extends_type: TypeId::STRING,
        true_type: TypeId::BOOLEAN_TRUE,
        false_type: TypeId::BOOLEAN_FALSE,
        is_distributive: true,
    });
    let result = instantiate_type(&interner, cond, &TypeSubstitution::single(t.name, TypeId::NEVER));
    assert_eq!(result, TypeId::NEVER);
}

#[test]
fn test_non_distributive_conditional_keeps_union() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let t_type = interner.type_param(t.clone());
    let cond = interner.conditional(ConditionalType {
        check_type: t_type,
        extends_type: TypeId::STRING,
        true_type: TypeId::BOOLEAN_TRUE,
        false_type: TypeId::BOOLEAN_FALSE,
        is_distributive: false,
    });
    let arg = interner.union(vec![TypeId::STRING, TypeId::NUMBER]);
    let result = instantiate_type(&interner, cond, &TypeSubstitution::single(t.name, arg));
    assert!(matches!(interner.lookup(result), Some(TypeData::Conditional(_))));
}

#[test]
fn test_infer_names_are_not_substituted_in_true_branch() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let r = param(&interner, "R");
    let t_type = interner.type_param(t.clone());
    let r_type = interner.type_param(r.clone());
    // T extends (infer R)[] ? R : never, with an outer R in scope
    let cond = interner.conditional(ConditionalType {
        check_type: t_type,
        extends_type: interner.array(interner.infer(r.clone())),
        true_type: r_type,
        false_type: r_type,
        is_distributive: false,
    });
    let mut subst = TypeSubstitution::single(t.name, TypeId::STRING);
    subst.insert(r.name, TypeId::NUMBER);
    let result = instantiate_type(&interner, cond, &subst);

    let Some(TypeData::Conditional(cond_id)) = interner.lookup(result) else {
        panic!("expected a conditional");
    };
    let cond = interner.conditional_type(cond_id);
    assert_eq!(cond.check_type, TypeId::STRING);
    assert_eq!(cond.true_type, r_type);
    assert_eq!(cond.false_type, TypeId::NUMBER);
}

#[test]
fn test_instantiation_depth_is_bounded() {
    let interner = TypeInterner::new();
    let t = param(&interner, "T");
    let mut nested = interner.type_param(t.clone());
    for _ in 0..(MAX_INSTANTIATION_DEPTH + 5) {
        nested = interner.array(nested);
    }
    let result = instantiate_type(&interner, nested, &TypeSubstitution::single(t.name, TypeId::STRING));
    assert_ne!(result, nested);
}
