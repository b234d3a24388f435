//! Structural queries over interned types.
//!
//! Small read-only helpers shared by the evaluator, the subtype checker and
//! the transformation primitives.

use crate::db::TypeDatabase;
use crate::types::*;
use rustc_hash::FxHashSet;
use tyrel_common::interner::Atom;

const MAX_QUERY_DEPTH: usize = 64;

// =============================================================================
// Type Content Queries
// =============================================================================

/// Check if a type mentions a type parameter that is not bound inside it.
///
/// Parameters introduced by a generic function signature or by the
/// iteration variable of a mapped type are bound within their scope.
pub fn contains_type_parameters(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    contains_type_matching_impl(db, type_id, |key, bound| match key {
        TypeData::TypeParameter(info) => !bound.contains(&info.name),
        _ => false,
    })
}

/// Check if a type contains any `infer` placeholders.
pub fn contains_infer_types(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    contains_type_matching_impl(db, type_id, |key, _| matches!(key, TypeData::Infer(_)))
}

/// Check if a type contains a conditional, mapped or other meta-type node
/// that evaluation could still reduce.
pub fn contains_meta_types(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    contains_type_matching_impl(db, type_id, |key, _| {
        matches!(
            key,
            TypeData::Conditional(_)
                | TypeData::Mapped(_)
                | TypeData::KeyOf(_)
                | TypeData::IndexAccess(_, _)
                | TypeData::StringIntrinsic { .. }
                | TypeData::Lazy(_)
                | TypeData::Application(_)
        )
    })
}

/// Every `infer` placeholder declared in a pattern, first occurrence wins.
pub fn collect_infer_params(db: &dyn TypeDatabase, pattern: TypeId) -> Vec<TypeParamInfo> {
    let mut found = Vec::new();
    let mut seen = FxHashSet::default();
    collect_infer_params_into(db, pattern, &mut found, &mut seen, 0);
    found
}

fn collect_infer_params_into(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    found: &mut Vec<TypeParamInfo>,
    seen: &mut FxHashSet<TypeId>,
    depth: usize,
) {
    if depth >= MAX_QUERY_DEPTH || !seen.insert(type_id) {
        return;
    }
    let Some(key) = db.lookup(type_id) else {
        return;
    };
    if let TypeData::Infer(info) = &key {
        if !found.iter().any(|p: &TypeParamInfo| p.name == info.name) {
            found.push(info.clone());
        }
        return;
    }
    for_each_child(db, &key, |child| {
        collect_infer_params_into(db, child, found, seen, depth + 1)
    });
}

/// Call `f` on every direct child of a type node.
pub fn for_each_child(db: &dyn TypeDatabase, key: &TypeData, mut f: impl FnMut(TypeId)) {
    match key {
        TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) => {}
        TypeData::Object(shape_id) => {
            for prop in db.object_shape(*shape_id).properties.iter() {
                f(prop.type_id);
            }
        }
        TypeData::Union(list_id) | TypeData::Intersection(list_id) => {
            for &member in db.type_list(*list_id).iter() {
                f(member);
            }
        }
        TypeData::Tuple(list_id) => {
            for element in db.tuple_list(*list_id).iter() {
                f(element.type_id);
            }
        }
        TypeData::Array(element) => f(*element),
        TypeData::Function(shape_id) => {
            let shape = db.function_shape(*shape_id);
            for param in &shape.params {
                f(param.type_id);
            }
            f(shape.return_type);
        }
        TypeData::TypeParameter(info) | TypeData::Infer(info) => {
            if let Some(constraint) = info.constraint {
                f(constraint);
            }
        }
        TypeData::Conditional(cond_id) => {
            let cond = db.conditional_type(*cond_id);
            f(cond.check_type);
            f(cond.extends_type);
            f(cond.true_type);
            f(cond.false_type);
        }
        TypeData::Mapped(mapped_id) => {
            let mapped = db.mapped_type(*mapped_id);
            f(mapped.constraint);
            if let Some(name_type) = mapped.name_type {
                f(name_type);
            }
            f(mapped.template);
        }
        TypeData::KeyOf(operand) => f(*operand),
        TypeData::IndexAccess(object, index) => {
            f(*object);
            f(*index);
        }
        TypeData::TemplateLiteral(list_id) => {
            for span in db.template_list(*list_id).iter() {
                if let TemplateSpan::Type(type_id) = span {
                    f(*type_id);
                }
            }
        }
        TypeData::StringIntrinsic { type_arg, .. } => f(*type_arg),
        TypeData::Application(app_id) => {
            let app = db.type_application(*app_id);
            f(app.base);
            for &arg in &app.args {
                f(arg);
            }
        }
    }
}

fn contains_type_matching_impl<F>(db: &dyn TypeDatabase, type_id: TypeId, predicate: F) -> bool
where
    F: Fn(&TypeData, &[Atom]) -> bool + Copy,
{
    let mut checker = ContainsTypeChecker {
        db,
        predicate,
        bound: Vec::new(),
        visiting: FxHashSet::default(),
        current_depth: 0,
    };
    checker.check(type_id)
}

struct ContainsTypeChecker<'a, F>
where
    F: Fn(&TypeData, &[Atom]) -> bool,
{
    db: &'a dyn TypeDatabase,
    predicate: F,
    bound: Vec<Atom>,
    visiting: FxHashSet<TypeId>,
    current_depth: usize,
}

impl<F> ContainsTypeChecker<'_, F>
where
    F: Fn(&TypeData, &[Atom]) -> bool,
{
    fn check(&mut self, type_id: TypeId) -> bool {
        if type_id.is_intrinsic() || self.current_depth >= MAX_QUERY_DEPTH {
            return false;
        }
        if self.visiting.contains(&type_id) {
            return false;
        }
        let Some(key) = self.db.lookup(type_id) else {
            return false;
        };
        if (self.predicate)(&key, &self.bound) {
            return true;
        }

        self.visiting.insert(type_id);
        self.current_depth += 1;
        let result = self.check_key(&key);
        self.current_depth -= 1;
        self.visiting.remove(&type_id);
        result
    }

    fn check_key(&mut self, key: &TypeData) -> bool {
        match key {
            TypeData::Function(shape_id) => {
                let shape = self.db.function_shape(*shape_id);
                let mark = self.bound.len();
                self.bound.extend(shape.type_params.iter().map(|p| p.name));
                let result = shape.params.iter().any(|p| self.check(p.type_id))
                    || self.check(shape.return_type);
                self.bound.truncate(mark);
                result
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.db.mapped_type(*mapped_id);
                if self.check(mapped.constraint) {
                    return true;
                }
                self.bound.push(mapped.type_param.name);
                let result =
                    mapped.name_type.is_some_and(|n| self.check(n)) || self.check(mapped.template);
                self.bound.pop();
                result
            }
            _ => {
                let mut children = Vec::new();
                for_each_child(self.db, key, |child| children.push(child));
                children.into_iter().any(|child| self.check(child))
            }
        }
    }
}

// =============================================================================
// Shape Accessors
// =============================================================================

pub fn object_shape_id(db: &dyn TypeDatabase, type_id: TypeId) -> Option<ObjectShapeId> {
    match db.lookup(type_id) {
        Some(TypeData::Object(shape_id)) => Some(shape_id),
        _ => None,
    }
}

pub fn is_object_type(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    object_shape_id(db, type_id).is_some()
}

pub fn union_members(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Vec<TypeId>> {
    match db.lookup(type_id) {
        Some(TypeData::Union(list_id)) => Some(db.type_list(list_id).to_vec()),
        _ => None,
    }
}

/// Members a distributive conditional maps over: union members, `true` and
/// `false` for `boolean`, nothing for `never`.
pub fn distribution_members(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Vec<TypeId>> {
    match type_id {
        TypeId::NEVER => Some(Vec::new()),
        TypeId::BOOLEAN => Some(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE]),
        _ => union_members(db, type_id),
    }
}

pub fn type_param_info(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TypeParamInfo> {
    match db.lookup(type_id) {
        Some(TypeData::TypeParameter(info)) => Some(info),
        _ => None,
    }
}

/// Attribute name denoted by a string or numeric literal key type.
pub fn literal_key_atom(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Atom> {
    match db.lookup(type_id)? {
        TypeData::Literal(LiteralValue::String(atom)) => Some(atom),
        TypeData::Literal(LiteralValue::Number(_)) => {
            db.literal_text(type_id).map(|text| db.intern_string(&text))
        }
        _ => None,
    }
}

pub fn string_literal_value(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Atom> {
    match db.lookup(type_id)? {
        TypeData::Literal(LiteralValue::String(atom)) => Some(atom),
        _ => None,
    }
}
