//! Canonical forms for identity comparison.
//!
//! Interning already shares structurally identical nodes. Canonicalisation
//! additionally rebuilds an expression bottom-up through the normalising
//! constructors and erases what never affects identity, so two equivalent
//! expressions end up at the same `TypeId`. Parameter names of function
//! types are dropped, and the type parameters of a generic signature are
//! renamed by position: `<T>(x: T) => T` and `<U>(y: U) => U` share a
//! canonical form.
//!
//! [`CanonicalForm::merge_intersections`] is the `Alike` normalisation: an
//! intersection of records becomes a single record.

use crate::db::TypeDatabase;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::objects::{merge_record_members, ordered_properties};
use crate::types::*;
use rustc_hash::FxHashMap;

const MAX_CANONICALIZE_DEPTH: u32 = 64;

/// Prefix of positional type parameter names.
const BINDER_PREFIX: &str = "^T";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalForm {
    /// Merge intersections of records into one record, at every level.
    pub merge_intersections: bool,
}

pub fn canonicalize(db: &dyn TypeDatabase, type_id: TypeId) -> TypeId {
    canonicalize_with(db, type_id, CanonicalForm::default())
}

pub fn canonicalize_with(db: &dyn TypeDatabase, type_id: TypeId, form: CanonicalForm) -> TypeId {
    let mut canonicalizer = Canonicalizer {
        db,
        form,
        memo: FxHashMap::default(),
        depth: 0,
        binders: 0,
    };
    canonicalizer.canonicalize(type_id)
}

struct Canonicalizer<'a> {
    db: &'a dyn TypeDatabase,
    form: CanonicalForm,
    memo: FxHashMap<(TypeId, u32), TypeId>,
    depth: u32,
    /// Generic signatures enclosing the current node.
    binders: u32,
}

impl Canonicalizer<'_> {
    fn canonicalize(&mut self, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        if let Some(&done) = self.memo.get(&(type_id, self.binders)) {
            return done;
        }
        if self.depth >= MAX_CANONICALIZE_DEPTH {
            return type_id;
        }
        self.depth += 1;
        let result = self.rebuild(type_id);
        self.depth -= 1;
        self.memo.insert((type_id, self.binders), result);
        result
    }

    fn rebuild(&mut self, type_id: TypeId) -> TypeId {
        let db = self.db;
        let Some(key) = db.lookup(type_id) else {
            return type_id;
        };
        match key {
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::Lazy(_)
            | TypeData::TypeParameter(_)
            | TypeData::Infer(_) => type_id,
            TypeData::Object(shape_id) => {
                let properties = ordered_properties(db, shape_id)
                    .into_iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.canonicalize(prop.type_id),
                        ..prop
                    })
                    .collect();
                db.object(properties)
            }
            TypeData::Union(list_id) => {
                let members = self.canonicalize_list(&db.type_list(list_id));
                db.union(members)
            }
            TypeData::Intersection(list_id) => {
                let members = self.canonicalize_list(&db.type_list(list_id));
                if self.form.merge_intersections
                    && let Some(merged) = merge_record_members(db, &members)
                {
                    // Merged attribute types may be intersections of records themselves.
                    return self.canonicalize(merged);
                }
                db.intersection(members)
            }
            TypeData::Tuple(list_id) => {
                let elements = db
                    .tuple_list(list_id)
                    .iter()
                    .map(|element| TupleElement {
                        type_id: self.canonicalize(element.type_id),
                        ..element.clone()
                    })
                    .collect();
                db.tuple(elements)
            }
            TypeData::Array(element) => {
                let element = self.canonicalize(element);
                db.array(element)
            }
            TypeData::Function(shape_id) => {
                let shape = db.function_shape(shape_id);
                let (type_params, substitution) = self.rename_binders(&shape.type_params);
                if !type_params.is_empty() {
                    self.binders += 1;
                }
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        name: None,
                        type_id: self.canonicalize(instantiate_type(db, param.type_id, &substitution)),
                        optional: param.optional,
                        rest: param.rest,
                    })
                    .collect();
                let return_type =
                    self.canonicalize(instantiate_type(db, shape.return_type, &substitution));
                if !type_params.is_empty() {
                    self.binders -= 1;
                }
                db.function(FunctionShape {
                    type_params,
                    params,
                    return_type,
                })
            }
            TypeData::Conditional(cond_id) => {
                let cond = db.conditional_type(cond_id);
                db.conditional(ConditionalType {
                    check_type: self.canonicalize(cond.check_type),
                    extends_type: self.canonicalize(cond.extends_type),
                    true_type: self.canonicalize(cond.true_type),
                    false_type: self.canonicalize(cond.false_type),
                    is_distributive: cond.is_distributive,
                })
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = db.mapped_type(mapped_id);
                db.mapped(MappedType {
                    type_param: mapped.type_param.clone(),
                    constraint: self.canonicalize(mapped.constraint),
                    name_type: mapped.name_type.map(|n| self.canonicalize(n)),
                    template: self.canonicalize(mapped.template),
                    readonly_modifier: mapped.readonly_modifier,
                    optional_modifier: mapped.optional_modifier,
                })
            }
            TypeData::KeyOf(operand) => {
                let operand = self.canonicalize(operand);
                db.keyof(operand)
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.canonicalize(object);
                let index = self.canonicalize(index);
                db.index_access(object, index)
            }
            TypeData::TemplateLiteral(list_id) => {
                let spans = db
                    .template_list(list_id)
                    .iter()
                    .map(|span| match *span {
                        TemplateSpan::Type(inner) => TemplateSpan::Type(self.canonicalize(inner)),
                        text => text,
                    })
                    .collect();
                db.template_literal(spans)
            }
            TypeData::StringIntrinsic { kind, type_arg } => {
                let type_arg = self.canonicalize(type_arg);
                db.string_intrinsic(kind, type_arg)
            }
            TypeData::Application(app_id) => {
                let app = db.type_application(app_id);
                let args = self.canonicalize_list(&app.args);
                db.application(app.base, args)
            }
        }
    }

    /// Positional names for a signature's type parameters, and the
    /// substitution from the declared names to them.
    fn rename_binders(
        &mut self,
        type_params: &[TypeParamInfo],
    ) -> (Vec<TypeParamInfo>, TypeSubstitution) {
        let db = self.db;
        let mut substitution = TypeSubstitution::new();
        let mut renamed = Vec::with_capacity(type_params.len());
        for (index, param) in type_params.iter().enumerate() {
            let name = db.intern_string(&format!("{BINDER_PREFIX}{}_{index}", self.binders));
            // Constraints and defaults may mention earlier parameters.
            let info = TypeParamInfo {
                name,
                constraint: param
                    .constraint
                    .map(|c| self.canonicalize(instantiate_type(db, c, &substitution))),
                default: param
                    .default
                    .map(|d| self.canonicalize(instantiate_type(db, d, &substitution))),
            };
            substitution.insert(param.name, db.type_param(info.clone()));
            renamed.push(info);
        }
        (renamed, substitution)
    }

    fn canonicalize_list(&mut self, members: &[TypeId]) -> Vec<TypeId> {
        members.iter().map(|&member| self.canonicalize(member)).collect()
    }
}
