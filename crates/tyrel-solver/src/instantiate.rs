//! Generic type instantiation and substitution.
//!
//! Replaces type parameters (and `infer` placeholders bound by a pattern
//! match) with concrete types. Instantiation is where distribution happens:
//! a distributive conditional whose naked check parameter receives a union
//! is mapped over the members, `boolean` counts as `true | false` and
//! `never` distributes to `never`.
//!
//! The result is rebuilt through the normalising constructors but is not
//! evaluated; callers hand it to the evaluator.

use crate::db::TypeDatabase;
use crate::objects::ordered_properties;
use crate::type_queries::{collect_infer_params, distribution_members};
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::trace;
use tyrel_common::interner::Atom;

/// Maximum nesting the instantiator walks before giving up.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Mapping from type parameter names to their replacements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution {
            map: FxHashMap::default(),
        }
    }

    pub fn single(name: Atom, type_id: TypeId) -> Self {
        let mut subst = Self::new();
        subst.insert(name, type_id);
        subst
    }

    /// Pair parameters with arguments; missing arguments fall back to the
    /// parameter default, instantiated with the earlier arguments.
    pub fn from_args(
        interner: &dyn TypeDatabase,
        type_params: &[TypeParamInfo],
        type_args: &[TypeId],
    ) -> Self {
        let mut subst = Self::new();
        for (idx, param) in type_params.iter().enumerate() {
            let arg = match type_args.get(idx) {
                Some(&arg) => arg,
                None => match param.default {
                    Some(default) => instantiate_type(interner, default, &subst),
                    None => TypeId::UNKNOWN,
                },
            };
            subst.insert(param.name, arg);
        }
        subst
    }

    pub fn insert(&mut self, name: Atom, type_id: TypeId) {
        self.map.insert(name, type_id);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Atom, TypeId)> + '_ {
        self.map.iter().map(|(name, type_id)| (*name, *type_id))
    }
}

/// Instantiate `type_id` with `substitution`.
pub fn instantiate_type(
    interner: &dyn TypeDatabase,
    type_id: TypeId,
    substitution: &TypeSubstitution,
) -> TypeId {
    if substitution.is_empty() || type_id.is_intrinsic() {
        return type_id;
    }
    let mut instantiator = TypeInstantiator::new(interner, substitution);
    instantiator.instantiate(type_id)
}

struct TypeInstantiator<'a> {
    interner: &'a dyn TypeDatabase,
    substitution: &'a TypeSubstitution,
    /// Names bound by an inner scope (generic signature, mapped variable,
    /// `infer` declaration) that must not be replaced.
    shadowed: Vec<Atom>,
    cache: FxHashMap<TypeId, TypeId>,
    depth: u32,
}

impl<'a> TypeInstantiator<'a> {
    fn new(interner: &'a dyn TypeDatabase, substitution: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            interner,
            substitution,
            shadowed: Vec::new(),
            cache: FxHashMap::default(),
            depth: 0,
        }
    }

    fn lookup_param(&self, name: Atom) -> Option<TypeId> {
        if self.shadowed.contains(&name) {
            return None;
        }
        self.substitution.get(name)
    }

    fn instantiate(&mut self, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        // The cache is only valid for one shadowing scope.
        let cacheable = self.shadowed.is_empty();
        if cacheable && let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }
        if self.depth >= MAX_INSTANTIATION_DEPTH {
            trace!(type_id = type_id.0, "instantiation depth exceeded");
            return TypeId::ERROR;
        }

        self.depth += 1;
        let result = self.instantiate_key(type_id);
        self.depth -= 1;

        if cacheable {
            self.cache.insert(type_id, result);
        }
        result
    }

    fn instantiate_key(&mut self, type_id: TypeId) -> TypeId {
        let Some(key) = self.interner.lookup(type_id) else {
            return type_id;
        };
        let interner = self.interner;
        let is_infer = matches!(key, TypeData::Infer(_));

        match key {
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) => type_id,
            TypeData::TypeParameter(info) | TypeData::Infer(info) => {
                if let Some(replacement) = self.lookup_param(info.name) {
                    return replacement;
                }
                match info.constraint {
                    Some(constraint) => {
                        let new_constraint = self.instantiate(constraint);
                        if new_constraint == constraint {
                            return type_id;
                        }
                        let info = TypeParamInfo {
                            constraint: Some(new_constraint),
                            ..info
                        };
                        if is_infer {
                            interner.infer(info)
                        } else {
                            interner.type_param(info)
                        }
                    }
                    None => type_id,
                }
            }
            TypeData::Union(list_id) => {
                let members: Vec<TypeId> = interner
                    .type_list(list_id)
                    .iter()
                    .map(|&m| self.instantiate(m))
                    .collect();
                interner.union(members)
            }
            TypeData::Intersection(list_id) => {
                let members: Vec<TypeId> = interner
                    .type_list(list_id)
                    .iter()
                    .map(|&m| self.instantiate(m))
                    .collect();
                interner.intersection(members)
            }
            TypeData::Object(shape_id) => {
                let properties = ordered_properties(interner, shape_id)
                    .into_iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.instantiate(prop.type_id),
                        ..prop
                    })
                    .collect();
                interner.object(properties)
            }
            TypeData::Tuple(list_id) => {
                let elements = interner
                    .tuple_list(list_id)
                    .iter()
                    .map(|element| TupleElement {
                        type_id: self.instantiate(element.type_id),
                        ..element.clone()
                    })
                    .collect();
                interner.tuple(elements)
            }
            TypeData::Array(element) => {
                let element = self.instantiate(element);
                interner.array(element)
            }
            TypeData::Function(shape_id) => {
                let shape = interner.function_shape(shape_id);
                let mark = self.shadowed.len();
                self.shadowed
                    .extend(shape.type_params.iter().map(|param| param.name));
                let type_params = shape
                    .type_params
                    .iter()
                    .map(|param| TypeParamInfo {
                        name: param.name,
                        constraint: param.constraint.map(|c| self.instantiate(c)),
                        default: param.default.map(|d| self.instantiate(d)),
                    })
                    .collect();
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        type_id: self.instantiate(param.type_id),
                        ..param.clone()
                    })
                    .collect();
                let return_type = self.instantiate(shape.return_type);
                self.shadowed.truncate(mark);
                interner.function(FunctionShape {
                    type_params,
                    params,
                    return_type,
                })
            }
            TypeData::Conditional(cond_id) => {
                let cond = interner.conditional_type(cond_id);
                self.instantiate_conditional(&cond)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = interner.mapped_type(mapped_id);
                let constraint = self.instantiate(mapped.constraint);
                self.shadowed.push(mapped.type_param.name);
                let name_type = mapped.name_type.map(|n| self.instantiate(n));
                let template = self.instantiate(mapped.template);
                self.shadowed.pop();
                interner.mapped(MappedType {
                    type_param: mapped.type_param.clone(),
                    constraint,
                    name_type,
                    template,
                    readonly_modifier: mapped.readonly_modifier,
                    optional_modifier: mapped.optional_modifier,
                })
            }
            TypeData::KeyOf(operand) => {
                let operand = self.instantiate(operand);
                interner.keyof(operand)
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.instantiate(object);
                let index = self.instantiate(index);
                interner.index_access(object, index)
            }
            TypeData::TemplateLiteral(list_id) => {
                let spans = interner
                    .template_list(list_id)
                    .iter()
                    .map(|span| match span {
                        TemplateSpan::Text(text) => TemplateSpan::Text(*text),
                        TemplateSpan::Type(inner) => TemplateSpan::Type(self.instantiate(*inner)),
                    })
                    .collect();
                interner.template_literal(spans)
            }
            TypeData::StringIntrinsic { kind, type_arg } => {
                let type_arg = self.instantiate(type_arg);
                interner.string_intrinsic(kind, type_arg)
            }
            TypeData::Application(app_id) => {
                let app = interner.type_application(app_id);
                let args = app.args.iter().map(|&arg| self.instantiate(arg)).collect();
                interner.application(app.base, args)
            }
        }
    }

    fn instantiate_conditional(&mut self, cond: &ConditionalType) -> TypeId {
        let interner = self.interner;

        if cond.is_distributive
            && let Some(TypeData::TypeParameter(info)) = interner.lookup(cond.check_type)
            && let Some(arg) = self.lookup_param(info.name)
            && let Some(members) = distribution_members(interner, arg)
        {
            trace!(
                members = members.len(),
                "distributing conditional over instantiated union"
            );
            let mut results = Vec::with_capacity(members.len());
            for member in members {
                let mut narrowed = self.substitution.clone();
                narrowed.insert(info.name, member);
                let mut inner = TypeInstantiator::new(interner, &narrowed);
                inner.shadowed = self.shadowed.clone();
                inner.depth = self.depth;
                results.push(inner.instantiate_conditional(cond));
            }
            return interner.union(results);
        }

        let check_type = self.instantiate(cond.check_type);
        // `infer` declarations scope over the pattern and the true branch.
        let mark = self.shadowed.len();
        self.shadowed.extend(
            collect_infer_params(interner, cond.extends_type)
                .into_iter()
                .map(|param| param.name),
        );
        let extends_type = self.instantiate(cond.extends_type);
        let true_type = self.instantiate(cond.true_type);
        self.shadowed.truncate(mark);
        let false_type = self.instantiate(cond.false_type);

        interner.conditional(ConditionalType {
            check_type,
            extends_type,
            true_type,
            false_type,
            is_distributive: cond.is_distributive,
        })
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
