//! Mapped type evaluation.
//!
//! Handles `{ [K in C as N]: T }`, including homomorphic mapped types that
//! preserve the source's modifiers and attribute order.

use crate::def::TypeResolver;
use crate::diagnostics::Rejection;
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::objects::{merge_properties, record_properties};
use crate::options::RenameCollisionPolicy;
use crate::type_queries::{contains_type_parameters, literal_key_atom, type_param_info, union_members};
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tyrel_common::interner::Atom;

/// Where a result attribute came from, for collision reporting.
struct KeyOrigin {
    position: usize,
    source_key: TypeId,
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate a mapped type.
    ///
    /// Every key of the constraint must be a string or numeric literal.
    /// A name type that evaluates to `never` drops the key; a union renames
    /// it to several keys. Modifiers start from the source attribute when the
    /// mapped type is homomorphic, then `+`/`-` modifiers apply.
    pub(crate) fn evaluate_mapped(&mut self, type_id: TypeId, mapped: &MappedType) -> TypeId {
        let interner = self.interner();
        let constraint = self.evaluate(mapped.constraint);
        if constraint == TypeId::ERROR {
            return TypeId::ERROR;
        }
        if contains_type_parameters(interner, constraint) {
            trace!(type_id = type_id.0, "mapped type deferred on free type parameter");
            return interner.mapped(MappedType {
                constraint,
                ..mapped.clone()
            });
        }

        let source_props = self
            .homomorphic_source(mapped)
            .and_then(|source| self.source_properties(source))
            .unwrap_or_default();

        let key_types = match constraint {
            TypeId::NEVER => Vec::new(),
            _ => union_members(interner, constraint).unwrap_or_else(|| vec![constraint]),
        };
        if key_types.len() > self.options().max_mapped_keys {
            debug!(keys = key_types.len(), "mapped type has too many keys");
            self.reject(Rejection::DepthExceeded { type_id });
            return TypeId::ERROR;
        }

        let mut keys: Vec<(Atom, TypeId)> = Vec::with_capacity(key_types.len());
        for key_type in key_types {
            let Some(name) = literal_key_atom(interner, key_type) else {
                self.reject(Rejection::NonLiteralKey { key: key_type });
                return TypeId::ERROR;
            };
            keys.push((name, key_type));
        }
        if !source_props.is_empty() {
            keys.sort_by_key(|(name, _)| {
                source_props
                    .iter()
                    .position(|prop| prop.name == *name)
                    .unwrap_or(usize::MAX)
            });
        }

        let policy = self.options().rename_collision;
        let mut properties: Vec<PropertyInfo> = Vec::with_capacity(keys.len());
        let mut origins: FxHashMap<Atom, KeyOrigin> = FxHashMap::default();
        for (name, key_type) in keys {
            let substitution = TypeSubstitution::single(mapped.type_param.name, key_type);

            let output_names = match mapped.name_type {
                None => vec![key_type],
                Some(name_type) => {
                    let renamed = instantiate_type(interner, name_type, &substitution);
                    match self.evaluate(renamed) {
                        TypeId::NEVER => continue,
                        renamed => union_members(interner, renamed).unwrap_or_else(|| vec![renamed]),
                    }
                }
            };

            let template = instantiate_type(interner, mapped.template, &substitution);
            let value = self.evaluate(template);

            let source_prop = source_props.iter().find(|prop| prop.name == name);
            let readonly = apply_modifier(
                source_prop.is_some_and(|prop| prop.readonly),
                mapped.readonly_modifier,
            );
            let optional = apply_modifier(
                source_prop.is_some_and(|prop| prop.optional),
                mapped.optional_modifier,
            );

            for output_name in output_names {
                let Some(output) = literal_key_atom(interner, output_name) else {
                    self.reject(Rejection::NonLiteralKey { key: output_name });
                    return TypeId::ERROR;
                };
                if let Some(origin) = origins.get(&output) {
                    match policy {
                        RenameCollisionPolicy::Reject => {
                            self.reject(Rejection::KeyCollision {
                                key: output,
                                first: origin.source_key,
                                second: key_type,
                            });
                            return TypeId::ERROR;
                        }
                        RenameCollisionPolicy::UnionValues => {
                            let existing = &mut properties[origin.position];
                            existing.type_id = interner.union2(existing.type_id, value);
                            existing.readonly |= readonly;
                            existing.optional &= optional;
                        }
                    }
                    continue;
                }
                origins.insert(
                    output,
                    KeyOrigin {
                        position: properties.len(),
                        source_key: key_type,
                    },
                );
                properties.push(PropertyInfo {
                    name: output,
                    type_id: value,
                    readonly,
                    optional,
                });
            }
        }

        interner.object(properties)
    }

    /// The record a mapped type is homomorphic over: `[K in keyof S]` or a
    /// template of the form `S[K]`.
    fn homomorphic_source(&mut self, mapped: &MappedType) -> Option<TypeId> {
        let interner = self.interner();
        if let Some(TypeData::KeyOf(source)) = interner.lookup(mapped.constraint) {
            return Some(self.evaluate(source));
        }
        match interner.lookup(mapped.template) {
            Some(TypeData::IndexAccess(source, index))
                if type_param_info(interner, index)
                    .is_some_and(|info| info.name == mapped.type_param.name) =>
            {
                Some(self.evaluate(source))
            }
            _ => None,
        }
    }

    fn source_properties(&mut self, source: TypeId) -> Option<Vec<PropertyInfo>> {
        let interner = self.interner();
        match interner.lookup(source)? {
            TypeData::Object(_) => record_properties(interner, source),
            TypeData::Intersection(list_id) => {
                let members = interner.type_list(list_id);
                let lists = members
                    .iter()
                    .map(|&member| record_properties(interner, member))
                    .collect::<Option<Vec<_>>>()?;
                Some(merge_properties(interner, &lists))
            }
            _ => None,
        }
    }
}

fn apply_modifier(inherited: bool, modifier: Option<MappedModifier>) -> bool {
    match modifier {
        Some(MappedModifier::Add) => true,
        Some(MappedModifier::Remove) => false,
        None => inherited,
    }
}
