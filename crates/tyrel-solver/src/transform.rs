//! Structural transformation primitives.
//!
//! Every primitive is key-set driven: it builds a mapped type over the
//! resulting key set and lets the evaluator produce the record. Selection
//! primitives (`pick`, `omit`, the keyed toggles) first check that the key
//! argument names only keys the source has.
//!
//! All entry points return `Err` with the first rejection recorded while
//! evaluating; a rejected transformation has no partial result.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::diagnostics::Rejection;
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::objects::{merge_record_members, override_properties, record_properties};
use crate::relations::Distribution;
use crate::type_queries::{is_object_type, union_members};
use crate::types::*;
use tracing::{debug, trace};

/// Flag toggled at every nesting level by [`TypeEvaluator::deep_transform`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeepRule {
    Readonly(bool),
    Optional(bool),
}

/// Per-key rule of [`TypeEvaluator::rename_filter`].
///
/// `name_type` computes the new key from the key parameter `key` and the
/// value parameter `value` (bound to `T[key]`); `never` drops the key and a
/// union produces several keys. `template`, when present, replaces the
/// attribute's value type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRemap {
    pub key: TypeParamInfo,
    pub value: TypeParamInfo,
    pub name_type: TypeId,
    pub template: Option<TypeId>,
}

impl KeyRemap {
    pub fn key_param(db: &dyn TypeDatabase) -> TypeParamInfo {
        TypeParamInfo::new(db.intern_string("K"))
    }

    pub fn value_param(db: &dyn TypeDatabase) -> TypeParamInfo {
        TypeParamInfo::new(db.intern_string("V"))
    }

    /// Remap computed by `name_type`, which may mention `K` and `V`.
    pub fn new(db: &dyn TypeDatabase, name_type: TypeId) -> Self {
        KeyRemap {
            key: Self::key_param(db),
            value: Self::value_param(db),
            name_type,
            template: None,
        }
    }

    pub fn with_template(mut self, template: TypeId) -> Self {
        self.template = Some(template);
        self
    }

    /// `K`
    pub fn identity(db: &dyn TypeDatabase) -> Self {
        let key = db.type_param(Self::key_param(db));
        Self::new(db, key)
    }

    /// `` `${prefix}${K}` ``
    pub fn prefix(db: &dyn TypeDatabase, prefix: &str) -> Self {
        let key = db.type_param(Self::key_param(db));
        let name_type = db.template_literal(vec![
            TemplateSpan::Text(db.intern_string(prefix)),
            TemplateSpan::Type(key),
        ]);
        Self::new(db, name_type)
    }

    /// `` K extends `${prefix}${infer R}` ? R : K ``
    pub fn strip_prefix(db: &dyn TypeDatabase, prefix: &str) -> Self {
        let key = db.type_param(Self::key_param(db));
        let rest = TypeParamInfo::new(db.intern_string("R"));
        let pattern = db.template_literal(vec![
            TemplateSpan::Text(db.intern_string(prefix)),
            TemplateSpan::Type(db.infer(rest.clone())),
        ]);
        let name_type = db.conditional(ConditionalType {
            check_type: key,
            extends_type: pattern,
            true_type: db.type_param(rest),
            false_type: key,
            is_distributive: true,
        });
        Self::new(db, name_type)
    }

    /// `` `get${Capitalize<string & K>}` ``; numeric keys are dropped.
    pub fn getter(db: &dyn TypeDatabase) -> Self {
        let key = db.type_param(Self::key_param(db));
        let capitalized =
            db.string_intrinsic(StringIntrinsicKind::Capitalize, db.intersection2(TypeId::STRING, key));
        let name_type = db.template_literal(vec![
            TemplateSpan::Text(db.intern_string("get")),
            TemplateSpan::Type(capitalized),
        ]);
        Self::new(db, name_type)
    }

    /// `V extends pattern ? K : never` when `keep`, the dual otherwise.
    pub fn by_value(db: &dyn TypeDatabase, pattern: TypeId, keep: bool) -> Self {
        let key = db.type_param(Self::key_param(db));
        let value = db.type_param(Self::value_param(db));
        let (true_type, false_type) = if keep {
            (key, TypeId::NEVER)
        } else {
            (TypeId::NEVER, key)
        };
        let name_type = db.conditional(ConditionalType {
            check_type: value,
            extends_type: pattern,
            true_type,
            false_type,
            is_distributive: false,
        });
        Self::new(db, name_type)
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    // =========================================================================
    // Key checks
    // =========================================================================

    /// Reject unless every member of `keys` is a key of `source`.
    fn require_keys_of(&mut self, source: TypeId, keys: TypeId) -> Result<TypeId, Rejection> {
        let interner = self.interner();
        let keys = self.evaluate(keys);
        let keyof = interner.keyof(source);
        let source_keys = self.evaluate(keyof);

        let members = match keys {
            TypeId::NEVER => Vec::new(),
            _ => union_members(interner, keys).unwrap_or_else(|| vec![keys]),
        };
        let mut offending = Vec::new();
        for member in members {
            if !self.is_subtype(member, source_keys) {
                offending.push(member);
            }
        }
        if offending.is_empty() {
            return Ok(keys);
        }
        let rejection = Rejection::KeysNotInSource {
            source,
            keys: interner.union(offending),
        };
        debug!(%rejection, "key argument rejected");
        Err(rejection)
    }

    /// `{ [P in keys]: source[P] }` with optional modifiers.
    fn mapped_over(
        &self,
        source: TypeId,
        constraint: TypeId,
        readonly_modifier: Option<MappedModifier>,
        optional_modifier: Option<MappedModifier>,
    ) -> TypeId {
        let interner = self.interner();
        let param = TypeParamInfo::new(interner.intern_string("P"));
        let template = interner.index_access(source, interner.type_param(param.clone()));
        interner.mapped(MappedType {
            type_param: param,
            constraint,
            name_type: None,
            template,
            readonly_modifier,
            optional_modifier,
        })
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// `Pick<T, K>`
    pub fn pick(&mut self, source: TypeId, keys: TypeId) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let source = self.evaluate(source);
        let keys = self.require_keys_of(source, keys)?;
        let mapped = self.mapped_over(source, keys, None, None);
        let result = self.evaluate(mapped);
        trace!(source = source.0, result = result.0, "pick");
        self.checked(mark, result)
    }

    /// `Omit<T, K>`, which is `Pick<T, Exclude<keyof T, K>>`.
    pub fn omit(&mut self, source: TypeId, keys: TypeId) -> Result<TypeId, Rejection> {
        let source = self.evaluate(source);
        let keys = self.require_keys_of(source, keys)?;
        let keyof = self.interner().keyof(source);
        let all_keys = self.evaluate(keyof);
        let remaining = self.exclude(all_keys, keys)?;
        self.pick(source, remaining)
    }

    /// `Exclude<U, X>`: drop the members of `U` that conform to `X`.
    pub fn exclude(&mut self, union: TypeId, excluded: TypeId) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let subject = TypeParamInfo::new(self.interner().intern_string("T"));
        let subject_type = self.interner().type_param(subject.clone());
        let result = self.select(
            &subject,
            union,
            excluded,
            TypeId::NEVER,
            subject_type,
            Distribution::Naked,
        );
        self.checked(mark, result)
    }

    /// `Extract<U, X>`: keep the members of `U` that conform to `X`.
    pub fn extract(&mut self, union: TypeId, extracted: TypeId) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let subject = TypeParamInfo::new(self.interner().intern_string("T"));
        let subject_type = self.interner().type_param(subject.clone());
        let result = self.select(
            &subject,
            union,
            extracted,
            subject_type,
            TypeId::NEVER,
            Distribution::Naked,
        );
        self.checked(mark, result)
    }

    // =========================================================================
    // Modifier toggles
    // =========================================================================

    /// Set (`on`) or clear the readonly flag of every attribute.
    pub fn readonly(&mut self, source: TypeId, on: bool) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let result = self.toggle_all(source, Some(modifier(on)), None);
        self.checked(mark, result)
    }

    /// Set (`on`) or clear the optional flag of every attribute.
    pub fn optional(&mut self, source: TypeId, on: bool) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let result = self.toggle_all(source, None, Some(modifier(on)));
        self.checked(mark, result)
    }

    /// Toggle readonly on the attributes named by `keys` only.
    pub fn readonly_keys(&mut self, source: TypeId, on: bool, keys: TypeId) -> Result<TypeId, Rejection> {
        self.toggle_keys(source, keys, Some(modifier(on)), None)
    }

    /// Toggle optional on the attributes named by `keys` only.
    pub fn optional_keys(&mut self, source: TypeId, on: bool, keys: TypeId) -> Result<TypeId, Rejection> {
        self.toggle_keys(source, keys, None, Some(modifier(on)))
    }

    /// Homomorphic mapped type over `keyof source`; non-records pass through.
    fn toggle_all(
        &mut self,
        source: TypeId,
        readonly_modifier: Option<MappedModifier>,
        optional_modifier: Option<MappedModifier>,
    ) -> TypeId {
        let interner = self.interner();
        let source = self.evaluate(source);
        if !is_record_like(interner, source) {
            return source;
        }
        let mapped = self.mapped_over(source, interner.keyof(source), readonly_modifier, optional_modifier);
        self.evaluate(mapped)
    }

    fn toggle_keys(
        &mut self,
        source: TypeId,
        keys: TypeId,
        readonly_modifier: Option<MappedModifier>,
        optional_modifier: Option<MappedModifier>,
    ) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let interner = self.interner();
        let source = self.evaluate(source);
        let keys = self.require_keys_of(source, keys)?;
        let Some(source_props) = self.record_of(source) else {
            return self.checked(mark, source);
        };

        let toggled_type = {
            let mapped = self.mapped_over(source, keys, readonly_modifier, optional_modifier);
            self.evaluate(mapped)
        };
        let toggled = record_properties(interner, toggled_type).unwrap_or_default();

        // Keep the source's attribute order.
        let properties = source_props
            .into_iter()
            .map(|prop| {
                toggled
                    .iter()
                    .find(|t| t.name == prop.name)
                    .cloned()
                    .unwrap_or(prop)
            })
            .collect();
        let result = interner.object(properties);
        self.checked(mark, result)
    }

    // =========================================================================
    // Renaming and filtering
    // =========================================================================

    /// `{ [K in keyof T as remap]: T[K] }`
    pub fn rename_filter(&mut self, source: TypeId, remap: &KeyRemap) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let interner = self.interner();
        let source = self.evaluate(source);

        let key = interner.type_param(remap.key.clone());
        let value_of_key = interner.index_access(source, key);
        let substitution = TypeSubstitution::single(remap.value.name, value_of_key);
        let name_type = instantiate_type(interner, remap.name_type, &substitution);
        let template = match remap.template {
            Some(template) => instantiate_type(interner, template, &substitution),
            None => value_of_key,
        };

        let mapped = interner.mapped(MappedType {
            type_param: remap.key.clone(),
            constraint: interner.keyof(source),
            name_type: Some(name_type),
            template,
            readonly_modifier: None,
            optional_modifier: None,
        });
        let result = self.evaluate(mapped);
        trace!(source = source.0, result = result.0, "rename_filter");
        self.checked(mark, result)
    }

    /// Keep the attributes whose value type conforms to `pattern`.
    pub fn pick_by_value(&mut self, source: TypeId, pattern: TypeId) -> Result<TypeId, Rejection> {
        let remap = KeyRemap::by_value(self.interner(), pattern, true);
        self.rename_filter(source, &remap)
    }

    /// Drop the attributes whose value type conforms to `pattern`.
    pub fn omit_by_value(&mut self, source: TypeId, pattern: TypeId) -> Result<TypeId, Rejection> {
        let remap = KeyRemap::by_value(self.interner(), pattern, false);
        self.rename_filter(source, &remap)
    }

    // =========================================================================
    // Recursive descent and merging
    // =========================================================================

    /// Apply `rule` at every record nesting level.
    ///
    /// Only attributes whose value is itself a record are descended into;
    /// arrays, tuples, functions and primitives are left as they are.
    pub fn deep_transform(&mut self, source: TypeId, rule: DeepRule) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let result = self.deep_transform_inner(source, rule, 0);
        self.checked(mark, result)
    }

    fn deep_transform_inner(&mut self, source: TypeId, rule: DeepRule, depth: u32) -> TypeId {
        if depth >= self.options().deep_transform.max_depth() {
            self.reject(Rejection::DepthExceeded { type_id: source });
            return TypeId::ERROR;
        }
        let toggled = match rule {
            DeepRule::Readonly(on) => self.toggle_all(source, Some(modifier(on)), None),
            DeepRule::Optional(on) => self.toggle_all(source, None, Some(modifier(on))),
        };
        let interner = self.interner();
        let Some(properties) = record_properties(interner, toggled) else {
            return toggled;
        };
        let properties = properties
            .into_iter()
            .map(|prop| {
                let value = self.evaluate(prop.type_id);
                if is_record_like(interner, value) {
                    PropertyInfo {
                        type_id: self.deep_transform_inner(value, rule, depth + 1),
                        ..prop
                    }
                } else {
                    prop
                }
            })
            .collect();
        interner.object(properties)
    }

    /// Record with `overlay`'s attributes replacing `base`'s.
    pub fn merge(&mut self, base: TypeId, overlay: TypeId) -> Result<TypeId, Rejection> {
        let mark = self.rejection_mark();
        let base = self.evaluate(base);
        let overlay = self.evaluate(overlay);
        let result = match (self.record_of(base), self.record_of(overlay)) {
            (Some(base_props), Some(overlay_props)) => self
                .interner()
                .object(override_properties(&base_props, &overlay_props)),
            _ => self.interner().intersection2(base, overlay),
        };
        self.checked(mark, result)
    }

    /// Attributes of a record or of an intersection of records.
    fn record_of(&mut self, type_id: TypeId) -> Option<Vec<PropertyInfo>> {
        let interner = self.interner();
        match interner.lookup(type_id)? {
            TypeData::Object(_) => record_properties(interner, type_id),
            TypeData::Intersection(list_id) => {
                let members = interner.type_list(list_id);
                let merged = merge_record_members(interner, &members)?;
                record_properties(interner, merged)
            }
            _ => None,
        }
    }
}

fn modifier(on: bool) -> MappedModifier {
    if on {
        MappedModifier::Add
    } else {
        MappedModifier::Remove
    }
}

fn is_record_like(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    if is_object_type(db, type_id) {
        return true;
    }
    match db.lookup(type_id) {
        Some(TypeData::Intersection(list_id)) => db
            .type_list(list_id)
            .iter()
            .all(|&member| is_object_type(db, member)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/transform_tests.rs"]
mod tests;
