//! Alias definitions and their storage.
//!
//! A generic alias such as `type Pair<A, B> = [A, B]` is registered in the
//! [`DefinitionStore`] under a [`DefId`]; type expressions refer to it with
//! `TypeData::Lazy(def_id)` and apply it with `TypeData::Application`.
//!
//! Recursive aliases (`type DeepReadonly<T> = ... DeepReadonly<T[K]> ...`)
//! need their id before their body exists, so registration is split into
//! [`DefinitionStore::reserve`] and [`DefinitionStore::set_body`].

use crate::db::TypeDatabase;
use crate::types::{TypeId, TypeParamInfo};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;
use tyrel_common::interner::Atom;

/// Identifier of an alias definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// A registered alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionInfo {
    pub name: Atom,
    pub type_params: Vec<TypeParamInfo>,
    /// `None` while the alias is reserved but not yet defined.
    pub body: Option<TypeId>,
}

/// Resolves `Lazy` references during evaluation and subtype checking.
pub trait TypeResolver {
    /// Body of the alias, un-instantiated.
    fn resolve_lazy(&self, def_id: DefId, interner: &dyn TypeDatabase) -> Option<TypeId>;

    /// Type parameters of a generic alias.
    fn get_lazy_type_params(&self, def_id: DefId) -> Option<Vec<TypeParamInfo>>;

    /// Display name of the alias.
    fn def_name(&self, _def_id: DefId) -> Option<Atom> {
        None
    }
}

/// Resolver that knows no definitions.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopResolver;

impl TypeResolver for NoopResolver {
    fn resolve_lazy(&self, _def_id: DefId, _interner: &dyn TypeDatabase) -> Option<TypeId> {
        None
    }

    fn get_lazy_type_params(&self, _def_id: DefId) -> Option<Vec<TypeParamInfo>> {
        None
    }
}

/// Concurrent storage for alias definitions.
pub struct DefinitionStore {
    definitions: DashMap<DefId, Arc<DefinitionInfo>>,
    by_name: DashMap<Atom, DefId>,
    next_id: AtomicU32,
}

impl DefinitionStore {
    pub fn new() -> Self {
        DefinitionStore {
            definitions: DashMap::new(),
            by_name: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    /// Allocate an id for an alias whose body is supplied later.
    pub fn reserve(&self, name: Atom, type_params: Vec<TypeParamInfo>) -> DefId {
        let id = DefId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(def_id = id.0, name = name.0, "reserving definition");
        self.definitions.insert(
            id,
            Arc::new(DefinitionInfo {
                name,
                type_params,
                body: None,
            }),
        );
        self.by_name.insert(name, id);
        id
    }

    /// Define the body of a reserved alias. Returns `false` for unknown ids.
    pub fn set_body(&self, def_id: DefId, body: TypeId) -> bool {
        let Some(mut entry) = self.definitions.get_mut(&def_id) else {
            return false;
        };
        let info = Arc::make_mut(entry.value_mut());
        info.body = Some(body);
        true
    }

    /// Register an alias in one step.
    pub fn register(&self, name: Atom, type_params: Vec<TypeParamInfo>, body: TypeId) -> DefId {
        let id = self.reserve(name, type_params);
        self.set_body(id, body);
        id
    }

    pub fn get(&self, def_id: DefId) -> Option<Arc<DefinitionInfo>> {
        self.definitions.get(&def_id).map(|entry| entry.value().clone())
    }

    /// Most recently registered alias with this name.
    pub fn find_by_name(&self, name: Atom) -> Option<DefId> {
        self.by_name.get(&name).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeResolver for DefinitionStore {
    fn resolve_lazy(&self, def_id: DefId, _interner: &dyn TypeDatabase) -> Option<TypeId> {
        self.get(def_id).and_then(|info| info.body)
    }

    fn get_lazy_type_params(&self, def_id: DefId) -> Option<Vec<TypeParamInfo>> {
        self.get(def_id).map(|info| info.type_params.clone())
    }

    fn def_name(&self, def_id: DefId) -> Option<Atom> {
        self.get(def_id).map(|info| info.name)
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
