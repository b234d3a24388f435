//! Type interning for structural deduplication.
//!
//! This module implements the type interning engine that converts
//! [`TypeData`] structures into lightweight [`TypeId`] handles.
//!
//! The normalising constructors (`union`, `intersection`, `object`,
//! `template_literal`) canonicalise while interning, so two equivalent
//! expressions built through them share one `TypeId`:
//! - O(1) type identity (compare `TypeId` values)
//! - each unique structure stored once
//! - shared sub-expressions are reused by id, never copied

use crate::def::DefId;
use crate::types::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;
use tyrel_common::interner::{Atom, ShardedInterner};
use tyrel_common::limits::MAX_INTERSECTION_DISTRIBUTION;

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

/// Coarse primitive class used to detect empty intersections.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PrimitiveClass {
    String,
    Number,
    Boolean,
    Bigint,
    Symbol,
    Null,
    Undefined,
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Arc<[T]> {
        self.items
            .get(id as usize)
            .cloned()
            .unwrap_or_else(|| self.items[0].clone())
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

#[derive(Default)]
struct TypeStore {
    key_to_id: FxHashMap<TypeData, TypeId>,
    id_to_key: Vec<TypeData>,
}

/// Type interning table.
///
/// Every table sits behind its own `RwLock`, so one interner can be shared
/// by evaluators running on different threads.
pub struct TypeInterner {
    /// Attribute names and string literal text.
    pub string_interner: ShardedInterner,
    types: RwLock<TypeStore>,
    type_lists: RwLock<SliceInterner<TypeId>>,
    tuple_lists: RwLock<SliceInterner<TupleElement>>,
    template_lists: RwLock<SliceInterner<TemplateSpan>>,
    object_shapes: RwLock<ValueInterner<ObjectShape>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    conditional_types: RwLock<ValueInterner<ConditionalType>>,
    mapped_types: RwLock<ValueInterner<MappedType>>,
    applications: RwLock<ValueInterner<TypeApplication>>,
    /// Declaration order of the first record interned for each shape.
    display_orders: RwLock<FxHashMap<ObjectShapeId, Arc<[Atom]>>>,
}

macro_rules! read_lock {
    ($lock:expr) => {
        $lock.read().unwrap_or_else(PoisonError::into_inner)
    };
}

macro_rules! write_lock {
    ($lock:expr) => {
        $lock.write().unwrap_or_else(PoisonError::into_inner)
    };
}

impl TypeInterner {
    pub fn new() -> Self {
        TypeInterner {
            string_interner: ShardedInterner::new(),
            types: RwLock::new(TypeStore::default()),
            type_lists: RwLock::new(SliceInterner::new()),
            tuple_lists: RwLock::new(SliceInterner::new()),
            template_lists: RwLock::new(SliceInterner::new()),
            object_shapes: RwLock::new(ValueInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            conditional_types: RwLock::new(ValueInterner::new()),
            mapped_types: RwLock::new(ValueInterner::new()),
            applications: RwLock::new(ValueInterner::new()),
            display_orders: RwLock::new(FxHashMap::default()),
        }
    }

    // =========================================================================
    // Raw interning and lookup
    // =========================================================================

    /// Intern a node as-is, without normalisation.
    ///
    /// Prefer the normalising constructors; [`canonicalize`](crate::canonicalize)
    /// repairs expressions built through this entry point.
    pub fn intern(&self, key: TypeData) -> TypeId {
        match key {
            TypeData::Intrinsic(kind) => return kind.type_id(),
            TypeData::Literal(LiteralValue::Boolean(true)) => return TypeId::BOOLEAN_TRUE,
            TypeData::Literal(LiteralValue::Boolean(false)) => return TypeId::BOOLEAN_FALSE,
            _ => {}
        }

        if let Some(&id) = read_lock!(self.types).key_to_id.get(&key) {
            return id;
        }

        let mut store = write_lock!(self.types);
        if let Some(&id) = store.key_to_id.get(&key) {
            return id;
        }
        let id = TypeId(TypeId::FIRST_USER + store.id_to_key.len() as u32);
        store.id_to_key.push(key.clone());
        store.key_to_id.insert(key, id);
        id
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id == TypeId::BOOLEAN_TRUE {
            return Some(TypeData::Literal(LiteralValue::Boolean(true)));
        }
        if id == TypeId::BOOLEAN_FALSE {
            return Some(TypeData::Literal(LiteralValue::Boolean(false)));
        }
        if id.is_intrinsic() {
            return IntrinsicKind::from_type_id(id).map(TypeData::Intrinsic);
        }
        read_lock!(self.types)
            .id_to_key
            .get((id.0 - TypeId::FIRST_USER) as usize)
            .cloned()
    }

    /// Number of interned non-intrinsic types.
    pub fn len(&self) -> usize {
        read_lock!(self.types).id_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    pub fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    // =========================================================================
    // Side-table accessors
    // =========================================================================

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        read_lock!(self.type_lists).get(id.0)
    }

    pub fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        read_lock!(self.tuple_lists).get(id.0)
    }

    pub fn template_list(&self, id: TemplateLiteralId) -> Arc<[TemplateSpan]> {
        read_lock!(self.template_lists).get(id.0)
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        read_lock!(self.object_shapes)
            .get(id.0)
            .unwrap_or_else(|| Arc::new(ObjectShape::default()))
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        read_lock!(self.function_shapes).get(id.0).unwrap_or_else(|| {
            Arc::new(FunctionShape {
                type_params: Vec::new(),
                params: Vec::new(),
                return_type: TypeId::ERROR,
            })
        })
    }

    pub fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType> {
        read_lock!(self.conditional_types).get(id.0).unwrap_or_else(|| {
            Arc::new(ConditionalType {
                check_type: TypeId::ERROR,
                extends_type: TypeId::ERROR,
                true_type: TypeId::ERROR,
                false_type: TypeId::ERROR,
                is_distributive: false,
            })
        })
    }

    pub fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType> {
        read_lock!(self.mapped_types).get(id.0).unwrap_or_else(|| {
            Arc::new(MappedType {
                type_param: TypeParamInfo::new(Atom::NONE),
                constraint: TypeId::NEVER,
                name_type: None,
                template: TypeId::ERROR,
                readonly_modifier: None,
                optional_modifier: None,
            })
        })
    }

    pub fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication> {
        read_lock!(self.applications).get(id.0).unwrap_or_else(|| {
            Arc::new(TypeApplication {
                base: TypeId::ERROR,
                args: Vec::new(),
            })
        })
    }

    /// Declaration order recorded when this record shape was first interned.
    pub fn display_order(&self, id: ObjectShapeId) -> Option<Arc<[Atom]>> {
        read_lock!(self.display_orders).get(&id).cloned()
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        TypeListId(write_lock!(self.type_lists).intern(members))
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.literal_string_atom(atom)
    }

    pub fn literal_string_atom(&self, atom: Atom) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value {
            TypeId::BOOLEAN_TRUE
        } else {
            TypeId::BOOLEAN_FALSE
        }
    }

    // =========================================================================
    // Unions
    // =========================================================================

    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    pub fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            self.push_union_member(&mut flat, member);
        }
        self.normalize_union(flat)
    }

    fn push_union_member(&self, flat: &mut TypeListBuffer, member: TypeId) {
        if let Some(TypeData::Union(list)) = self.lookup(member) {
            flat.extend(self.type_list(list).iter().copied());
        } else {
            flat.push(member);
        }
    }

    fn normalize_union(&self, mut flat: TypeListBuffer) -> TypeId {
        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|id| *id != TypeId::NEVER);

        if flat.contains(&TypeId::BOOLEAN_TRUE) && flat.contains(&TypeId::BOOLEAN_FALSE) {
            flat.push(TypeId::BOOLEAN);
        }

        // Absorb literal types into their corresponding primitive types
        // e.g., "a" | string => string, true | boolean => boolean
        let has_string = flat.contains(&TypeId::STRING);
        let has_number = flat.contains(&TypeId::NUMBER);
        let has_boolean = flat.contains(&TypeId::BOOLEAN);
        if has_string || has_number || has_boolean {
            flat.retain(|id| match self.lookup(*id) {
                Some(TypeData::Literal(LiteralValue::String(_))) => !has_string,
                Some(TypeData::Literal(LiteralValue::Number(_))) => !has_number,
                Some(TypeData::Literal(LiteralValue::Boolean(_))) => !has_boolean,
                _ => true,
            });
        }

        flat.sort_unstable();
        flat.dedup();

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list_id = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Union(list_id))
            }
        }
    }

    // =========================================================================
    // Intersections
    // =========================================================================

    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        self.intersection_from_iter(members)
    }

    pub fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.intersection_from_iter([left, right])
    }

    pub fn intersection_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            if let Some(TypeData::Intersection(list)) = self.lookup(member) {
                flat.extend(self.type_list(list).iter().copied());
            } else {
                flat.push(member);
            }
        }
        self.normalize_intersection(flat)
    }

    fn normalize_intersection(&self, mut flat: TypeListBuffer) -> TypeId {
        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        flat.retain(|id| *id != TypeId::UNKNOWN);
        flat.sort_unstable();
        flat.dedup();

        match flat.len() {
            0 => return TypeId::UNKNOWN,
            1 => return flat[0],
            _ => {}
        }

        // (A | B) & C  =>  (A & C) | (B & C)
        if let Some(distributed) = self.distribute_intersection(&flat) {
            return distributed;
        }

        if !self.reduce_primitive_members(&mut flat) {
            return TypeId::NEVER;
        }

        match flat.len() {
            0 => TypeId::UNKNOWN,
            1 => flat[0],
            _ => {
                let list_id = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Intersection(list_id))
            }
        }
    }

    fn distribute_intersection(&self, flat: &[TypeId]) -> Option<TypeId> {
        let mut factors: Vec<Arc<[TypeId]>> = Vec::with_capacity(flat.len());
        let mut has_union = false;
        let mut product: usize = 1;
        for &member in flat {
            let choices: Arc<[TypeId]> = match self.lookup(member) {
                Some(TypeData::Union(list)) => {
                    has_union = true;
                    self.type_list(list)
                }
                Some(TypeData::Intrinsic(IntrinsicKind::Boolean)) => {
                    has_union = true;
                    Arc::from(vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE])
                }
                _ => Arc::from(vec![member]),
            };
            product = product.saturating_mul(choices.len());
            factors.push(choices);
        }
        if !has_union {
            return None;
        }
        if product > MAX_INTERSECTION_DISTRIBUTION {
            trace!(product, "intersection distribution exceeds limit, kept as-is");
            return None;
        }

        let mut combinations: Vec<Vec<TypeId>> = vec![Vec::with_capacity(factors.len())];
        for choices in &factors {
            let mut next = Vec::with_capacity(combinations.len() * choices.len());
            for combo in &combinations {
                for &choice in choices.iter() {
                    let mut extended = combo.clone();
                    extended.push(choice);
                    next.push(extended);
                }
            }
            combinations = next;
        }

        let members: Vec<TypeId> = combinations
            .into_iter()
            .map(|combo| self.intersection(combo))
            .collect();
        Some(self.union(members))
    }

    fn primitive_class(&self, id: TypeId) -> Option<(PrimitiveClass, bool)> {
        match id {
            TypeId::STRING => return Some((PrimitiveClass::String, false)),
            TypeId::NUMBER => return Some((PrimitiveClass::Number, false)),
            TypeId::BOOLEAN => return Some((PrimitiveClass::Boolean, false)),
            TypeId::BIGINT => return Some((PrimitiveClass::Bigint, false)),
            TypeId::SYMBOL => return Some((PrimitiveClass::Symbol, false)),
            TypeId::NULL => return Some((PrimitiveClass::Null, true)),
            TypeId::UNDEFINED | TypeId::VOID => return Some((PrimitiveClass::Undefined, true)),
            TypeId::BOOLEAN_TRUE | TypeId::BOOLEAN_FALSE => {
                return Some((PrimitiveClass::Boolean, true));
            }
            _ => {}
        }
        match self.lookup(id)? {
            TypeData::Literal(LiteralValue::String(_)) => Some((PrimitiveClass::String, true)),
            TypeData::Literal(LiteralValue::Number(_)) => Some((PrimitiveClass::Number, true)),
            _ => None,
        }
    }

    /// Collapse primitive members of an intersection. Returns `false` when
    /// the members are disjoint and the intersection is empty.
    fn reduce_primitive_members(&self, flat: &mut TypeListBuffer) -> bool {
        let mut class: Option<PrimitiveClass> = None;
        let mut unit: Option<TypeId> = None;
        let mut has_primitive = false;
        let mut has_non_primitive_object = false;

        for &member in flat.iter() {
            if member == TypeId::OBJECT || member == TypeId::FUNCTION {
                has_non_primitive_object = true;
            }
            let Some((member_class, is_unit)) = self.primitive_class(member) else {
                continue;
            };
            has_primitive = true;
            if let Some(existing) = class
                && existing != member_class
            {
                return false;
            }
            class = Some(member_class);
            if is_unit {
                match unit {
                    Some(existing) if existing != member && !Self::void_undefined(existing, member) => {
                        return false;
                    }
                    Some(existing) if existing == TypeId::VOID => unit = Some(member),
                    Some(_) => {}
                    None => unit = Some(member),
                }
            }
        }

        if has_primitive && has_non_primitive_object {
            return false;
        }

        // A literal absorbs its own primitive: "a" & string => "a"
        if let Some(unit) = unit {
            flat.retain(|id| *id == unit || self.primitive_class(*id).is_none());
        }
        true
    }

    fn void_undefined(a: TypeId, b: TypeId) -> bool {
        matches!(
            (a, b),
            (TypeId::VOID, TypeId::UNDEFINED) | (TypeId::UNDEFINED, TypeId::VOID)
        )
    }

    // =========================================================================
    // Structured types
    // =========================================================================

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        let list_id = TupleListId(write_lock!(self.tuple_lists).intern(elements));
        self.intern(TypeData::Tuple(list_id))
    }

    /// Intern a record type.
    ///
    /// Attributes are stored sorted by name; the given order is remembered
    /// for display. Names must be unique: later duplicates are dropped.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        let order: Vec<Atom> = properties.iter().map(|p| p.name).collect();
        let mut properties = properties;
        properties.sort_by_key(|p| p.name);
        let before = properties.len();
        properties.dedup_by_key(|p| p.name);
        if properties.len() != before {
            trace!(
                dropped = before - properties.len(),
                "duplicate attribute names dropped from record"
            );
        }

        let shape_id = ObjectShapeId(write_lock!(self.object_shapes).intern(ObjectShape { properties }));
        write_lock!(self.display_orders)
            .entry(shape_id)
            .or_insert_with(|| Arc::from(order));
        self.intern(TypeData::Object(shape_id))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let shape_id = FunctionShapeId(write_lock!(self.function_shapes).intern(shape));
        self.intern(TypeData::Function(shape_id))
    }

    pub fn type_param(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::TypeParameter(info))
    }

    pub fn infer(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::Infer(info))
    }

    pub fn conditional(&self, conditional: ConditionalType) -> TypeId {
        let id = ConditionalTypeId(write_lock!(self.conditional_types).intern(conditional));
        self.intern(TypeData::Conditional(id))
    }

    pub fn mapped(&self, mapped: MappedType) -> TypeId {
        let id = MappedTypeId(write_lock!(self.mapped_types).intern(mapped));
        self.intern(TypeData::Mapped(id))
    }

    pub fn keyof(&self, operand: TypeId) -> TypeId {
        self.intern(TypeData::KeyOf(operand))
    }

    pub fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        self.intern(TypeData::IndexAccess(object, index))
    }

    pub fn string_intrinsic(&self, kind: StringIntrinsicKind, type_arg: TypeId) -> TypeId {
        self.intern(TypeData::StringIntrinsic { kind, type_arg })
    }

    pub fn lazy(&self, def_id: DefId) -> TypeId {
        self.intern(TypeData::Lazy(def_id))
    }

    pub fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        let id = TypeApplicationId(write_lock!(self.applications).intern(TypeApplication { base, args }));
        self.intern(TypeData::Application(id))
    }

    /// Intern a template literal type.
    ///
    /// Adjacent text is merged, literal spans are inlined as text, and a
    /// template that is all text becomes a string literal.
    pub fn template_literal(&self, spans: Vec<TemplateSpan>) -> TypeId {
        let mut normalized: Vec<TemplateSpan> = Vec::with_capacity(spans.len());
        let mut text = String::new();
        for span in spans {
            let inline = match &span {
                TemplateSpan::Text(atom) => Some(self.resolve_atom(*atom)),
                TemplateSpan::Type(TypeId::NEVER) => return TypeId::NEVER,
                TemplateSpan::Type(type_id) => self.literal_text(*type_id),
            };
            match inline {
                Some(fragment) => text.push_str(&fragment),
                None => {
                    if !text.is_empty() {
                        normalized.push(TemplateSpan::Text(self.intern_string(&text)));
                        text.clear();
                    }
                    normalized.push(span);
                }
            }
        }
        if normalized.is_empty() {
            return self.literal_string(&text);
        }
        if !text.is_empty() {
            normalized.push(TemplateSpan::Text(self.intern_string(&text)));
        }
        let list_id = TemplateLiteralId(write_lock!(self.template_lists).intern(normalized));
        self.intern(TypeData::TemplateLiteral(list_id))
    }

    /// Text of a literal when spliced into a template literal.
    pub fn literal_text(&self, type_id: TypeId) -> Option<String> {
        match self.lookup(type_id)? {
            TypeData::Literal(LiteralValue::String(atom)) => Some(self.resolve_atom(atom)),
            TypeData::Literal(LiteralValue::Number(n)) => Some(format_number(n.0)),
            TypeData::Literal(LiteralValue::Boolean(b)) => Some(b.to_string()),
            TypeData::Intrinsic(IntrinsicKind::Null) => Some("null".to_string()),
            TypeData::Intrinsic(IntrinsicKind::Undefined) => Some("undefined".to_string()),
            _ => None,
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a numeric literal the way it is written in source: integers
/// without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
