//! Structural type representation.
//!
//! Every type is a [`TypeData`] node interned into a
//! [`TypeInterner`](crate::TypeInterner) and handled through its [`TypeId`].
//! Nodes are immutable; two structurally identical nodes always share an id,
//! so `TypeId` comparison is structural identity.

use crate::def::DefId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tyrel_common::interner::Atom;

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Placeholder for "no type".
    pub const NONE: TypeId = TypeId(0);
    /// Result of a failed evaluation; relates to everything to avoid cascades.
    pub const ERROR: TypeId = TypeId(1);
    /// The uninhabited type, a sum with zero members.
    pub const NEVER: TypeId = TypeId(2);
    pub const UNKNOWN: TypeId = TypeId(3);
    /// The top type that absorbs everything.
    pub const ANY: TypeId = TypeId(4);
    pub const VOID: TypeId = TypeId(5);
    pub const UNDEFINED: TypeId = TypeId(6);
    pub const NULL: TypeId = TypeId(7);
    /// `true | false`.
    pub const BOOLEAN: TypeId = TypeId(8);
    pub const NUMBER: TypeId = TypeId(9);
    pub const STRING: TypeId = TypeId(10);
    pub const BIGINT: TypeId = TypeId(11);
    pub const SYMBOL: TypeId = TypeId(12);
    /// Any non-primitive.
    pub const OBJECT: TypeId = TypeId(13);
    /// Any function shape.
    pub const FUNCTION: TypeId = TypeId(14);
    pub const BOOLEAN_TRUE: TypeId = TypeId(15);
    pub const BOOLEAN_FALSE: TypeId = TypeId(16);

    /// First id handed out to interned (non-intrinsic) types.
    pub const FIRST_USER: u32 = 100;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_boolean_literal(self) -> bool {
        self.0 == Self::BOOLEAN_TRUE.0 || self.0 == Self::BOOLEAN_FALSE.0
    }
}

/// Primitive and special types with a fixed [`TypeId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Error,
    Never,
    Unknown,
    Any,
    Void,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Bigint,
    Symbol,
    Object,
    Function,
}

impl IntrinsicKind {
    pub const fn type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Error => TypeId::ERROR,
            IntrinsicKind::Never => TypeId::NEVER,
            IntrinsicKind::Unknown => TypeId::UNKNOWN,
            IntrinsicKind::Any => TypeId::ANY,
            IntrinsicKind::Void => TypeId::VOID,
            IntrinsicKind::Undefined => TypeId::UNDEFINED,
            IntrinsicKind::Null => TypeId::NULL,
            IntrinsicKind::Boolean => TypeId::BOOLEAN,
            IntrinsicKind::Number => TypeId::NUMBER,
            IntrinsicKind::String => TypeId::STRING,
            IntrinsicKind::Bigint => TypeId::BIGINT,
            IntrinsicKind::Symbol => TypeId::SYMBOL,
            IntrinsicKind::Object => TypeId::OBJECT,
            IntrinsicKind::Function => TypeId::FUNCTION,
        }
    }

    pub const fn from_type_id(id: TypeId) -> Option<IntrinsicKind> {
        Some(match id {
            TypeId::ERROR => IntrinsicKind::Error,
            TypeId::NEVER => IntrinsicKind::Never,
            TypeId::UNKNOWN => IntrinsicKind::Unknown,
            TypeId::ANY => IntrinsicKind::Any,
            TypeId::VOID => IntrinsicKind::Void,
            TypeId::UNDEFINED => IntrinsicKind::Undefined,
            TypeId::NULL => IntrinsicKind::Null,
            TypeId::BOOLEAN => IntrinsicKind::Boolean,
            TypeId::NUMBER => IntrinsicKind::Number,
            TypeId::STRING => IntrinsicKind::String,
            TypeId::BIGINT => IntrinsicKind::Bigint,
            TypeId::SYMBOL => IntrinsicKind::Symbol,
            TypeId::OBJECT => IntrinsicKind::Object,
            TypeId::FUNCTION => IntrinsicKind::Function,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Error => "error",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Any => "any",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Number => "number",
            IntrinsicKind::String => "string",
            IntrinsicKind::Bigint => "bigint",
            IntrinsicKind::Symbol => "symbol",
            IntrinsicKind::Object => "object",
            IntrinsicKind::Function => "Function",
        }
    }
}

/// `f64` wrapper with total equality and hashing by bit pattern, so numeric
/// literals can be interned.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    fn canonical_bits(self) -> u64 {
        // -0.0 and 0.0 denote the same literal type.
        if self.0 == 0.0 { 0 } else { self.0.to_bits() }
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

/// A single concrete value lifted to the type level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
}

/// One attribute of a record type.
///
/// Identity of a record covers `(name, type_id, readonly, optional)` of
/// every attribute, nothing else.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub readonly: bool,
    pub optional: bool,
}

impl PropertyInfo {
    /// A required, mutable attribute.
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            name,
            type_id,
            readonly: false,
            optional: false,
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Attribute set of a record, sorted by name atom.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
}

impl ObjectShape {
    pub fn property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties
            .binary_search_by_key(&name, |p| p.name)
            .ok()
            .map(|idx| &self.properties[idx])
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub optional: bool,
    /// `...T`; the element type is an array or tuple spread into the tail.
    pub rest: bool,
}

impl TupleElement {
    pub fn required(type_id: TypeId) -> Self {
        TupleElement {
            type_id,
            optional: false,
            rest: false,
        }
    }

    pub fn rest(type_id: TypeId) -> Self {
        TupleElement {
            type_id,
            optional: false,
            rest: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

impl TypeParamInfo {
    pub fn new(name: Atom) -> Self {
        TypeParamInfo {
            name,
            constraint: None,
            default: None,
        }
    }

    pub fn with_constraint(mut self, constraint: TypeId) -> Self {
        self.constraint = Some(constraint);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

impl ParamInfo {
    pub fn unnamed(type_id: TypeId) -> Self {
        ParamInfo {
            name: None,
            type_id,
            optional: false,
            rest: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub type_params: Vec<TypeParamInfo>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

/// `check_type extends extends_type ? true_type : false_type`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
    /// Set when the check type is a naked type parameter; instantiating it
    /// with a union maps the conditional over the members.
    pub is_distributive: bool,
}

/// `+` / `-` on a mapped type modifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappedModifier {
    Add,
    Remove,
}

/// `{ [type_param in constraint as name_type]: template }`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    pub type_param: TypeParamInfo,
    pub constraint: TypeId,
    pub name_type: Option<TypeId>,
    pub template: TypeId,
    pub readonly_modifier: Option<MappedModifier>,
    pub optional_modifier: Option<MappedModifier>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TemplateSpan {
    Text(Atom),
    Type(TypeId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StringIntrinsicKind {
    Uppercase,
    Lowercase,
    Capitalize,
    Uncapitalize,
}

impl StringIntrinsicKind {
    pub const fn name(self) -> &'static str {
        match self {
            StringIntrinsicKind::Uppercase => "Uppercase",
            StringIntrinsicKind::Lowercase => "Lowercase",
            StringIntrinsicKind::Capitalize => "Capitalize",
            StringIntrinsicKind::Uncapitalize => "Uncapitalize",
        }
    }
}

/// `base<args...>`, where `base` is a `Lazy` alias reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub base: TypeId,
    pub args: Vec<TypeId>,
}

macro_rules! id_newtype {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u32);
        )*
    };
}

id_newtype!(
    TypeListId,
    TupleListId,
    TemplateLiteralId,
    ObjectShapeId,
    FunctionShapeId,
    ConditionalTypeId,
    MappedTypeId,
    TypeApplicationId,
);

/// The closed set of type expressions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    /// Record type.
    Object(ObjectShapeId),
    /// Sum type; never empty and never a single member once normalized.
    Union(TypeListId),
    Intersection(TypeListId),
    Tuple(TupleListId),
    Array(TypeId),
    Function(FunctionShapeId),
    TypeParameter(TypeParamInfo),
    /// Pattern placeholder that captures the matched sub-expression.
    Infer(TypeParamInfo),
    Conditional(ConditionalTypeId),
    Mapped(MappedTypeId),
    KeyOf(TypeId),
    IndexAccess(TypeId, TypeId),
    TemplateLiteral(TemplateLiteralId),
    StringIntrinsic {
        kind: StringIntrinsicKind,
        type_arg: TypeId,
    },
    /// Reference to an alias in the definition store.
    Lazy(DefId),
    Application(TypeApplicationId),
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
