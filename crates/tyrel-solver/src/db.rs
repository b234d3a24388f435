//! Query trait over the type store.
//!
//! Solver components depend on `&dyn TypeDatabase` rather than on the
//! concrete [`TypeInterner`], so evaluation, relation checks and formatting
//! can run against any store that hands out the same ids.

use crate::def::DefId;
use crate::intern::TypeInterner;
use crate::types::*;
use std::sync::Arc;
use tyrel_common::interner::Atom;

pub trait TypeDatabase: Sync {
    fn intern(&self, key: TypeData) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeData>;

    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> String;
    fn resolve_atom_ref(&self, atom: Atom) -> Arc<str>;

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]>;
    fn template_list(&self, id: TemplateLiteralId) -> Arc<[TemplateSpan]>;
    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape>;
    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape>;
    fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType>;
    fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType>;
    fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication>;
    fn display_order(&self, id: ObjectShapeId) -> Option<Arc<[Atom]>>;

    fn literal_string(&self, value: &str) -> TypeId;
    fn literal_string_atom(&self, atom: Atom) -> TypeId;
    fn literal_number(&self, value: f64) -> TypeId;
    fn literal_text(&self, type_id: TypeId) -> Option<String>;

    fn union(&self, members: Vec<TypeId>) -> TypeId;
    fn union2(&self, left: TypeId, right: TypeId) -> TypeId;
    fn intersection(&self, members: Vec<TypeId>) -> TypeId;
    fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId;
    fn array(&self, element: TypeId) -> TypeId;
    fn tuple(&self, elements: Vec<TupleElement>) -> TypeId;
    fn object(&self, properties: Vec<PropertyInfo>) -> TypeId;
    fn function(&self, shape: FunctionShape) -> TypeId;
    fn type_param(&self, info: TypeParamInfo) -> TypeId;
    fn infer(&self, info: TypeParamInfo) -> TypeId;
    fn conditional(&self, conditional: ConditionalType) -> TypeId;
    fn mapped(&self, mapped: MappedType) -> TypeId;
    fn keyof(&self, operand: TypeId) -> TypeId;
    fn index_access(&self, object: TypeId, index: TypeId) -> TypeId;
    fn template_literal(&self, spans: Vec<TemplateSpan>) -> TypeId;
    fn string_intrinsic(&self, kind: StringIntrinsicKind, type_arg: TypeId) -> TypeId;
    fn lazy(&self, def_id: DefId) -> TypeId;
    fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId;
}

impl TypeDatabase for TypeInterner {
    fn intern(&self, key: TypeData) -> TypeId {
        TypeInterner::intern(self, key)
    }

    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        TypeInterner::lookup(self, id)
    }

    fn intern_string(&self, s: &str) -> Atom {
        TypeInterner::intern_string(self, s)
    }

    fn resolve_atom(&self, atom: Atom) -> String {
        TypeInterner::resolve_atom(self, atom)
    }

    fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        TypeInterner::resolve_atom_ref(self, atom)
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        TypeInterner::type_list(self, id)
    }

    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        TypeInterner::tuple_list(self, id)
    }

    fn template_list(&self, id: TemplateLiteralId) -> Arc<[TemplateSpan]> {
        TypeInterner::template_list(self, id)
    }

    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        TypeInterner::object_shape(self, id)
    }

    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        TypeInterner::function_shape(self, id)
    }

    fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType> {
        TypeInterner::conditional_type(self, id)
    }

    fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType> {
        TypeInterner::mapped_type(self, id)
    }

    fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication> {
        TypeInterner::type_application(self, id)
    }

    fn display_order(&self, id: ObjectShapeId) -> Option<Arc<[Atom]>> {
        TypeInterner::display_order(self, id)
    }

    fn literal_string(&self, value: &str) -> TypeId {
        TypeInterner::literal_string(self, value)
    }

    fn literal_string_atom(&self, atom: Atom) -> TypeId {
        TypeInterner::literal_string_atom(self, atom)
    }

    fn literal_number(&self, value: f64) -> TypeId {
        TypeInterner::literal_number(self, value)
    }

    fn literal_text(&self, type_id: TypeId) -> Option<String> {
        TypeInterner::literal_text(self, type_id)
    }

    fn union(&self, members: Vec<TypeId>) -> TypeId {
        TypeInterner::union(self, members)
    }

    fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        TypeInterner::union2(self, left, right)
    }

    fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        TypeInterner::intersection(self, members)
    }

    fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId {
        TypeInterner::intersection2(self, left, right)
    }

    fn array(&self, element: TypeId) -> TypeId {
        TypeInterner::array(self, element)
    }

    fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        TypeInterner::tuple(self, elements)
    }

    fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        TypeInterner::object(self, properties)
    }

    fn function(&self, shape: FunctionShape) -> TypeId {
        TypeInterner::function(self, shape)
    }

    fn type_param(&self, info: TypeParamInfo) -> TypeId {
        TypeInterner::type_param(self, info)
    }

    fn infer(&self, info: TypeParamInfo) -> TypeId {
        TypeInterner::infer(self, info)
    }

    fn conditional(&self, conditional: ConditionalType) -> TypeId {
        TypeInterner::conditional(self, conditional)
    }

    fn mapped(&self, mapped: MappedType) -> TypeId {
        TypeInterner::mapped(self, mapped)
    }

    fn keyof(&self, operand: TypeId) -> TypeId {
        TypeInterner::keyof(self, operand)
    }

    fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        TypeInterner::index_access(self, object, index)
    }

    fn template_literal(&self, spans: Vec<TemplateSpan>) -> TypeId {
        TypeInterner::template_literal(self, spans)
    }

    fn string_intrinsic(&self, kind: StringIntrinsicKind, type_arg: TypeId) -> TypeId {
        TypeInterner::string_intrinsic(self, kind, type_arg)
    }

    fn lazy(&self, def_id: DefId) -> TypeId {
        TypeInterner::lazy(self, def_id)
    }

    fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        TypeInterner::application(self, base, args)
    }
}
