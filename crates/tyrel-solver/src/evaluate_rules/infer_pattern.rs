//! Infer pattern matching for conditional types.
//!
//! Matches a source type against an `extends` pattern that declares `infer`
//! placeholders, collecting the bindings. Matching is structural: records
//! by attribute, tuples by position (with one rest capture), functions by
//! parameter and return, template literals by decomposing the text.
//!
//! A failed match leaves no partial bindings observable: the caller drops
//! the binding map and takes the false branch.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::objects::merge_record_members;
use crate::type_queries::{contains_infer_types, union_members};
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::trace;
use tyrel_common::interner::Atom;

use super::template_literal::{decompose_template, text_matches_type};

/// Placeholder name to bound type.
pub(crate) type InferBindings = FxHashMap<Atom, TypeId>;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Match `source` against `pattern`, extending `bindings`.
    pub(crate) fn match_infer_pattern(
        &mut self,
        source: TypeId,
        pattern: TypeId,
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        if !contains_infer_types(interner, pattern) {
            return self.is_subtype(source, pattern);
        }
        let source = self.evaluate(source);
        let Some(pattern_key) = interner.lookup(pattern) else {
            return false;
        };

        match pattern_key {
            TypeData::Infer(info) => self.bind_infer(&info, source, bindings),
            TypeData::Object(shape_id) => {
                let shape = interner.object_shape(shape_id);
                self.match_object_pattern(source, &shape.properties, bindings)
            }
            TypeData::Tuple(list_id) => {
                let elements = interner.tuple_list(list_id);
                self.match_tuple_pattern(source, &elements, bindings)
            }
            TypeData::Array(element) => self.match_array_pattern(source, element, bindings),
            TypeData::Function(shape_id) => {
                let shape = interner.function_shape(shape_id);
                self.match_function_pattern(source, &shape, bindings)
            }
            TypeData::Union(list_id) => {
                let members = interner.type_list(list_id);
                self.match_union_pattern(source, &members, bindings)
            }
            TypeData::Intersection(list_id) => {
                let members = interner.type_list(list_id);
                members
                    .iter()
                    .all(|&member| self.match_infer_pattern(source, member, bindings))
            }
            TypeData::TemplateLiteral(list_id) => {
                let spans = interner.template_list(list_id);
                self.match_template_pattern(source, &spans, bindings)
            }
            _ => self.is_subtype(source, pattern),
        }
    }

    /// Bind a placeholder; a second binding of the same name unions.
    fn bind_infer(
        &mut self,
        info: &TypeParamInfo,
        source: TypeId,
        bindings: &mut InferBindings,
    ) -> bool {
        if let Some(constraint) = info.constraint {
            let constraint = self.evaluate(constraint);
            if !self.is_subtype(source, constraint) {
                trace!(source = source.0, "infer candidate violates its constraint");
                return false;
            }
        }
        let bound = match bindings.get(&info.name) {
            Some(&existing) => self.interner().union2(existing, source),
            None => source,
        };
        bindings.insert(info.name, bound);
        true
    }

    fn match_object_pattern(
        &mut self,
        source: TypeId,
        pattern_props: &[PropertyInfo],
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        let source = match interner.lookup(source) {
            Some(TypeData::Object(_)) => source,
            Some(TypeData::Intersection(list_id)) => {
                let members = interner.type_list(list_id);
                match merge_record_members(interner, &members) {
                    Some(merged) => merged,
                    None => return false,
                }
            }
            _ => return false,
        };
        let Some(TypeData::Object(shape_id)) = interner.lookup(source) else {
            return false;
        };
        let shape = interner.object_shape(shape_id);

        for pattern_prop in pattern_props {
            match shape.property(pattern_prop.name) {
                Some(source_prop) => {
                    if source_prop.optional && !pattern_prop.optional {
                        return false;
                    }
                    if !self.match_infer_pattern(source_prop.type_id, pattern_prop.type_id, bindings)
                    {
                        return false;
                    }
                }
                // Unmatched optional attributes leave their placeholders unbound.
                None if pattern_prop.optional => {}
                None => return false,
            }
        }
        true
    }

    fn match_tuple_pattern(
        &mut self,
        source: TypeId,
        pattern: &[TupleElement],
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        let rest_index = pattern.iter().position(|element| element.rest);

        let source_elements: Vec<TupleElement> = match interner.lookup(source) {
            Some(TypeData::Tuple(list_id)) => interner.tuple_list(list_id).to_vec(),
            // `E[] extends [...infer R]` binds `R = E[]`.
            Some(TypeData::Array(_)) => {
                return match pattern {
                    [only] if only.rest => self.match_infer_pattern(source, only.type_id, bindings),
                    _ => false,
                };
            }
            _ => return false,
        };
        if source_elements.iter().any(|element| element.rest) {
            return rest_index.is_some_and(|idx| {
                pattern.len() == 1 && self.match_infer_pattern(source, pattern[idx].type_id, bindings)
            });
        }

        let Some(rest_index) = rest_index else {
            if source_elements.len() > pattern.len() {
                return false;
            }
            for (idx, pattern_element) in pattern.iter().enumerate() {
                match source_elements.get(idx) {
                    Some(source_element) => {
                        if source_element.optional && !pattern_element.optional {
                            return false;
                        }
                        if !self.match_infer_pattern(
                            source_element.type_id,
                            pattern_element.type_id,
                            bindings,
                        ) {
                            return false;
                        }
                    }
                    None if pattern_element.optional => {}
                    None => return false,
                }
            }
            return true;
        };

        let prefix = &pattern[..rest_index];
        let suffix = &pattern[rest_index + 1..];
        if source_elements.len() < prefix.len() + suffix.len() {
            return false;
        }
        let suffix_start = source_elements.len() - suffix.len();

        for (pattern_element, source_element) in prefix.iter().zip(&source_elements) {
            if !self.match_infer_pattern(source_element.type_id, pattern_element.type_id, bindings) {
                return false;
            }
        }
        for (pattern_element, source_element) in suffix.iter().zip(&source_elements[suffix_start..]) {
            if !self.match_infer_pattern(source_element.type_id, pattern_element.type_id, bindings) {
                return false;
            }
        }

        let middle = interner.tuple(source_elements[prefix.len()..suffix_start].to_vec());
        self.match_infer_pattern(middle, pattern[rest_index].type_id, bindings)
    }

    fn match_array_pattern(
        &mut self,
        source: TypeId,
        element_pattern: TypeId,
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        match interner.lookup(source) {
            Some(TypeData::Array(element)) => {
                self.match_infer_pattern(element, element_pattern, bindings)
            }
            Some(TypeData::Tuple(list_id)) => {
                let members: Vec<TypeId> = interner
                    .tuple_list(list_id)
                    .iter()
                    .map(|element| {
                        match (element.rest, interner.lookup(element.type_id)) {
                            (true, Some(TypeData::Array(inner))) => inner,
                            _ => element.type_id,
                        }
                    })
                    .collect();
                let element = interner.union(members);
                self.match_infer_pattern(element, element_pattern, bindings)
            }
            _ => false,
        }
    }

    fn match_function_pattern(
        &mut self,
        source: TypeId,
        pattern: &FunctionShape,
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        let Some(TypeData::Function(shape_id)) = interner.lookup(source) else {
            return false;
        };
        let mut shape = (*interner.function_shape(shape_id)).clone();

        // Generic sources are matched with their parameters erased to constraints.
        if !shape.type_params.is_empty() {
            let mut erasure = TypeSubstitution::new();
            for param in &shape.type_params {
                erasure.insert(param.name, param.constraint.unwrap_or(TypeId::UNKNOWN));
            }
            for param in &mut shape.params {
                param.type_id = instantiate_type(interner, param.type_id, &erasure);
            }
            shape.return_type = instantiate_type(interner, shape.return_type, &erasure);
        }

        let pattern_has_rest = pattern.params.iter().any(|param| param.rest);
        let required_source = shape
            .params
            .iter()
            .filter(|param| !param.optional && !param.rest)
            .count();
        if !pattern_has_rest && required_source > pattern.params.len() {
            return false;
        }

        for (idx, pattern_param) in pattern.params.iter().enumerate() {
            if pattern_param.rest {
                let remaining: Vec<TupleElement> = shape
                    .params
                    .iter()
                    .skip(idx)
                    .map(|param| TupleElement {
                        type_id: param.type_id,
                        optional: param.optional,
                        rest: param.rest,
                    })
                    .collect();
                let captured = interner.tuple(remaining);
                if !self.match_infer_pattern(captured, pattern_param.type_id, bindings) {
                    return false;
                }
                break;
            }
            if let Some(source_param) = shape.params.get(idx)
                && !self.match_infer_pattern(source_param.type_id, pattern_param.type_id, bindings)
            {
                return false;
            }
        }

        self.match_infer_pattern(shape.return_type, pattern.return_type, bindings)
    }

    /// `S extends infer X | U`: source members covered by the concrete
    /// members are stripped, the rest is matched against the placeholder part.
    fn match_union_pattern(
        &mut self,
        source: TypeId,
        members: &[TypeId],
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        let (inferring, concrete): (Vec<TypeId>, Vec<TypeId>) = members
            .iter()
            .partition(|&&member| contains_infer_types(interner, member));
        let source_members = union_members(interner, source).unwrap_or_else(|| vec![source]);

        let mut remaining = Vec::new();
        for member in source_members {
            let covered = concrete
                .iter()
                .any(|&target| self.is_subtype(member, target));
            if !covered {
                remaining.push(member);
            }
        }

        match inferring.as_slice() {
            [single] => {
                let rest = interner.union(remaining);
                self.match_infer_pattern(rest, *single, bindings)
            }
            _ => remaining.into_iter().all(|member| {
                inferring.iter().any(|&candidate| {
                    let mut scratch = bindings.clone();
                    let matched = self.match_infer_pattern(member, candidate, &mut scratch);
                    if matched {
                        *bindings = scratch;
                    }
                    matched
                })
            }),
        }
    }

    fn match_template_pattern(
        &mut self,
        source: TypeId,
        spans: &[TemplateSpan],
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        if let Some(members) = union_members(interner, source) {
            return members
                .into_iter()
                .all(|member| self.match_template_pattern(member, spans, bindings));
        }
        if source == TypeId::STRING {
            return match spans {
                [TemplateSpan::Type(only)] => match interner.lookup(*only) {
                    Some(TypeData::Infer(info)) => self.bind_infer(&info, TypeId::STRING, bindings),
                    _ => false,
                },
                _ => false,
            };
        }
        let Some(text) = interner.literal_text(source) else {
            return false;
        };
        if !matches!(
            interner.lookup(source),
            Some(TypeData::Literal(LiteralValue::String(_)))
        ) {
            return false;
        }
        let Some(captures) = decompose_template(interner, &text, spans) else {
            return false;
        };

        let holes = spans.iter().filter_map(|span| match span {
            TemplateSpan::Type(type_id) => Some(*type_id),
            TemplateSpan::Text(_) => None,
        });
        for (capture, hole) in captures.iter().zip(holes) {
            if !self.match_template_capture(capture, hole, bindings) {
                return false;
            }
        }
        true
    }

    fn match_template_capture(
        &mut self,
        capture: &str,
        hole: TypeId,
        bindings: &mut InferBindings,
    ) -> bool {
        let interner = self.interner();
        match interner.lookup(hole) {
            Some(TypeData::Infer(info)) => {
                let candidate = match info.constraint {
                    // `${infer N extends number}` captures the numeric literal.
                    Some(TypeId::NUMBER) => match capture.parse::<f64>() {
                        Ok(value)
                            if value.is_finite()
                                && crate::intern::format_number(value) == capture =>
                        {
                            interner.literal_number(value)
                        }
                        _ => return false,
                    },
                    _ => interner.literal_string(capture),
                };
                self.bind_infer(&info, candidate, bindings)
            }
            Some(_) if contains_infer_types(interner, hole) => {
                let literal = interner.literal_string(capture);
                self.match_infer_pattern(literal, hole, bindings)
            }
            _ => text_matches_type(interner, capture, hole),
        }
    }
}
