//! Type formatting for diagnostics and debug output.
//!
//! Records print their attributes in declaration order; everything else
//! prints in the usual structural surface syntax.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::intern::format_number;
use crate::objects::ordered_properties;
use crate::types::*;

const MAX_FORMAT_DEPTH: u32 = 32;

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    resolver: Option<&'a dyn TypeResolver>,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        TypeFormatter { db, resolver: None }
    }

    /// Print alias references by their registered names.
    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn format(&self, type_id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, type_id, 0);
        out
    }

    fn write_type(&self, out: &mut String, type_id: TypeId, depth: u32) {
        if depth > MAX_FORMAT_DEPTH {
            out.push_str("...");
            return;
        }
        let Some(key) = self.db.lookup(type_id) else {
            out.push_str("<unknown>");
            return;
        };
        let depth = depth + 1;
        match key {
            TypeData::Intrinsic(kind) => out.push_str(kind.name()),
            TypeData::Literal(LiteralValue::String(atom)) => {
                write_quoted(out, &self.db.resolve_atom_ref(atom));
            }
            TypeData::Literal(LiteralValue::Number(value)) => {
                out.push_str(&format_number(value.0));
            }
            TypeData::Literal(LiteralValue::Boolean(value)) => {
                out.push_str(if value { "true" } else { "false" });
            }
            TypeData::Object(shape_id) => {
                let properties = ordered_properties(self.db, shape_id);
                if properties.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{ ");
                for (idx, prop) in properties.iter().enumerate() {
                    if idx > 0 {
                        out.push_str("; ");
                    }
                    if prop.readonly {
                        out.push_str("readonly ");
                    }
                    write_property_name(out, &self.db.resolve_atom_ref(prop.name));
                    if prop.optional {
                        out.push('?');
                    }
                    out.push_str(": ");
                    self.write_type(out, prop.type_id, depth);
                }
                out.push_str(" }");
            }
            TypeData::Union(list_id) => self.write_list(out, &self.db.type_list(list_id), " | ", depth),
            TypeData::Intersection(list_id) => {
                self.write_list(out, &self.db.type_list(list_id), " & ", depth)
            }
            TypeData::Array(element) => {
                self.write_operand(out, element, depth);
                out.push_str("[]");
            }
            TypeData::Tuple(list_id) => {
                out.push('[');
                for (idx, element) in self.db.tuple_list(list_id).iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    if element.rest {
                        out.push_str("...");
                    }
                    self.write_type(out, element.type_id, depth);
                    if element.optional {
                        out.push('?');
                    }
                }
                out.push(']');
            }
            TypeData::Function(shape_id) => {
                let shape = self.db.function_shape(shape_id);
                self.write_type_params(out, &shape.type_params, depth);
                out.push('(');
                for (idx, param) in shape.params.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    if param.rest {
                        out.push_str("...");
                    }
                    match param.name {
                        Some(name) => out.push_str(&self.db.resolve_atom_ref(name)),
                        None => out.push_str(&format!("arg{idx}")),
                    }
                    if param.optional {
                        out.push('?');
                    }
                    out.push_str(": ");
                    self.write_type(out, param.type_id, depth);
                }
                out.push_str(") => ");
                self.write_type(out, shape.return_type, depth);
            }
            TypeData::TypeParameter(info) => out.push_str(&self.db.resolve_atom_ref(info.name)),
            TypeData::Infer(info) => {
                out.push_str("infer ");
                out.push_str(&self.db.resolve_atom_ref(info.name));
                if let Some(constraint) = info.constraint {
                    out.push_str(" extends ");
                    self.write_type(out, constraint, depth);
                }
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.db.conditional_type(cond_id);
                self.write_operand(out, cond.check_type, depth);
                out.push_str(" extends ");
                self.write_operand(out, cond.extends_type, depth);
                out.push_str(" ? ");
                self.write_type(out, cond.true_type, depth);
                out.push_str(" : ");
                self.write_type(out, cond.false_type, depth);
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.db.mapped_type(mapped_id);
                out.push_str("{ ");
                match mapped.readonly_modifier {
                    Some(MappedModifier::Add) => out.push_str("readonly "),
                    Some(MappedModifier::Remove) => out.push_str("-readonly "),
                    None => {}
                }
                out.push('[');
                out.push_str(&self.db.resolve_atom_ref(mapped.type_param.name));
                out.push_str(" in ");
                self.write_type(out, mapped.constraint, depth);
                if let Some(name_type) = mapped.name_type {
                    out.push_str(" as ");
                    self.write_type(out, name_type, depth);
                }
                out.push(']');
                match mapped.optional_modifier {
                    Some(MappedModifier::Add) => out.push('?'),
                    Some(MappedModifier::Remove) => out.push_str("-?"),
                    None => {}
                }
                out.push_str(": ");
                self.write_type(out, mapped.template, depth);
                out.push_str(" }");
            }
            TypeData::KeyOf(operand) => {
                out.push_str("keyof ");
                self.write_operand(out, operand, depth);
            }
            TypeData::IndexAccess(object, index) => {
                self.write_operand(out, object, depth);
                out.push('[');
                self.write_type(out, index, depth);
                out.push(']');
            }
            TypeData::TemplateLiteral(list_id) => {
                out.push('`');
                for span in self.db.template_list(list_id).iter() {
                    match span {
                        TemplateSpan::Text(text) => {
                            out.push_str(&self.db.resolve_atom_ref(*text).replace('`', "\\`"))
                        }
                        TemplateSpan::Type(inner) => {
                            out.push_str("${");
                            self.write_type(out, *inner, depth);
                            out.push('}');
                        }
                    }
                }
                out.push('`');
            }
            TypeData::StringIntrinsic { kind, type_arg } => {
                out.push_str(kind.name());
                out.push('<');
                self.write_type(out, type_arg, depth);
                out.push('>');
            }
            TypeData::Lazy(def_id) => {
                match self.resolver.and_then(|r| r.def_name(def_id)) {
                    Some(name) => out.push_str(&self.db.resolve_atom_ref(name)),
                    None => out.push_str(&format!("def#{}", def_id.0)),
                }
            }
            TypeData::Application(app_id) => {
                let app = self.db.type_application(app_id);
                self.write_type(out, app.base, depth);
                out.push('<');
                self.write_list(out, &app.args, ", ", depth);
                out.push('>');
            }
        }
    }

    fn write_list(&self, out: &mut String, members: &[TypeId], separator: &str, depth: u32) {
        for (idx, &member) in members.iter().enumerate() {
            if idx > 0 {
                out.push_str(separator);
            }
            if separator == ", " {
                self.write_type(out, member, depth);
            } else {
                self.write_operand(out, member, depth);
            }
        }
    }

    fn write_type_params(&self, out: &mut String, params: &[TypeParamInfo], depth: u32) {
        if params.is_empty() {
            return;
        }
        out.push('<');
        for (idx, param) in params.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.db.resolve_atom_ref(param.name));
            if let Some(constraint) = param.constraint {
                out.push_str(" extends ");
                self.write_type(out, constraint, depth);
            }
        }
        out.push('>');
    }

    /// Operand position: compound types are parenthesised.
    fn write_operand(&self, out: &mut String, type_id: TypeId, depth: u32) {
        let needs_parens = matches!(
            self.db.lookup(type_id),
            Some(
                TypeData::Union(_)
                    | TypeData::Intersection(_)
                    | TypeData::Function(_)
                    | TypeData::Conditional(_)
                    | TypeData::KeyOf(_)
            )
        );
        if needs_parens {
            out.push('(');
            self.write_type(out, type_id, depth);
            out.push(')');
        } else {
            self.write_type(out, type_id, depth);
        }
    }
}

fn write_quoted(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn write_property_name(out: &mut String, name: &str) {
    let is_identifier = !name.is_empty()
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    let is_numeric = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
    if is_identifier || is_numeric {
        out.push_str(name);
    } else {
        write_quoted(out, name);
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
