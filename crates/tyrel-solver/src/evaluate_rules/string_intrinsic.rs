//! `Uppercase`, `Lowercase`, `Capitalize` and `Uncapitalize`.

use crate::def::TypeResolver;
use crate::evaluate::TypeEvaluator;
use crate::types::*;

pub(crate) fn apply_string_intrinsic(kind: StringIntrinsicKind, text: &str) -> String {
    match kind {
        StringIntrinsicKind::Uppercase => text.to_uppercase(),
        StringIntrinsicKind::Lowercase => text.to_lowercase(),
        StringIntrinsicKind::Capitalize => map_first_char(text, char::to_uppercase),
        StringIntrinsicKind::Uncapitalize => map_first_char(text, char::to_lowercase),
    }
}

fn map_first_char<I>(text: &str, f: impl Fn(char) -> I) -> String
where
    I: Iterator<Item = char>,
{
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => f(first).chain(chars).collect(),
        None => String::new(),
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    pub(crate) fn evaluate_string_intrinsic(
        &mut self,
        kind: StringIntrinsicKind,
        type_arg: TypeId,
    ) -> TypeId {
        let interner = self.interner();
        let arg = self.evaluate(type_arg);
        match arg {
            TypeId::NEVER => return TypeId::NEVER,
            TypeId::ANY => return TypeId::ANY,
            TypeId::ERROR => return TypeId::ERROR,
            _ => {}
        }

        match interner.lookup(arg) {
            Some(TypeData::Literal(LiteralValue::String(atom))) => {
                let text = interner.resolve_atom_ref(atom);
                interner.literal_string(&apply_string_intrinsic(kind, &text))
            }
            Some(TypeData::Union(list_id)) => {
                let members: Vec<TypeId> = interner.type_list(list_id).to_vec();
                let results = members
                    .into_iter()
                    .map(|member| {
                        let applied = interner.string_intrinsic(kind, member);
                        self.evaluate(applied)
                    })
                    .collect();
                interner.union(results)
            }
            Some(TypeData::TemplateLiteral(list_id)) => {
                let spans = interner.template_list(list_id);
                let mut mapped = Vec::with_capacity(spans.len());
                for (idx, span) in spans.iter().enumerate() {
                    // Capitalize and Uncapitalize only touch the leading span.
                    let applies = matches!(
                        kind,
                        StringIntrinsicKind::Uppercase | StringIntrinsicKind::Lowercase
                    ) || idx == 0;
                    mapped.push(match (*span, applies) {
                        (TemplateSpan::Text(text), true) => {
                            let text = interner.resolve_atom_ref(text);
                            TemplateSpan::Text(interner.intern_string(&apply_string_intrinsic(kind, &text)))
                        }
                        (TemplateSpan::Type(inner), true) => {
                            TemplateSpan::Type(interner.string_intrinsic(kind, inner))
                        }
                        (span, false) => span,
                    });
                }
                interner.template_literal(mapped)
            }
            _ => interner.string_intrinsic(kind, arg),
        }
    }
}
