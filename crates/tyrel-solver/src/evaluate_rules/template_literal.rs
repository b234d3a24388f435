//! Template literal evaluation and decomposition.
//!
//! Evaluation expands union spans into a union of templates (the cartesian
//! product, bounded by `template_expansion_limit`). Decomposition splits a
//! literal string along a template's text spans, for `infer` matching and
//! for relating literals to template patterns.

use crate::db::TypeDatabase;
use crate::def::TypeResolver;
use crate::diagnostics::Rejection;
use crate::evaluate::TypeEvaluator;
use crate::types::*;
use tracing::debug;

use super::string_intrinsic::apply_string_intrinsic;

enum Part {
    Text(String),
    Hole,
}

/// Split `text` along the text spans of a template.
///
/// Returns one capture per type span, in order. A hole followed by text
/// captures up to the earliest occurrence of that text; a hole followed by
/// another hole captures a single character; the last hole takes the rest.
pub(crate) fn decompose_template(
    db: &dyn TypeDatabase,
    text: &str,
    spans: &[TemplateSpan],
) -> Option<Vec<String>> {
    let parts: Vec<Part> = spans
        .iter()
        .map(|span| match span {
            TemplateSpan::Text(atom) => Part::Text(db.resolve_atom(*atom)),
            TemplateSpan::Type(_) => Part::Hole,
        })
        .collect();

    let mut rest = text;
    let mut start = 0;
    let mut end = parts.len();
    if let Some(Part::Text(prefix)) = parts.first() {
        rest = rest.strip_prefix(prefix.as_str())?;
        start = 1;
    }
    if end > start
        && let Some(Part::Text(suffix)) = parts.last()
    {
        rest = rest.strip_suffix(suffix.as_str())?;
        end -= 1;
    }

    let mut captures = Vec::new();
    let mut idx = start;
    while idx < end {
        match &parts[idx] {
            Part::Text(fragment) => {
                rest = rest.strip_prefix(fragment.as_str())?;
                idx += 1;
            }
            Part::Hole => {
                let next = if idx + 1 < end { parts.get(idx + 1) } else { None };
                match next {
                    Some(Part::Text(delimiter)) => {
                        let pos = rest.find(delimiter.as_str())?;
                        captures.push(rest[..pos].to_string());
                        rest = &rest[pos + delimiter.len()..];
                        idx += 2;
                    }
                    Some(Part::Hole) => {
                        let split = rest.chars().next().map_or(0, char::len_utf8);
                        captures.push(rest[..split].to_string());
                        rest = &rest[split..];
                        idx += 1;
                    }
                    None => {
                        captures.push(rest.to_string());
                        rest = "";
                        idx += 1;
                    }
                }
            }
        }
    }

    rest.is_empty().then_some(captures)
}

/// Text that `${number}` accepts.
pub(crate) fn is_numeric_text(text: &str) -> bool {
    !text.is_empty()
        && text.trim() == text
        && text.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Whether a captured piece of text is an inhabitant of a span type.
pub(crate) fn text_matches_type(db: &dyn TypeDatabase, text: &str, type_id: TypeId) -> bool {
    match type_id {
        TypeId::STRING | TypeId::ANY | TypeId::UNKNOWN => return true,
        TypeId::NUMBER => return is_numeric_text(text),
        TypeId::BIGINT => {
            let digits = text.strip_prefix('-').unwrap_or(text);
            return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
        }
        TypeId::BOOLEAN => return text == "true" || text == "false",
        TypeId::NEVER => return false,
        _ => {}
    }
    if let Some(literal) = db.literal_text(type_id) {
        return literal == text;
    }
    match db.lookup(type_id) {
        Some(TypeData::Union(list_id)) => db
            .type_list(list_id)
            .iter()
            .any(|&member| text_matches_type(db, text, member)),
        Some(TypeData::TemplateLiteral(list_id)) => {
            let spans = db.template_list(list_id);
            let Some(captures) = decompose_template(db, text, &spans) else {
                return false;
            };
            let holes = spans.iter().filter_map(|span| match span {
                TemplateSpan::Type(hole) => Some(*hole),
                TemplateSpan::Text(_) => None,
            });
            captures
                .iter()
                .zip(holes)
                .all(|(capture, hole)| text_matches_type(db, capture, hole))
        }
        Some(TypeData::StringIntrinsic { kind, type_arg }) => {
            apply_string_intrinsic(kind, text) == text && text_matches_type(db, text, type_arg)
        }
        _ => false,
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate a template literal type.
    ///
    /// Spans are evaluated; spans that evaluate to unions of literals are
    /// expanded so `` `a${"x" | "y"}` `` becomes `"ax" | "ay"`.
    pub(crate) fn evaluate_template_literal(
        &mut self,
        type_id: TypeId,
        list_id: TemplateLiteralId,
    ) -> TypeId {
        let interner = self.interner();
        let spans = interner.template_list(list_id);

        let mut alternatives: Vec<Vec<TemplateSpan>> = Vec::with_capacity(spans.len());
        let mut product: usize = 1;
        for span in spans.iter() {
            let options = match span {
                TemplateSpan::Text(text) => vec![TemplateSpan::Text(*text)],
                TemplateSpan::Type(inner) => {
                    let evaluated = self.evaluate(*inner);
                    self.template_span_alternatives(evaluated)
                }
            };
            if options.is_empty() {
                return TypeId::NEVER;
            }
            product = product.saturating_mul(options.len());
            if product > self.options().template_expansion_limit {
                debug!(type_id = type_id.0, product, "template literal expansion too large");
                self.reject(Rejection::DepthExceeded { type_id });
                return TypeId::ERROR;
            }
            alternatives.push(options);
        }

        let mut combinations: Vec<Vec<TemplateSpan>> = vec![Vec::new()];
        for options in &alternatives {
            let mut next = Vec::with_capacity(combinations.len() * options.len());
            for prefix in &combinations {
                for option in options {
                    let mut combination = prefix.clone();
                    combination.push(*option);
                    next.push(combination);
                }
            }
            combinations = next;
        }

        let results = combinations
            .into_iter()
            .map(|combination| interner.template_literal(combination))
            .collect();
        interner.union(results)
    }

    /// Span choices for one evaluated hole: each literal member separately,
    /// `boolean` as `true` and `false`, anything else kept as a hole.
    fn template_span_alternatives(&self, evaluated: TypeId) -> Vec<TemplateSpan> {
        let interner = self.interner();
        let members = match evaluated {
            TypeId::BOOLEAN => vec![TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN_FALSE],
            TypeId::NEVER => return Vec::new(),
            _ => match interner.lookup(evaluated) {
                Some(TypeData::Union(list_id)) => interner.type_list(list_id).to_vec(),
                _ => return vec![TemplateSpan::Type(evaluated)],
            },
        };
        members
            .into_iter()
            .flat_map(|member| {
                if member == TypeId::BOOLEAN {
                    vec![
                        TemplateSpan::Type(TypeId::BOOLEAN_TRUE),
                        TemplateSpan::Type(TypeId::BOOLEAN_FALSE),
                    ]
                } else {
                    vec![TemplateSpan::Type(member)]
                }
            })
            .collect()
    }
}
