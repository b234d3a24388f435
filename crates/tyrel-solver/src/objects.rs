//! Record helpers: ordered attribute access, intersection merging and
//! override merging.

use crate::db::TypeDatabase;
use crate::diagnostics::Rejection;
use crate::types::*;
use rustc_hash::FxHashMap;
use tyrel_common::interner::Atom;

/// Build a record, rejecting repeated attribute names.
///
/// [`TypeDatabase::object`] keeps the first of several same-named
/// attributes; declarations go through here instead.
pub fn checked_record(db: &dyn TypeDatabase, properties: Vec<PropertyInfo>) -> Result<TypeId, Rejection> {
    let mut seen: Vec<Atom> = Vec::with_capacity(properties.len());
    for prop in &properties {
        if seen.contains(&prop.name) {
            return Err(Rejection::DuplicateAttribute { name: prop.name });
        }
        seen.push(prop.name);
    }
    Ok(db.object(properties))
}

/// Attributes of a record shape in display order.
///
/// Falls back to the canonical (sorted) order when no declaration order was
/// recorded for the shape.
pub fn ordered_properties(db: &dyn TypeDatabase, shape_id: ObjectShapeId) -> Vec<PropertyInfo> {
    let shape = db.object_shape(shape_id);
    let Some(order) = db.display_order(shape_id) else {
        return shape.properties.clone();
    };
    let mut ordered: Vec<PropertyInfo> = order
        .iter()
        .filter_map(|name| shape.property(*name).cloned())
        .collect();
    if ordered.len() != shape.properties.len() {
        // Order table belongs to a different declaration; keep canonical order.
        ordered = shape.properties.clone();
    }
    ordered
}

/// Attributes of a record type in display order, `None` for non-records.
pub fn record_properties(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Vec<PropertyInfo>> {
    match db.lookup(type_id)? {
        TypeData::Object(shape_id) => Some(ordered_properties(db, shape_id)),
        _ => None,
    }
}

/// Merge attribute lists as an intersection does.
///
/// An attribute present in several lists gets the intersection of its value
/// types, is readonly if any occurrence is readonly and optional only if
/// every occurrence is optional. First occurrence fixes the position.
pub fn merge_properties(db: &dyn TypeDatabase, lists: &[Vec<PropertyInfo>]) -> Vec<PropertyInfo> {
    let mut merged: Vec<PropertyInfo> = Vec::new();
    let mut positions: FxHashMap<Atom, usize> = FxHashMap::default();
    for list in lists {
        for prop in list {
            match positions.get(&prop.name) {
                Some(&idx) => {
                    let existing = &mut merged[idx];
                    existing.type_id = db.intersection2(existing.type_id, prop.type_id);
                    existing.readonly |= prop.readonly;
                    existing.optional &= prop.optional;
                }
                None => {
                    positions.insert(prop.name, merged.len());
                    merged.push(prop.clone());
                }
            }
        }
    }
    merged
}

/// Merge an intersection whose members are all records into one record.
pub fn merge_record_members(db: &dyn TypeDatabase, members: &[TypeId]) -> Option<TypeId> {
    let lists = members
        .iter()
        .map(|&member| record_properties(db, member))
        .collect::<Option<Vec<_>>>()?;
    Some(db.object(merge_properties(db, &lists)))
}

/// Record with `overlay`'s attributes replacing `base`'s on name clashes.
pub fn override_properties(
    base: &[PropertyInfo],
    overlay: &[PropertyInfo],
) -> Vec<PropertyInfo> {
    let mut result: Vec<PropertyInfo> = base
        .iter()
        .filter(|prop| !overlay.iter().any(|o| o.name == prop.name))
        .cloned()
        .collect();
    result.extend(overlay.iter().cloned());
    result
}

/// Union of the attribute names as string literal types.
pub fn key_union(db: &dyn TypeDatabase, properties: &[PropertyInfo]) -> TypeId {
    db.union(
        properties
            .iter()
            .map(|prop| db.literal_string_atom(prop.name))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeInterner;

    #[test]
    fn test_ordered_properties_follow_declaration() {
        let interner = TypeInterner::new();
        let z = interner.intern_string("z");
        let a = interner.intern_string("a");
        let record = interner.object(vec![
            PropertyInfo::new(z, TypeId::NUMBER),
            PropertyInfo::new(a, TypeId::STRING),
        ]);
        let props = record_properties(&interner, record).unwrap();
        assert_eq!(props[0].name, z);
        assert_eq!(props[1].name, a);
    }

    #[test]
    fn test_merge_properties_required_wins_readonly_accumulates() {
        let interner = TypeInterner::new();
        let a = interner.intern_string("a");
        let left = vec![PropertyInfo::new(a, TypeId::NUMBER).optional()];
        let right = vec![PropertyInfo::new(a, TypeId::NUMBER).readonly()];
        let merged = merge_properties(&interner, &[left, right]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].readonly);
        assert!(!merged[0].optional);
        assert_eq!(merged[0].type_id, TypeId::NUMBER);
    }

    #[test]
    fn test_checked_record_rejects_duplicates() {
        let interner = TypeInterner::new();
        let a = interner.intern_string("a");
        let duplicate = checked_record(
            &interner,
            vec![
                PropertyInfo::new(a, TypeId::NUMBER),
                PropertyInfo::new(a, TypeId::STRING),
            ],
        );
        assert_eq!(duplicate, Err(Rejection::DuplicateAttribute { name: a }));
        let single = checked_record(&interner, vec![PropertyInfo::new(a, TypeId::NUMBER)]);
        assert!(single.is_ok());
    }

    #[test]
    fn test_override_replaces_clashing_names() {
        let interner = TypeInterner::new();
        let a = interner.intern_string("a");
        let b = interner.intern_string("b");
        let base = vec![
            PropertyInfo::new(a, TypeId::NUMBER),
            PropertyInfo::new(b, TypeId::NUMBER),
        ];
        let overlay = vec![PropertyInfo::new(a, TypeId::STRING)];
        let result = override_properties(&base, &overlay);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, b);
        assert_eq!(result[1].type_id, TypeId::STRING);
    }
}
