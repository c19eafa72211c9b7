//! Family lookup against the font database.

use fontdb::{Database, Family, ID, Query};

/// Resolve `family_name` to a face at normal weight and style.
pub fn query_family(db: &Database, family_name: &str) -> Option<ID> {
    let query = Query {
        families: &[Family::Name(family_name)],
        weight: fontdb::Weight::NORMAL,
        style: fontdb::Style::Normal,
        ..Query::default()
    };
    db.query(&query)
}

/// Canonical family name as recorded by the database, for case-insensitive
/// lookups ("noto color emoji" -> "Noto Color Emoji").
pub fn canonical_family(db: &Database, family_name: &str) -> Option<String> {
    db.faces()
        .flat_map(|face| face.families.iter())
        .find(|(name, _)| name.eq_ignore_ascii_case(family_name))
        .map(|(name, _)| name.clone())
}
