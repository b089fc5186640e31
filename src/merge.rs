use crate::editor::AttributeRow;
use crate::meta::MetaValue;

/// What the row buffer falls back to when a stored blob is absent, null, or
/// not an object. Which one applies depends on the call site: the metadata
/// modal wants the canonical scaffold, a raw JSON viewer wants a single
/// blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFallback {
    CanonicalDefaults,
    SingleEmptyRow,
}

/// Merge a stored attribute blob with the canonical key list into the row
/// sequence shown for editing.
///
/// Canonical keys come first, carrying the stored value when present and an
/// empty value otherwise. Stored keys outside the canonical list follow, in
/// their stored insertion order, so nothing the service accumulated is
/// dropped. Legacy records wrap the object in a one-element array; the first
/// element is taken. This never fails: anything unusable degrades to the
/// requested fallback.
pub fn merge_rows(
    stored: Option<&MetaValue>,
    canonical: &[&str],
    fallback: MergeFallback,
) -> Vec<AttributeRow> {
    let unwrapped = stored.map(unwrap_legacy_array);
    let Some(map) = unwrapped.and_then(MetaValue::as_object) else {
        return fallback_rows(canonical, fallback);
    };

    let mut rows: Vec<AttributeRow> = canonical
        .iter()
        .map(|key| {
            let value = map.get(*key).map(MetaValue::display_string).unwrap_or_default();
            AttributeRow::new(*key, value)
        })
        .collect();

    for (key, value) in map {
        if !canonical.contains(&key.as_str()) {
            rows.push(AttributeRow::new(key.clone(), value.display_string()));
        }
    }

    rows
}

fn unwrap_legacy_array(value: &MetaValue) -> &MetaValue {
    match value.as_array() {
        Some([first, ..]) => first,
        _ => value,
    }
}

fn fallback_rows(canonical: &[&str], fallback: MergeFallback) -> Vec<AttributeRow> {
    match fallback {
        MergeFallback::CanonicalDefaults => canonical
            .iter()
            .map(|key| AttributeRow::new(*key, ""))
            .collect(),
        MergeFallback::SingleEmptyRow => vec![AttributeRow::default()],
    }
}

#[cfg(test)]
mod tests {
    use super::{MergeFallback, merge_rows};
    use crate::meta::MetaValue;

    const CANONICAL: &[&str] = &["empireName", "Founder", "Capital"];

    #[test]
    fn canonical_keys_come_first_with_stored_values_filled_in() {
        let stored = MetaValue::parse_json(r#"{"Founder":"Augustus"}"#).unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
        let pairs: Vec<(&str, &str)> = rows.iter().map(|r| (r.key.as_str(), r.value.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("empireName", ""), ("Founder", "Augustus"), ("Capital", "")]
        );
    }

    #[test]
    fn extra_stored_keys_append_in_insertion_order() {
        let stored =
            MetaValue::parse_json(r#"{"Navy":"strong","Capital":"Rome","Army":"larger"}"#).unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["empireName", "Founder", "Capital", "Navy", "Army"]);
        assert_eq!(rows[2].value, "Rome");
    }

    #[test]
    fn no_duplicates_between_canonical_and_stored() {
        let stored = MetaValue::parse_json(r#"{"Capital":"Rome","Extra":"x"}"#).unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
        let capital_count = rows.iter().filter(|r| r.key == "Capital").count();
        assert_eq!(capital_count, 1);
        assert_eq!(rows.len(), CANONICAL.len() + 1);
    }

    #[test]
    fn legacy_array_wrapping_takes_first_element() {
        let stored = MetaValue::parse_json(r#"[{"Founder":"Chandragupta"},{"Founder":"other"}]"#)
            .unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
        assert_eq!(rows[1].value, "Chandragupta");
    }

    #[test]
    fn nested_values_render_with_stable_indentation() {
        let stored = MetaValue::parse_json(r#"{"Rulers":["Ashoka","Bindusara"]}"#).unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
        let rulers = rows.iter().find(|r| r.key == "Rulers").unwrap();
        assert_eq!(rulers.value, "[\n  \"Ashoka\",\n  \"Bindusara\"\n]");
    }

    #[test]
    fn numbers_become_strings() {
        let stored = MetaValue::parse_json(r#"{"Founder":5}"#).unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
        assert_eq!(rows[1].value, "5");
    }

    #[test]
    fn missing_blob_uses_requested_fallback() {
        let rows = merge_rows(None, CANONICAL, MergeFallback::CanonicalDefaults);
        assert_eq!(rows.len(), CANONICAL.len());
        assert!(rows.iter().all(|r| r.value.is_empty()));

        let rows = merge_rows(None, CANONICAL, MergeFallback::SingleEmptyRow);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].key.is_empty());
    }

    #[test]
    fn non_object_blob_degrades_to_fallback() {
        let stored = MetaValue::parse_json(r#""just text""#).unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
        assert_eq!(rows.len(), CANONICAL.len());

        let stored = MetaValue::Null;
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::SingleEmptyRow);
        assert_eq!(rows.len(), 1);
    }
}
