use mapdesk::editor::RowEditor;
use mapdesk::merge::{MergeFallback, merge_rows};
use mapdesk::meta::{MetaBlob, MetaValue};
use mapdesk::statics;
use pretty_assertions::assert_eq;

const CANONICAL: &[&str] = &["empireName", "Founder", "Capital"];

#[test]
fn merge_covers_every_canonical_key_plus_exactly_the_extras() {
    let blobs = [
        r#"{}"#,
        r#"{"Founder":"Augustus"}"#,
        r#"{"Extra1":"a","Founder":"x","Extra2":"b"}"#,
        r#"{"empireName":"Rome","Founder":"Romulus","Capital":"Rome","Extra":"y"}"#,
    ];

    for blob in blobs {
        let stored = MetaValue::parse_json(blob).unwrap();
        let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);

        // Every canonical key present, in order, exactly once.
        for (i, key) in CANONICAL.iter().enumerate() {
            assert_eq!(rows[i].key, *key, "blob {blob}");
        }

        // The remainder is exactly the stored keys outside the canonical list.
        let extras: Vec<&str> = rows[CANONICAL.len()..].iter().map(|r| r.key.as_str()).collect();
        let expected: Vec<&str> = stored
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .filter(|k| !CANONICAL.contains(k))
            .collect();
        assert_eq!(extras, expected, "blob {blob}");

        // No duplicates anywhere.
        let mut keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), rows.len(), "blob {blob}");
    }
}

#[test]
fn merge_scenario_founder_augustus() {
    let stored = MetaValue::parse_json(r#"{"Founder":"Augustus"}"#).unwrap();
    let rows = merge_rows(Some(&stored), CANONICAL, MergeFallback::CanonicalDefaults);
    let pairs: Vec<(String, String)> = rows.into_iter().map(|r| (r.key, r.value)).collect();
    assert_eq!(
        pairs,
        vec![
            ("empireName".to_string(), String::new()),
            ("Founder".to_string(), "Augustus".to_string()),
            ("Capital".to_string(), String::new()),
        ]
    );
}

#[test]
fn text_blob_yields_the_canonical_scaffold() {
    // Plain-text metadata has no attribute structure to merge; the editor
    // still opens with the canonical scaffold.
    let blob = MetaBlob::classify("handwritten notes, not json");
    assert_eq!(blob.as_json(), None);

    let rows = merge_rows(blob.as_json(), CANONICAL, MergeFallback::CanonicalDefaults);
    assert_eq!(rows.len(), CANONICAL.len());
    assert!(rows.iter().all(|r| r.value.is_empty()));
}

#[test]
fn merge_then_update_roundtrip_preserves_stored_attributes() {
    let stored = MetaValue::parse_json(
        r#"{"Founder":"Ashoka","Capital":"Pataliputra","Army":"600000 infantry"}"#,
    )
    .unwrap();
    let rows = merge_rows(
        Some(&stored),
        statics::CANONICAL_FIELDS,
        MergeFallback::CanonicalDefaults,
    );

    // An untouched editor serializes back exactly the filled attributes.
    let editor = RowEditor::from_rows(rows);
    let out = editor.serialize_for_update();
    let map = out.as_object().unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("Founder").unwrap().as_str(), Some("Ashoka"));
    assert_eq!(map.get("Capital").unwrap().as_str(), Some("Pataliputra"));
    assert_eq!(map.get("Army").unwrap().as_str(), Some("600000 infantry"));
}

#[test]
fn merge_then_update_restructures_nested_values() {
    // A nested array survives the row round-trip: displayed with stable
    // indentation, recovered as JSON on save.
    let stored = MetaValue::parse_json(r#"{"Rulers":["Ashoka","Bindusara"]}"#).unwrap();
    let rows = merge_rows(
        Some(&stored),
        statics::CANONICAL_FIELDS,
        MergeFallback::CanonicalDefaults,
    );
    let editor = RowEditor::from_rows(rows);
    let out = editor.serialize_for_update();
    assert_eq!(out.get("Rulers"), stored.get("Rulers"));
}

#[test]
fn merge_type_loss_is_the_accepted_policy() {
    // A numeric 5 and a string "5" are indistinguishable after the merge;
    // on save both come back as the string "5".
    let numeric = MetaValue::parse_json(r#"{"Founder":5}"#).unwrap();
    let stringy = MetaValue::parse_json(r#"{"Founder":"5"}"#).unwrap();

    let rows_n = merge_rows(Some(&numeric), CANONICAL, MergeFallback::CanonicalDefaults);
    let rows_s = merge_rows(Some(&stringy), CANONICAL, MergeFallback::CanonicalDefaults);
    assert_eq!(rows_n, rows_s);

    let out = RowEditor::from_rows(rows_n).serialize_for_update();
    assert_eq!(out.get("Founder").unwrap().as_str(), Some("5"));
}
