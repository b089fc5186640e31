use mapdesk::editor::{self, AttributeRow, RowEditor, TextSource, ValidationError};
use mapdesk::meta::MetaValue;
use pretty_assertions::assert_eq;

fn rows(pairs: &[(&str, &str)]) -> RowEditor {
    RowEditor::from_rows(
        pairs
            .iter()
            .map(|(k, v)| AttributeRow::new(*k, *v))
            .collect(),
    )
}

#[test]
fn update_output_never_contains_empty_keys_or_values() {
    let cases: &[&[(&str, &str)]] = &[
        &[("Capital", "Rome"), ("", "x"), ("Founder", "")],
        &[("", ""), ("", "value")],
        &[("a", "1"), ("b", "2"), ("c", "   ")],
        &[],
    ];

    for case in cases {
        let v = rows(case).serialize_for_update();
        let map = v.as_object().expect("update output is always an object");
        for (key, value) in map {
            assert!(!key.trim().is_empty(), "empty key in {case:?}");
            match value {
                MetaValue::String(s) => assert!(!s.trim().is_empty(), "empty value in {case:?}"),
                _ => {}
            }
        }
    }
}

#[test]
fn create_roundtrips_through_raw_parse() {
    let editor = rows(&[
        ("Capital", "Rome"),
        ("Founder", "Romulus"),
        ("", "dropped"),
        ("Religion", ""),
    ]);

    let payload = editor.serialize_for_create().expect("has filled values");
    let text = payload.to_pretty();

    let reparsed = editor::parse_raw(&text).expect("create output is well-formed JSON");
    assert_eq!(reparsed, payload);

    let map = reparsed.as_object().unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("Capital").unwrap().as_str(), Some("Rome"));
    assert_eq!(map.get("Founder").unwrap().as_str(), Some("Romulus"));
    // Pre-filled keys with blank values still serialize on create.
    assert_eq!(map.get("Religion").unwrap().as_str(), Some(""));
}

#[test]
fn create_with_only_blank_values_is_rejected() {
    let editor = rows(&[("Capital", ""), ("Founder", "")]);
    assert_eq!(
        editor.serialize_for_create().unwrap_err(),
        ValidationError::NoData
    );
}

#[test]
fn create_scenario_capital_rome() {
    let editor = rows(&[("Capital", "Rome"), ("", "x")]);
    let payload = editor.serialize_for_create().unwrap();
    assert_eq!(payload.to_compact(), r#"{"Capital":"Rome"}"#);
}

#[test]
fn raw_parse_never_mutates_rows() {
    let mut editor = rows(&[("Capital", "Rome")]);
    let before = editor.rows.clone();

    assert!(editor::parse_raw("{broken").is_err());
    assert!(editor::parse_raw(r#"{"other": "doc"}"#).is_ok());

    editor.add_row();
    editor.remove_row(editor.rows.len() - 1);
    assert_eq!(editor.rows, before);
}

#[test]
fn file_load_replaces_the_raw_text_representation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.json");
    std::fs::write(&path, b"{\n  \"type\": \"FeatureCollection\"\n}").unwrap();

    let mut source = TextSource::default();
    source.text = "previous".to_string();
    source.pick_file(&path).unwrap();

    assert_eq!(source.text, "{\n  \"type\": \"FeatureCollection\"\n}");
    assert_eq!(source.upload_name("layer.geojson"), "payload.json");
}

#[test]
fn non_txt_metadata_file_is_rejected_and_selection_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta.csv");
    std::fs::write(&path, b"a,b").unwrap();

    let mut source = TextSource::default();
    let err = source.pick_txt_file(&path).unwrap_err();
    assert!(matches!(err, ValidationError::WrongFileType { .. }));
    assert!(source.file.is_none());
}
