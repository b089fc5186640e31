use mapdesk::api::{Empire, Layer, YearEra};
use mapdesk::filter::{EmpireFilter, LayerFilter};

fn empire(name: &str, start: i32, start_era: &str, end: i32, end_era: &str) -> Empire {
    Empire {
        object_id: format!("{name}-id"),
        empire_name: name.to_string(),
        start_year: YearEra {
            year: start,
            era: start_era.to_string(),
        },
        end_year: YearEra {
            year: end,
            era: end_era.to_string(),
        },
        content: None,
    }
}

#[test]
fn year_12_matches_120_but_not_200() {
    let filter = EmpireFilter {
        year: "12".to_string(),
        ..Default::default()
    };
    let kushan = empire("Kushan", 120, "CE", 375, "CE");
    let other = empire("Other", 200, "CE", 650, "CE");

    assert!(filter.matches(&kushan));
    assert!(!filter.matches(&other));
}

#[test]
fn blank_filter_matches_everything() {
    let filter = EmpireFilter::default();
    assert!(filter.is_empty());
    assert!(filter.matches(&empire("Anything", 1, "CE", 2, "CE")));
}

#[test]
fn filters_compose_as_a_conjunction() {
    let list = vec![
        empire("Maurya Empire", 322, "BCE", 185, "BCE"),
        empire("Mughal Empire", 1526, "CE", 1857, "CE"),
        empire("Maratha Empire", 1674, "CE", 1818, "CE"),
    ];

    let filter = EmpireFilter {
        name: "ma".to_string(),
        year: "16".to_string(),
        era: "CE".to_string(),
    };
    let hits: Vec<&str> = list
        .iter()
        .filter(|e| filter.matches(e))
        .map(|e| e.empire_name.as_str())
        .collect();
    assert_eq!(hits, vec!["Maratha Empire"]);
}

#[test]
fn era_matches_either_endpoint_exactly() {
    let spanning = empire("Rome", 27, "BCE", 476, "CE");
    let bce = EmpireFilter {
        era: "BCE".to_string(),
        ..Default::default()
    };
    let ce = EmpireFilter {
        era: "CE".to_string(),
        ..Default::default()
    };
    assert!(bce.matches(&spanning));
    assert!(ce.matches(&spanning));

    // Era is exact, not substring: "E" matches nothing.
    let partial = EmpireFilter {
        era: "E".to_string(),
        ..Default::default()
    };
    assert!(!partial.matches(&spanning));
}

#[test]
fn layer_filter_is_substring_on_name_and_type() {
    let layers = vec![
        Layer {
            layer_name: "Yamuna River".to_string(),
            layer_type: "River".to_string(),
            ..Default::default()
        },
        Layer {
            layer_name: "Aravalli Range".to_string(),
            layer_type: "Mountain".to_string(),
            ..Default::default()
        },
    ];

    let filter = LayerFilter {
        name: String::new(),
        layer_type: "riv".to_string(),
    };
    let hits: Vec<&str> = layers
        .iter()
        .filter(|l| filter.matches(l))
        .map(|l| l.layer_name.as_str())
        .collect();
    assert_eq!(hits, vec!["Yamuna River"]);

    // An applied-filter snapshot is a plain clone: editing the input copy
    // does not change results until it is applied again.
    let input = LayerFilter {
        name: "aravalli".to_string(),
        layer_type: String::new(),
    };
    let applied = input.clone();
    let mut input = input;
    input.name = "yamuna".to_string();
    let hits: Vec<&str> = layers
        .iter()
        .filter(|l| applied.matches(l))
        .map(|l| l.layer_name.as_str())
        .collect();
    assert_eq!(hits, vec!["Aravalli Range"]);
}
