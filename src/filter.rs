use crate::api::{Empire, Layer};

/// Live filter over the empire list: name substring, year prefix, era exact.
/// A blank field matches everything; filled fields are a conjunction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmpireFilter {
    pub name: String,
    pub year: String,
    pub era: String,
}

impl EmpireFilter {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.year.trim().is_empty() && self.era.trim().is_empty()
    }

    pub fn matches(&self, empire: &Empire) -> bool {
        let name = self.name.trim().to_lowercase();
        if !name.is_empty() && !empire.empire_name.to_lowercase().contains(&name) {
            return false;
        }

        // Year filtering is a decimal-prefix match against either endpoint,
        // so a partial entry like "12" already narrows to 120, 1206, ...
        let year = self.year.trim();
        if !year.is_empty() {
            let start = empire.start_year.year.to_string();
            let end = empire.end_year.year.to_string();
            if !start.starts_with(year) && !end.starts_with(year) {
                return false;
            }
        }

        let era = self.era.trim();
        if !era.is_empty() && empire.start_year.era != era && empire.end_year.era != era {
            return false;
        }

        true
    }
}

/// Layer list filter, applied on explicit Search rather than per keystroke:
/// case-insensitive substring on name and type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerFilter {
    pub name: String,
    pub layer_type: String,
}

impl LayerFilter {
    pub fn matches(&self, layer: &Layer) -> bool {
        let name = self.name.trim().to_lowercase();
        if !name.is_empty() && !layer.layer_name.to_lowercase().contains(&name) {
            return false;
        }
        let layer_type = self.layer_type.trim().to_lowercase();
        if !layer_type.is_empty() && !layer.layer_type.to_lowercase().contains(&layer_type) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{EmpireFilter, LayerFilter};
    use crate::api::{Empire, Layer, YearEra};

    fn empire(name: &str, start: i32, start_era: &str, end: i32, end_era: &str) -> Empire {
        Empire {
            object_id: "id".to_string(),
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
    fn year_filter_is_a_prefix_match() {
        let filter = EmpireFilter {
            year: "12".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&empire("A", 120, "CE", 300, "CE")));
        assert!(!filter.matches(&empire("B", 200, "CE", 300, "CE")));
        // End year counts too.
        assert!(filter.matches(&empire("C", 80, "CE", 1206, "CE")));
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let filter = EmpireFilter {
            name: "maur".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&empire("Maurya Empire", 322, "BCE", 185, "BCE")));
        assert!(!filter.matches(&empire("Chola", 300, "BCE", 1279, "CE")));
    }

    #[test]
    fn era_filter_is_exact_on_either_endpoint() {
        let filter = EmpireFilter {
            era: "BCE".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&empire("A", 322, "BCE", 185, "BCE")));
        assert!(filter.matches(&empire("B", 30, "BCE", 476, "CE")));
        assert!(!filter.matches(&empire("C", 300, "CE", 900, "CE")));
    }

    #[test]
    fn filled_fields_are_a_conjunction() {
        let filter = EmpireFilter {
            name: "rome".to_string(),
            year: "47".to_string(),
            era: "CE".to_string(),
        };
        assert!(filter.matches(&empire("Rome", 27, "BCE", 476, "CE")));
        assert!(!filter.matches(&empire("Rome", 27, "BCE", 1453, "CE")));
    }

    #[test]
    fn layer_filter_matches_both_fields() {
        let layer = Layer {
            layer_name: "Yamuna River".to_string(),
            layer_type: "River".to_string(),
            ..Default::default()
        };
        let filter = LayerFilter {
            name: "yamuna".to_string(),
            layer_type: "riv".to_string(),
        };
        assert!(filter.matches(&layer));

        let filter = LayerFilter {
            name: "ganges".to_string(),
            layer_type: String::new(),
        };
        assert!(!filter.matches(&layer));
    }
}
