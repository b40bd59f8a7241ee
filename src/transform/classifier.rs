//! Rule-based car classification

use crate::types::{CarClassRule, FALLBACK_CAR_CLASS};

/// Resolve the class of a car from an ordered rule list.
///
/// Rules are scanned in order and the first rule with any pattern contained in
/// the uppercased car name or model wins. No match (including an empty rule
/// list) resolves to [`FALLBACK_CAR_CLASS`].
pub fn classify_car<'a>(car_name: &str, car_model: &str, rules: &'a [CarClassRule]) -> &'a str {
    let name = car_name.to_uppercase();
    let model = car_model.to_uppercase();

    for rule in rules {
        let matched = rule.patterns.iter().any(|pattern| {
            let pattern = pattern.to_uppercase();
            name.contains(&pattern) || model.contains(&pattern)
        });

        if matched {
            return &rule.name;
        }
    }

    FALLBACK_CAR_CLASS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<CarClassRule> {
        vec![
            CarClassRule::new("Silver", ["SUPER-PRODUCTION"]),
            CarClassRule::new("Bronze", ["Concept C GT"]),
            CarClassRule::new("GT3", ["gt3"]),
        ]
    }

    #[test]
    fn matches_pattern_case_insensitively() {
        let rules = vec![CarClassRule::new("Silver", ["SUPER-PRODUCTION"])];
        assert_eq!(classify_car("LADA Vesta NG Super-production", "lada_vesta", &rules), "Silver");
    }

    #[test]
    fn empty_rules_fall_back_to_other() {
        assert_eq!(classify_car("Ferrari 296 GT3", "ks_ferrari_296_gt3", &[]), "Other");
    }

    #[test]
    fn matches_against_model_key_when_name_differs() {
        assert_eq!(classify_car("Custom Livery Car", "ks_audi_r8_lms_gt3", &rules()), "GT3");
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![
            CarClassRule::new("Cup", ["PORSCHE"]),
            CarClassRule::new("GT3", ["GT3"]),
        ];
        // Both rules match; list order decides, not specificity
        assert_eq!(classify_car("Porsche 911 GT3 R", "ks_porsche_911_gt3_r", &rules), "Cup");

        let reversed: Vec<_> = rules.into_iter().rev().collect();
        assert_eq!(classify_car("Porsche 911 GT3 R", "ks_porsche_911_gt3_r", &reversed), "GT3");
    }

    #[test]
    fn any_pattern_in_rule_matches() {
        let rules = vec![CarClassRule::new("GT4", ["cayman gt4", "ks_bmw_m4_gt4"])];
        assert_eq!(classify_car("BMW M4 GT4", "ks_bmw_m4_gt4", &rules), "GT4");
        assert_eq!(classify_car("Porsche Cayman GT4 Clubsport", "x", &rules), "GT4");
        assert_eq!(classify_car("Mercedes AMG GT4", "ks_mercedes_amg_gt4", &rules), "Other");
    }

    #[test]
    fn unmatched_car_is_other() {
        assert_eq!(classify_car("Mazda MX-5 Cup", "ks_mazda_mx5_cup", &rules()), FALLBACK_CAR_CLASS);
    }
}
