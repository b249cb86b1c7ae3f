pub mod builtin;
pub mod predicate;
pub mod schema;

use crate::error::MatAbcError;
use crate::model::Category;
use predicate::PredicateSpec;
use schema::{Rule, RuleSet, RuleSetDef};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Rule string the legacy editor stored for a category it never finished.
const PLACEHOLDER_RULE: &str = "custom";

/// Load a rule set from a JSON file.
pub fn load_ruleset(path: &Path) -> Result<RuleSet, MatAbcError> {
    let content = std::fs::read_to_string(path).map_err(|e| MatAbcError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let def: RuleSetDef = serde_json::from_str(&content).map_err(|e| MatAbcError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(compile(&def))
}

/// Parse a rule set from a JSON string (no file path context).
pub fn parse_ruleset_str(json: &str) -> Result<RuleSet, MatAbcError> {
    let def: RuleSetDef = serde_json::from_str(json)?;
    Ok(compile(&def))
}

/// Parse every rule identifier once, keyed by category.
///
/// Keys that name no fixed category are kept in `ignored_keys`.
pub fn compile(def: &RuleSetDef) -> RuleSet {
    let mut ruleset = RuleSet::default();
    for (key, rule_def) in &def.rules {
        match Category::from_key(key).filter(|c| c.is_fixed()) {
            Some(category) => {
                if ruleset.has_entry(category) {
                    tracing::warn!(key = %key, category = %category, "duplicate rule for category, later key wins");
                }
                match Rule::from_def(rule_def) {
                    Some(rule) => {
                        ruleset.insert(category, rule);
                    }
                    None => {
                        tracing::warn!(
                            key = %key,
                            condition_type = %rule_def.condition_type,
                            "unknown condition type, rule never matches"
                        );
                        ruleset.rules.remove(&category);
                        ruleset.unusable.insert(category, rule_def.clone());
                    }
                }
            }
            None => {
                tracing::warn!(key = %key, "rule document key names no fixed category, ignored");
                ruleset.ignored_keys.push(key.clone());
            }
        }
    }
    ruleset
}

/// Serialize a rule set as a pretty-printed JSON document.
pub fn to_json(ruleset: &RuleSet) -> Result<String, MatAbcError> {
    let ordered: BTreeMap<Category, schema::RuleDef> = ruleset
        .rules
        .iter()
        .map(|(cat, rule)| (*cat, rule.to_def()))
        .chain(ruleset.unusable.iter().map(|(cat, def)| (*cat, def.clone())))
        .collect();
    Ok(serde_json::to_string_pretty(&ordered)?)
}

/// Write a rule set to a JSON file.
pub fn save_ruleset(ruleset: &RuleSet, path: &Path) -> Result<(), MatAbcError> {
    std::fs::write(path, to_json(ruleset)?)?;
    Ok(())
}

/// Completeness report for a rule set. Advisory: an incomplete set still
/// classifies, its missing categories simply never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    /// Fixed categories with no rule at all.
    pub missing: BTreeSet<Category>,
    /// Categories whose rule is empty or still the editor placeholder.
    pub incomplete: BTreeSet<Category>,
    /// Categories whose rule identifier does not parse. Does not affect `ok`.
    pub unrecognized: BTreeSet<Category>,
    /// Categories whose condition type is not recognized. Does not affect `ok`.
    pub unknown_condition_type: BTreeSet<Category>,
    /// Document keys naming no fixed category. Does not affect `ok`.
    pub ignored_keys: Vec<String>,
}

impl ValidationReport {
    /// Human-readable findings, one per line, empty when nothing to report.
    pub fn findings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.missing.is_empty() {
            out.push(format!("no rule for: {}", join(&self.missing)));
        }
        if !self.incomplete.is_empty() {
            out.push(format!("incomplete rule for: {}", join(&self.incomplete)));
        }
        if !self.unrecognized.is_empty() {
            out.push(format!(
                "unrecognized rule identifier for: {} (never matches)",
                join(&self.unrecognized)
            ));
        }
        if !self.unknown_condition_type.is_empty() {
            out.push(format!(
                "unknown condition type for: {} (never matches)",
                join(&self.unknown_condition_type)
            ));
        }
        if !self.ignored_keys.is_empty() {
            out.push(format!("ignored keys: {}", self.ignored_keys.join(", ")));
        }
        out
    }
}

fn join(cats: &BTreeSet<Category>) -> String {
    cats.iter().map(|c| c.key()).collect::<Vec<_>>().join(", ")
}

/// Check that all five fixed categories carry a usable rule.
pub fn validate(ruleset: &RuleSet) -> ValidationReport {
    let mut report = ValidationReport {
        ignored_keys: ruleset.ignored_keys.clone(),
        ..Default::default()
    };

    for category in Category::FIXED {
        if let Some(def) = ruleset.unusable.get(&category) {
            if is_unfinished(&def.rule) {
                report.incomplete.insert(category);
            } else {
                report.unknown_condition_type.insert(category);
            }
            continue;
        }
        match ruleset.get(category).map(|r| &r.predicate) {
            None => {
                report.missing.insert(category);
            }
            Some(PredicateSpec::Unrecognized(raw)) => {
                if is_unfinished(raw) {
                    report.incomplete.insert(category);
                } else {
                    report.unrecognized.insert(category);
                }
            }
            Some(_) => {}
        }
    }

    report.ok = report.missing.is_empty() && report.incomplete.is_empty();
    report
}

fn is_unfinished(rule: &str) -> bool {
    let rule = rule.trim();
    rule.is_empty() || rule == PLACEHOLDER_RULE
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicate::ConditionType;

    #[test]
    fn test_parse_legacy_document() {
        let json = r#"{
            "進口": { "condition_type": "currency", "rule": "not_ntd", "description": "non-NTD" },
            "板金": { "condition_type": "product_code", "rule": "startswith_4KB_and_contains_P", "description": "" },
            "加工件": { "condition_type": "product_code", "rule": "startswith_4KB_contains_MHSLK_or_startswith_kb", "description": "" },
            "電料": { "condition_type": "product_code", "rule": "startswith_4KZ", "description": "" },
            "市購件": { "condition_type": "product_code", "rule": "startswith_4SS", "description": "" }
        }"#;
        let rs = parse_ruleset_str(json).unwrap();
        assert_eq!(rs.rules.len(), 5);
        assert_eq!(rs.get(Category::Import).unwrap().predicate, PredicateSpec::NotNtd);
        assert_eq!(rs.get(Category::SheetMetal).unwrap().predicate, PredicateSpec::SheetMetal);
        assert!(validate(&rs).ok);
    }

    #[test]
    fn test_missing_and_incomplete_reported() {
        let json = r#"{
            "import": { "condition_type": "currency", "rule": "not_ntd" },
            "sheet_metal": { "condition_type": "product_code", "rule": "custom" },
            "electrical": { "condition_type": "product_code", "rule": "" },
            "purchased": { "condition_type": "product_code", "rule": "sideways_4SS" }
        }"#;
        let report = validate(&parse_ruleset_str(json).unwrap());
        assert!(!report.ok);
        assert_eq!(report.missing, BTreeSet::from([Category::MachinedPart]));
        assert_eq!(
            report.incomplete,
            BTreeSet::from([Category::SheetMetal, Category::Electrical])
        );
        assert_eq!(report.unrecognized, BTreeSet::from([Category::Purchased]));
        assert_eq!(report.findings().len(), 3);
    }

    #[test]
    fn test_unknown_keys_are_ignored_not_fatal() {
        let json = r#"{
            "import": { "condition_type": "currency", "rule": "not_ntd" },
            "其他": { "condition_type": "currency", "rule": "equals_JPY" },
            "gadgets": { "condition_type": "product_code", "rule": "startswith_G" }
        }"#;
        let rs = parse_ruleset_str(json).unwrap();
        assert_eq!(rs.rules.len(), 1);
        assert_eq!(rs.ignored_keys.len(), 2);
        assert_eq!(validate(&rs).ignored_keys.len(), 2);
    }

    #[test]
    fn test_unknown_condition_type_reported_not_fatal() {
        let json = r#"{
            "import": { "condition_type": "currency", "rule": "not_ntd" },
            "sheet_metal": { "condition_type": "product_code", "rule": "startswith_4KB_and_contains_P" },
            "machined_part": { "condition_type": "product_code", "rule": "startswith_4KB_contains_MHSLK_or_startswith_kb" },
            "electrical": { "condition_type": "Product_Code", "rule": "startswith_4KZ" },
            "purchased": { "condition_type": "product_code", "rule": "startswith_4SS" }
        }"#;
        let rs = parse_ruleset_str(json).unwrap();
        assert_eq!(rs.rules.len(), 4);
        assert!(rs.get(Category::Electrical).is_none());
        assert_eq!(rs.unusable[&Category::Electrical].condition_type, "Product_Code");

        let report = validate(&rs);
        assert!(report.ok);
        assert!(report.missing.is_empty());
        assert_eq!(report.unknown_condition_type, BTreeSet::from([Category::Electrical]));
        assert!(report.findings()[0].contains("electrical"));

        // Kept verbatim on export
        let back = parse_ruleset_str(&to_json(&rs).unwrap()).unwrap();
        assert_eq!(back, rs);
    }

    #[test]
    fn test_null_rule_is_incomplete() {
        let json = r#"{
            "import": { "condition_type": "currency", "rule": null },
            "electrical": { "condition_type": null, "rule": null }
        }"#;
        let rs = parse_ruleset_str(json).unwrap();
        assert_eq!(
            rs.get(Category::Import).unwrap().predicate,
            PredicateSpec::Unrecognized(String::new())
        );
        let report = validate(&rs);
        assert!(!report.ok);
        assert_eq!(
            report.incomplete,
            BTreeSet::from([Category::Import, Category::Electrical])
        );
        assert!(report.unknown_condition_type.is_empty());
    }

    #[test]
    fn test_built_rules_survive_the_document_format() {
        let mut rs = RuleSet::default();
        let built = [
            (Category::Import, Rule::currency_not_in(&["ntd", "twd"])),
            (Category::SheetMetal, Rule::compound(predicate::CompoundLogic::And, "4kb", "p")),
            (Category::MachinedPart, Rule::ends_with("-m")),
            (Category::Electrical, Rule::contains("4kz")),
            (Category::Purchased, Rule::currency_equals("usd")),
        ];
        for (category, rule) in built {
            rs.insert(category, rule.unwrap());
        }
        let back = parse_ruleset_str(&to_json(&rs).unwrap()).unwrap();
        assert_eq!(back, rs);
        assert!(validate(&back).ok);
    }

    #[test]
    fn test_json_round_trip_preserves_predicates() {
        let rs = builtin::default_rules().unwrap();
        let back = parse_ruleset_str(&to_json(&rs).unwrap()).unwrap();
        assert_eq!(back, rs);
    }

    #[test]
    fn test_rule_new_derives_condition_type() {
        let rule = Rule::new(PredicateSpec::InList(vec!["USD".into()])).unwrap();
        assert_eq!(rule.condition_type, ConditionType::Currency);
        assert!(Rule::new(PredicateSpec::Unrecognized("x".into())).is_none());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_ruleset(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }
}
