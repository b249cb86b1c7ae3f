use crate::model::Record;
use crate::rules::predicate::{CompoundLogic, PredicateSpec};
use crate::rules::schema::Rule;

/// Evaluate one rule against one record.
///
/// Pure and total: a faulty field is matched as the empty string.
pub fn evaluate(record: &Record, rule: &Rule) -> bool {
    let code = record.product_code_key().unwrap_or_default();
    let currency = record.currency_key().unwrap_or_default();
    matches(&rule.predicate, &code, &currency)
}

/// Match a predicate against an already-uppercased code and currency.
pub fn matches(predicate: &PredicateSpec, code: &str, currency: &str) -> bool {
    match predicate {
        PredicateSpec::NotNtd => !matches!(currency, "NTD" | "NAN" | ""),
        PredicateSpec::Equals(v) => currency == v,
        PredicateSpec::NotEquals(v) => currency != v,
        PredicateSpec::InList(vs) => vs.iter().any(|v| v == currency),
        PredicateSpec::NotInList(vs) => !vs.iter().any(|v| v == currency),

        PredicateSpec::StartsWith(p) => code.starts_with(p.as_str()),
        PredicateSpec::EndsWith(s) => code.ends_with(s.as_str()),
        PredicateSpec::Contains(s) => code.contains(s.as_str()),
        PredicateSpec::NotContains(s) => !code.contains(s.as_str()),
        PredicateSpec::Compound {
            logic,
            prefix,
            substr,
        } => {
            let prefix_match = code.starts_with(prefix.as_str());
            let contains_match = code.contains(substr.as_str());
            match logic {
                CompoundLogic::And => prefix_match && contains_match,
                CompoundLogic::Or => prefix_match || contains_match,
                CompoundLogic::Unsupported(_) => false,
            }
        }
        PredicateSpec::SheetMetal => code.starts_with("4KB") && code.contains('P'),
        // The character test runs over the whole code, "4KB" prefix included,
        // so any 4KB code passes the first clause.
        PredicateSpec::MachinedPart => {
            (code.starts_with("4KB") && code.chars().any(|c| "MHSLK".contains(c)))
                || (code.starts_with("KB") && !code.starts_with("4KB"))
        }
        PredicateSpec::Unrecognized(_) => false,
    }
}

/// Per-clause results for the composite predicates, for tracing.
pub fn clause_details(predicate: &PredicateSpec, code: &str) -> Vec<String> {
    match predicate {
        PredicateSpec::SheetMetal => vec![
            format!("starts with 4KB: {}", code.starts_with("4KB")),
            format!("contains P: {}", code.contains('P')),
        ],
        PredicateSpec::MachinedPart => vec![
            format!(
                "starts with 4KB and contains M/H/S/L/K: {}",
                code.starts_with("4KB") && code.chars().any(|c| "MHSLK".contains(c))
            ),
            format!(
                "starts with KB (not 4KB): {}",
                code.starts_with("KB") && !code.starts_with("4KB")
            ),
        ],
        PredicateSpec::Compound { prefix, substr, .. } => vec![
            format!("starts with {prefix}: {}", code.starts_with(prefix.as_str())),
            format!("contains {substr}: {}", code.contains(substr.as_str())),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use crate::rules::predicate::ConditionType;

    fn rule(ct: ConditionType, id: &str) -> Rule {
        Rule {
            condition_type: ct,
            predicate: PredicateSpec::parse(ct, id),
            description: String::new(),
        }
    }

    fn code_rule(id: &str) -> Rule {
        rule(ConditionType::ProductCode, id)
    }

    fn currency_rule(id: &str) -> Rule {
        rule(ConditionType::Currency, id)
    }

    #[test]
    fn test_not_ntd() {
        let r = currency_rule("not_ntd");
        assert!(evaluate(&Record::adhoc("X", "USD"), &r));
        assert!(!evaluate(&Record::adhoc("X", "ntd"), &r));
        assert!(!evaluate(&Record::adhoc("X", "nan"), &r));
        assert!(!evaluate(&Record::adhoc("X", "  "), &r));
    }

    #[test]
    fn test_currency_equality_and_lists() {
        let rec = Record::adhoc("X", "eur");
        assert!(evaluate(&rec, &currency_rule("equals_EUR")));
        assert!(!evaluate(&rec, &currency_rule("not_equals_eur")));
        assert!(evaluate(&rec, &currency_rule("in_list_USD,EUR")));
        assert!(!evaluate(&rec, &currency_rule("not_in_list_usd,eur")));
        assert!(evaluate(&rec, &currency_rule("not_in_list_NTD")));
    }

    #[test]
    fn test_product_code_string_tests_are_case_insensitive() {
        let rec = Record::adhoc("4kz-motor-p", "NTD");
        assert!(evaluate(&rec, &code_rule("startswith_4KZ")));
        assert!(evaluate(&rec, &code_rule("endswith_-P")));
        assert!(evaluate(&rec, &code_rule("contains_motor")));
        assert!(!evaluate(&rec, &code_rule("not_contains_MOTOR")));
    }

    #[test]
    fn test_compound_logic() {
        let rec = Record::adhoc("4SS100", "NTD");
        assert!(!evaluate(&rec, &code_rule("compound_AND_4SS_P")));
        assert!(evaluate(&rec, &code_rule("compound_OR_4SS_P")));
        assert!(!evaluate(&rec, &code_rule("compound_XOR_4SS_1")));
    }

    #[test]
    fn test_sheet_metal_rule() {
        let r = code_rule("startswith_4KB_and_contains_P");
        assert!(evaluate(&Record::adhoc("4KB2AAP", "NTD"), &r));
        assert!(!evaluate(&Record::adhoc("4KB2AA", "NTD"), &r));
        assert!(!evaluate(&Record::adhoc("KBP", "NTD"), &r));
    }

    #[test]
    fn test_machined_part_rule() {
        let r = code_rule("startswith_4KB_contains_MHSLK_or_startswith_kb");
        assert!(evaluate(&Record::adhoc("KB55", "NTD"), &r));
        assert!(evaluate(&Record::adhoc("kb55", "NTD"), &r));
        // K of the prefix satisfies the character test
        assert!(evaluate(&Record::adhoc("4KB000", "NTD"), &r));
        assert!(!evaluate(&Record::adhoc("4KZ000", "NTD"), &r));
        assert!(!evaluate(&Record::adhoc("XKB", "NTD"), &r));
    }

    #[test]
    fn test_unrecognized_never_matches() {
        let rec = Record::adhoc("ANYTHING", "USD");
        assert!(!evaluate(&rec, &code_rule("sideways_ANY")));
        assert!(!evaluate(&rec, &currency_rule("startswith_ANY")));
    }

    #[test]
    fn test_faulty_field_matched_as_empty() {
        let mut rec = Record::adhoc("4KZ1", "NTD");
        rec.currency = Cell::Error("#N/A".into());
        assert!(evaluate(&rec, &code_rule("startswith_4KZ")));
        assert!(!evaluate(&rec, &currency_rule("not_ntd")));
    }

    #[test]
    fn test_clause_details_only_for_composites() {
        assert_eq!(
            clause_details(&PredicateSpec::SheetMetal, "4KB2AA"),
            vec!["starts with 4KB: true", "contains P: false"]
        );
        assert!(clause_details(&PredicateSpec::NotNtd, "4KB").is_empty());
    }
}
