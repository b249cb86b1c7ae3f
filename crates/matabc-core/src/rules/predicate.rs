//! Rule grammar: identifier strings such as `startswith_4KB` or
//! `not_in_list_USD,EUR`, parsed once into a [`PredicateSpec`].

use serde::{Deserialize, Serialize};
use std::fmt;

const SHEET_METAL_RULE: &str = "startswith_4KB_and_contains_P";
const MACHINED_PART_RULE: &str = "startswith_4KB_contains_MHSLK_or_startswith_kb";

/// Field a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    ProductCode,
    Currency,
}

impl ConditionType {
    /// Resolve a rule-document `condition_type` value. Exact match only.
    pub fn from_key(s: &str) -> Option<ConditionType> {
        match s.trim() {
            "product_code" => Some(ConditionType::ProductCode),
            "currency" => Some(ConditionType::Currency),
            _ => None,
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionType::ProductCode => write!(f, "product_code"),
            ConditionType::Currency => write!(f, "currency"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompoundLogic {
    And,
    Or,
    /// Any other token. Parses, but never matches.
    Unsupported(String),
}

impl CompoundLogic {
    pub(crate) fn parse(token: &str) -> CompoundLogic {
        match token.to_uppercase().as_str() {
            "AND" => CompoundLogic::And,
            "OR" => CompoundLogic::Or,
            other => CompoundLogic::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for CompoundLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundLogic::And => write!(f, "AND"),
            CompoundLogic::Or => write!(f, "OR"),
            CompoundLogic::Unsupported(token) => f.write_str(token),
        }
    }
}

/// Parsed form of a rule identifier. All operands are stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateSpec {
    // Currency predicates
    NotNtd,
    Equals(String),
    NotEquals(String),
    InList(Vec<String>),
    NotInList(Vec<String>),

    // Product code predicates
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    NotContains(String),
    Compound {
        logic: CompoundLogic,
        prefix: String,
        substr: String,
    },
    /// Starts with "4KB" and contains "P".
    SheetMetal,
    /// Starts with "4KB" and contains one of M/H/S/L/K, or starts with "KB"
    /// but not "4KB".
    MachinedPart,

    /// Identifier that does not parse under its condition type. Kept verbatim
    /// for export; never matches.
    Unrecognized(String),
}

impl PredicateSpec {
    /// Parse a rule identifier under the given condition type.
    ///
    /// Never fails: anything outside the grammar, or with an empty operand,
    /// becomes [`PredicateSpec::Unrecognized`].
    pub fn parse(condition_type: ConditionType, rule: &str) -> PredicateSpec {
        let parsed = match condition_type {
            ConditionType::Currency => parse_currency(rule),
            ConditionType::ProductCode => parse_product_code(rule),
        };
        parsed.unwrap_or_else(|| PredicateSpec::Unrecognized(rule.to_string()))
    }

    /// Field family this predicate belongs to, if recognised.
    pub fn condition_type(&self) -> Option<ConditionType> {
        match self {
            PredicateSpec::NotNtd
            | PredicateSpec::Equals(_)
            | PredicateSpec::NotEquals(_)
            | PredicateSpec::InList(_)
            | PredicateSpec::NotInList(_) => Some(ConditionType::Currency),
            PredicateSpec::Unrecognized(_) => None,
            _ => Some(ConditionType::ProductCode),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, PredicateSpec::Unrecognized(_))
    }

    /// Plain-language description, used when a rule carries none.
    pub fn describe(&self) -> String {
        match self {
            PredicateSpec::NotNtd => "currency is not NTD".into(),
            PredicateSpec::Equals(v) => format!("currency equals '{v}'"),
            PredicateSpec::NotEquals(v) => format!("currency does not equal '{v}'"),
            PredicateSpec::InList(vs) => format!("currency is one of {}", vs.join(", ")),
            PredicateSpec::NotInList(vs) => format!("currency is none of {}", vs.join(", ")),
            PredicateSpec::StartsWith(p) => format!("product code starts with '{p}'"),
            PredicateSpec::EndsWith(s) => format!("product code ends with '{s}'"),
            PredicateSpec::Contains(s) => format!("product code contains '{s}'"),
            PredicateSpec::NotContains(s) => format!("product code does not contain '{s}'"),
            PredicateSpec::Compound {
                logic,
                prefix,
                substr,
            } => format!("product code starts with '{prefix}' {logic} contains '{substr}'"),
            PredicateSpec::SheetMetal => "product code starts with 4KB and contains P".into(),
            PredicateSpec::MachinedPart => {
                "product code starts with 4KB and contains M/H/S/L/K, or starts with KB".into()
            }
            PredicateSpec::Unrecognized(raw) => format!("unrecognized rule '{raw}'"),
        }
    }
}

/// Renders the grammar identifier; parsing the output yields an equal predicate.
impl fmt::Display for PredicateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateSpec::NotNtd => write!(f, "not_ntd"),
            PredicateSpec::Equals(v) => write!(f, "equals_{v}"),
            PredicateSpec::NotEquals(v) => write!(f, "not_equals_{v}"),
            PredicateSpec::InList(vs) => write!(f, "in_list_{}", vs.join(",")),
            PredicateSpec::NotInList(vs) => write!(f, "not_in_list_{}", vs.join(",")),
            PredicateSpec::StartsWith(p) => write!(f, "startswith_{p}"),
            PredicateSpec::EndsWith(s) => write!(f, "endswith_{s}"),
            PredicateSpec::Contains(s) => write!(f, "contains_{s}"),
            PredicateSpec::NotContains(s) => write!(f, "not_contains_{s}"),
            PredicateSpec::Compound {
                logic,
                prefix,
                substr,
            } => write!(f, "compound_{logic}_{prefix}_{substr}"),
            PredicateSpec::SheetMetal => f.write_str(SHEET_METAL_RULE),
            PredicateSpec::MachinedPart => f.write_str(MACHINED_PART_RULE),
            PredicateSpec::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

fn parse_currency(rule: &str) -> Option<PredicateSpec> {
    if rule == "not_ntd" {
        return Some(PredicateSpec::NotNtd);
    }
    if let Some(v) = rule.strip_prefix("equals_") {
        return operand(v).map(PredicateSpec::Equals);
    }
    if let Some(v) = rule.strip_prefix("not_equals_") {
        return operand(v).map(PredicateSpec::NotEquals);
    }
    if let Some(list) = rule.strip_prefix("in_list_") {
        return operand_list(list).map(PredicateSpec::InList);
    }
    if let Some(list) = rule.strip_prefix("not_in_list_") {
        return operand_list(list).map(PredicateSpec::NotInList);
    }
    None
}

fn parse_product_code(rule: &str) -> Option<PredicateSpec> {
    match rule {
        SHEET_METAL_RULE => return Some(PredicateSpec::SheetMetal),
        MACHINED_PART_RULE => return Some(PredicateSpec::MachinedPart),
        _ => {}
    }
    if let Some(p) = rule.strip_prefix("startswith_") {
        return operand(p).map(PredicateSpec::StartsWith);
    }
    if let Some(s) = rule.strip_prefix("endswith_") {
        return operand(s).map(PredicateSpec::EndsWith);
    }
    if let Some(s) = rule.strip_prefix("contains_") {
        return operand(s).map(PredicateSpec::Contains);
    }
    if let Some(s) = rule.strip_prefix("not_contains_") {
        return operand(s).map(PredicateSpec::NotContains);
    }
    if rule.starts_with("compound_") {
        // compound_<LOGIC>_<PREFIX>_<SUBSTR>; trailing parts are ignored
        let parts: Vec<&str> = rule.split('_').collect();
        if parts.len() < 4 {
            return None;
        }
        return Some(PredicateSpec::Compound {
            logic: CompoundLogic::parse(parts[1]),
            prefix: operand(parts[2])?,
            substr: operand(parts[3])?,
        });
    }
    None
}

pub(crate) fn operand(s: &str) -> Option<String> {
    let upper = s.trim().to_uppercase();
    (!upper.is_empty()).then_some(upper)
}

fn operand_list(s: &str) -> Option<Vec<String>> {
    let items: Vec<String> = s.split(',').filter_map(operand).collect();
    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(rule: &str) -> PredicateSpec {
        PredicateSpec::parse(ConditionType::Currency, rule)
    }

    fn code(rule: &str) -> PredicateSpec {
        PredicateSpec::parse(ConditionType::ProductCode, rule)
    }

    #[test]
    fn test_currency_grammar() {
        assert_eq!(currency("not_ntd"), PredicateSpec::NotNtd);
        assert_eq!(currency("equals_usd"), PredicateSpec::Equals("USD".into()));
        assert_eq!(currency("not_equals_NTD"), PredicateSpec::NotEquals("NTD".into()));
        assert_eq!(
            currency("in_list_USD, eur"),
            PredicateSpec::InList(vec!["USD".into(), "EUR".into()])
        );
        assert_eq!(
            currency("not_in_list_NTD,TWD"),
            PredicateSpec::NotInList(vec!["NTD".into(), "TWD".into()])
        );
    }

    #[test]
    fn test_product_code_grammar() {
        assert_eq!(code("startswith_4KZ"), PredicateSpec::StartsWith("4KZ".into()));
        assert_eq!(code("endswith_-p"), PredicateSpec::EndsWith("-P".into()));
        assert_eq!(code("contains_MOTOR"), PredicateSpec::Contains("MOTOR".into()));
        assert_eq!(code("not_contains_TEST"), PredicateSpec::NotContains("TEST".into()));
        assert_eq!(code(SHEET_METAL_RULE), PredicateSpec::SheetMetal);
        assert_eq!(code(MACHINED_PART_RULE), PredicateSpec::MachinedPart);
    }

    #[test]
    fn test_underscore_inside_operand_is_kept() {
        assert_eq!(code("startswith_4K_B"), PredicateSpec::StartsWith("4K_B".into()));
    }

    #[test]
    fn test_compound_parsing() {
        assert_eq!(
            code("compound_AND_4KB_P"),
            PredicateSpec::Compound {
                logic: CompoundLogic::And,
                prefix: "4KB".into(),
                substr: "P".into(),
            }
        );
        assert_eq!(
            code("compound_or_kb_m_extra"),
            PredicateSpec::Compound {
                logic: CompoundLogic::Or,
                prefix: "KB".into(),
                substr: "M".into(),
            }
        );
        assert!(matches!(
            code("compound_XOR_4KB_P"),
            PredicateSpec::Compound {
                logic: CompoundLogic::Unsupported(_),
                ..
            }
        ));
        assert!(!code("compound_AND_4KB").is_recognized());
    }

    #[test]
    fn test_malformed_identifiers_are_unrecognized() {
        assert_eq!(code("custom"), PredicateSpec::Unrecognized("custom".into()));
        assert!(!code("").is_recognized());
        assert!(!code("startswith_").is_recognized());
        assert!(!currency("in_list_ , ").is_recognized());
        assert!(!currency("startswith_4KB").is_recognized());
        assert!(!code("not_ntd").is_recognized());
    }

    #[test]
    fn test_display_reparses_to_same_predicate() {
        let rules = [
            (ConditionType::Currency, "not_ntd"),
            (ConditionType::Currency, "in_list_usd,eur"),
            (ConditionType::ProductCode, "compound_OR_4ss_P"),
            (ConditionType::ProductCode, SHEET_METAL_RULE),
            (ConditionType::ProductCode, "bogus_rule"),
        ];
        for (ct, rule) in rules {
            let spec = PredicateSpec::parse(ct, rule);
            assert_eq!(PredicateSpec::parse(ct, &spec.to_string()), spec, "{rule}");
        }
    }

    #[test]
    fn test_condition_type_of_predicate() {
        assert_eq!(currency("equals_USD").condition_type(), Some(ConditionType::Currency));
        assert_eq!(code("contains_P").condition_type(), Some(ConditionType::ProductCode));
        assert_eq!(code("zzz").condition_type(), None);
    }
}
