use crate::model::Category;
use crate::rules::predicate::{operand, CompoundLogic, ConditionType, PredicateSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rule document: category name -> rule definition.
///
/// Keys are kept as written so that unknown names can be reported instead of
/// rejecting the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSetDef {
    pub rules: BTreeMap<String, RuleDef>,
}

/// A single rule as stored in a rule document.
///
/// Every field reads leniently: missing or null values become "", and the
/// condition type stays raw text so one bad entry cannot sink the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    /// `product_code` or `currency`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub condition_type: String,
    /// Grammar identifier, e.g. `startswith_4KZ` or `in_list_USD,EUR`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rule: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A rule with its identifier parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub condition_type: ConditionType,
    pub predicate: PredicateSpec,
    pub description: String,
}

impl Rule {
    /// Build a rule from a predicate, deriving the condition type and a
    /// description. Returns None for [`PredicateSpec::Unrecognized`].
    pub fn new(predicate: PredicateSpec) -> Option<Rule> {
        let condition_type = predicate.condition_type()?;
        Some(Rule {
            condition_type,
            description: predicate.describe(),
            predicate,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Rule {
        self.description = description.into();
        self
    }

    /// Parse a stored rule. None when the condition type is not recognized.
    pub fn from_def(def: &RuleDef) -> Option<Rule> {
        let condition_type = ConditionType::from_key(&def.condition_type)?;
        Some(Rule {
            condition_type,
            predicate: PredicateSpec::parse(condition_type, &def.rule),
            description: def.description.clone(),
        })
    }

    pub fn to_def(&self) -> RuleDef {
        RuleDef {
            condition_type: self.condition_type.to_string(),
            rule: self.predicate.to_string(),
            description: self.description.clone(),
        }
    }
}

/// Typed constructors. Operands are trimmed and uppercased; the grammar
/// string and the description are derived from the predicate.
///
/// Constructors that take operands return None when the operand could not
/// be written back as a grammar string that parses to the same rule: empty
/// operands, list entries holding `,`, and compound parts holding `_`.
impl Rule {
    fn built(condition_type: ConditionType, predicate: PredicateSpec) -> Rule {
        Rule {
            condition_type,
            description: predicate.describe(),
            predicate,
        }
    }

    fn currency(predicate: PredicateSpec) -> Rule {
        Rule::built(ConditionType::Currency, predicate)
    }

    fn product_code(predicate: PredicateSpec) -> Rule {
        Rule::built(ConditionType::ProductCode, predicate)
    }

    pub fn not_ntd() -> Rule {
        Rule::currency(PredicateSpec::NotNtd)
    }

    pub fn currency_equals(value: &str) -> Option<Rule> {
        Some(Rule::currency(PredicateSpec::Equals(operand(value)?)))
    }

    pub fn currency_not_equals(value: &str) -> Option<Rule> {
        Some(Rule::currency(PredicateSpec::NotEquals(operand(value)?)))
    }

    pub fn currency_in(values: &[&str]) -> Option<Rule> {
        Some(Rule::currency(PredicateSpec::InList(list(values)?)))
    }

    pub fn currency_not_in(values: &[&str]) -> Option<Rule> {
        Some(Rule::currency(PredicateSpec::NotInList(list(values)?)))
    }

    pub fn starts_with(prefix: &str) -> Option<Rule> {
        Some(Rule::product_code(PredicateSpec::StartsWith(operand(prefix)?)))
    }

    pub fn ends_with(suffix: &str) -> Option<Rule> {
        Some(Rule::product_code(PredicateSpec::EndsWith(operand(suffix)?)))
    }

    pub fn contains(substr: &str) -> Option<Rule> {
        Some(Rule::product_code(PredicateSpec::Contains(operand(substr)?)))
    }

    pub fn not_contains(substr: &str) -> Option<Rule> {
        Some(Rule::product_code(PredicateSpec::NotContains(operand(substr)?)))
    }

    pub fn compound(logic: CompoundLogic, prefix: &str, substr: &str) -> Option<Rule> {
        // Normalize through the parser so an unsupported token reads back equal
        let logic = CompoundLogic::parse(&logic.to_string());
        if let CompoundLogic::Unsupported(token) = &logic {
            compound_part(token)?;
        }
        Some(Rule::product_code(PredicateSpec::Compound {
            logic,
            prefix: compound_part(prefix)?,
            substr: compound_part(substr)?,
        }))
    }

    pub fn sheet_metal() -> Rule {
        Rule::product_code(PredicateSpec::SheetMetal)
    }

    pub fn machined_part() -> Rule {
        Rule::product_code(PredicateSpec::MachinedPart)
    }
}

fn list(values: &[&str]) -> Option<Vec<String>> {
    if values.is_empty() {
        return None;
    }
    values
        .iter()
        .map(|v| operand(v).filter(|item| !item.contains(',')))
        .collect()
}

fn compound_part(s: &str) -> Option<String> {
    operand(s).filter(|part| !part.contains('_'))
}

/// Rules keyed by category, ready for evaluation. Read-only during a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub rules: BTreeMap<Category, Rule>,
    /// Entries whose condition type is not recognized. Kept verbatim for
    /// export and reporting; never evaluated.
    pub unusable: BTreeMap<Category, RuleDef>,
    /// Document keys that named no fixed category.
    pub ignored_keys: Vec<String>,
}

impl RuleSet {
    pub fn get(&self, category: Category) -> Option<&Rule> {
        self.rules.get(&category)
    }

    /// Set the rule for a fixed category. Returns the rule it replaced.
    pub fn insert(&mut self, category: Category, rule: Rule) -> Option<Rule> {
        self.unusable.remove(&category);
        self.rules.insert(category, rule)
    }

    pub fn remove(&mut self, category: Category) -> Option<Rule> {
        self.unusable.remove(&category);
        self.rules.remove(&category)
    }

    /// True when the category has an entry, usable or not.
    pub fn has_entry(&self, category: Category) -> bool {
        self.rules.contains_key(&category) || self.unusable.contains_key(&category)
    }
}
