use crate::error::MatAbcError;
use crate::rules::parse_ruleset_str;
use crate::rules::schema::RuleSet;

const DEFAULT_RULES_JSON: &str = include_str!("../../../../rules/default.json");

/// The stock rule set: non-NTD currency is an import; 4KB/KB/4KZ/4SS code
/// families split the domestic parts.
pub fn default_rules() -> Result<RuleSet, MatAbcError> {
    parse_ruleset_str(DEFAULT_RULES_JSON)
}
