use matabc_core::classify::explain;
use matabc_core::error::MatAbcError;
use matabc_core::model::Category;
use matabc_core::rules::{self, builtin, schema::RuleSet};
use std::path::Path;

pub fn list() -> Result<(), MatAbcError> {
    let rs = builtin::default_rules()?;

    println!("Built-in rules (checked in this order):\n");
    let order = std::iter::once(Category::Import).chain(Category::DOMESTIC_PRIORITY);
    for category in order {
        match rs.get(category) {
            Some(rule) => {
                println!(
                    "  {:<14} {:<13} {}",
                    category.key(),
                    rule.condition_type.to_string(),
                    rule.predicate
                );
                println!("  {:<14} {}", "", rule.description);
            }
            None => println!("  {:<14} (no rule)", category.key()),
        }
        println!();
    }
    println!("Records matching none of these are classified as 'other'.");

    Ok(())
}

pub fn export(out: Option<&Path>) -> Result<(), MatAbcError> {
    let rs = builtin::default_rules()?;
    match out {
        Some(path) => {
            rules::save_ruleset(&rs, path)?;
            eprintln!("Wrote built-in rules to {}", path.display());
        }
        None => println!("{}", rules::to_json(&rs)?),
    }
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), MatAbcError> {
    let rs = rules::load_ruleset(file)?;
    let report = rules::validate(&rs);

    if report.ok {
        println!("Rule file '{}' is complete.", file.display());
    } else {
        println!("Rule file '{}' is incomplete.", file.display());
    }
    println!("  Rules: {} of {}", rs.rules.len(), Category::FIXED.len());

    let findings = report.findings();
    if !findings.is_empty() {
        println!("\nWarnings:");
        for f in &findings {
            println!("  - {f}");
        }
    }

    Ok(())
}

pub fn test(product_code: &str, currency: &str, rules_file: Option<&Path>) -> Result<(), MatAbcError> {
    let rs: RuleSet = match rules_file {
        Some(path) => rules::load_ruleset(path)?,
        None => builtin::default_rules()?,
    };

    let trace = explain(product_code, currency, &rs);
    println!("Product code: {product_code}");
    println!("Currency:     {currency}\n");
    for step in &trace.steps {
        println!("  {}", step.message);
        for detail in &step.details {
            println!("    {detail}");
        }
    }

    let category = trace.category.unwrap_or(Category::Error);
    println!("\nCategory: {} ({})", category.key(), category.legacy_label());
    Ok(())
}
