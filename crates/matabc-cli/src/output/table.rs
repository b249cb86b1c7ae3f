use matabc_core::classify::outcome::AnalysisResult;
use matabc_core::model::{AbcTier, Category};
use matabc_core::summary::Summary;
use matabc_core::trace::TraceBundle;
use rust_decimal::Decimal;

pub fn print(result: &AnalysisResult) {
    let findings = result.validation.findings();
    if !findings.is_empty() {
        println!("Rule set warnings:");
        for f in &findings {
            println!("  - {f}");
        }
        println!();
    }

    print_records(result);
    print_summary(&result.summary);

    if let Some(ref trace) = result.trace {
        print_trace(trace);
    }
}

fn print_records(result: &AnalysisResult) {
    let code_width = result
        .records
        .iter()
        .map(|r| r.record.product_code.to_string().chars().count())
        .max()
        .unwrap_or(12)
        .max(12);

    println!(
        "  {:>5}  {:<code_width$}  {:<8}  {:<14}  {:>14}  {:>8}  Tier",
        "Row", "Product code", "Currency", "Category", "Amount", "Cum. %",
    );
    println!("  {}", "-".repeat(code_width + 66));

    let mut current: Option<Category> = None;
    for r in &result.records {
        if current.is_some_and(|c| c != r.category) {
            println!();
        }
        current = Some(r.category);
        println!(
            "  {:>5}  {:<code_width$}  {:<8}  {:<14}  {:>14}  {:>8}  {}",
            r.record.row,
            r.record.product_code.to_string(),
            r.record.currency.to_string(),
            r.category.key(),
            r.amount.round_dp(2).to_string(),
            percent(r.cumulative_percentage),
            r.abc_tier,
        );
    }
    println!();
}

/// Share in [0, 1] as a percentage with two decimals.
fn percent(share: Decimal) -> String {
    match share.checked_mul(Decimal::ONE_HUNDRED) {
        Some(p) => format!("{:.2}%", p.round_dp(2)),
        None => "-".to_string(),
    }
}

fn print_summary(summary: &Summary) {
    println!("=== Summary ({} records) ===\n", summary.total_records);

    println!("  Amount by category:");
    for (category, amount) in &summary.amount_by_category {
        println!(
            "    {:<14} {:>6} records  {:>16}",
            category.key(),
            summary.category_total(*category),
            amount.round_dp(2).to_string()
        );
    }
    println!(
        "    {:<14} {:>6} records  {:>16}\n",
        "total",
        summary.total_records,
        summary.total_amount().round_dp(2).to_string()
    );

    // Category x tier cross tab with margins
    print!("  {:<14}", "");
    for tier in AbcTier::ALL {
        print!("  {:>6}", tier.to_string());
    }
    println!("  {:>6}", "All");
    for (category, row) in &summary.cross_tab {
        print!("  {:<14}", category.key());
        for tier in AbcTier::ALL {
            print!("  {:>6}", row.get(&tier).copied().unwrap_or(0));
        }
        println!("  {:>6}", summary.category_total(*category));
    }
    print!("  {:<14}", "All");
    for tier in AbcTier::ALL {
        print!("  {:>6}", summary.tier_total(tier));
    }
    println!("  {:>6}\n", summary.total_records);
}

fn print_trace(trace: &TraceBundle) {
    println!("=== Decision trace ===\n");
    for record in &trace.records {
        let category = record.category.map(|c| c.key()).unwrap_or("error");
        println!(
            "  row {}: {} / {} -> {}",
            record.row, record.product_code, record.currency, category
        );
        for step in &record.steps {
            println!("    {}", step.message);
            for detail in &step.details {
                println!("      {detail}");
            }
        }
        println!();
    }
}
