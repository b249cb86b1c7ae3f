//! ABC value analysis, run independently inside each category.

use crate::classify::outcome::{ClassifiedRecord, RankedRecord};
use crate::model::{AbcTier, Category};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Highest cumulative share (inclusive) still ranked A.
pub const TIER_A_MAX: Decimal = Decimal::from_parts(70, 0, 0, false, 2);
/// Highest cumulative share (inclusive) still ranked B.
pub const TIER_B_MAX: Decimal = Decimal::from_parts(90, 0, 0, false, 2);

/// Compute amount, cumulative share and tier for every record.
///
/// Output is grouped by category (in [`Category`] order) and sorted by
/// descending amount inside each group. The sort is stable, so records with
/// equal amounts keep their input order.
pub fn rank(classified: Vec<ClassifiedRecord>) -> Vec<RankedRecord> {
    let mut rows: Vec<(ClassifiedRecord, Decimal)> = classified
        .into_iter()
        .map(|c| {
            let amount = c.record.amount();
            (c, amount)
        })
        .collect();

    rows.sort_by(|(a, amount_a), (b, amount_b)| {
        a.category
            .cmp(&b.category)
            .then_with(|| amount_b.cmp(amount_a))
    });

    let mut totals: BTreeMap<Category, Decimal> = BTreeMap::new();
    for (c, amount) in &rows {
        let total = totals.entry(c.category).or_default();
        *total = total.saturating_add(*amount);
    }

    let mut running: BTreeMap<Category, Decimal> = BTreeMap::new();
    rows.into_iter()
        .map(|(c, amount)| {
            let cumulative = running.entry(c.category).or_default();
            *cumulative = cumulative.saturating_add(amount);
            let cumulative_amount = *cumulative;

            let total = totals.get(&c.category).copied().unwrap_or_default();
            let cumulative_percentage = if total.is_zero() {
                Decimal::ZERO
            } else {
                cumulative_amount.checked_div(total).unwrap_or_default()
            };

            RankedRecord {
                abc_tier: tier_for(amount, cumulative_percentage),
                record: c.record,
                category: c.category,
                amount,
                cumulative_amount,
                cumulative_percentage,
            }
        })
        .collect()
}

/// Tier for one record. Boundaries are inclusive; a zero amount is always C.
pub fn tier_for(amount: Decimal, cumulative_percentage: Decimal) -> AbcTier {
    if amount.is_zero() {
        AbcTier::C
    } else if cumulative_percentage <= TIER_A_MAX {
        AbcTier::A
    } else if cumulative_percentage <= TIER_B_MAX {
        AbcTier::B
    } else {
        AbcTier::C
    }
}
