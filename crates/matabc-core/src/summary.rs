use crate::classify::outcome::RankedRecord;
use crate::model::{AbcTier, Category};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate statistics over a ranked table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_records: usize,
    pub category_counts: BTreeMap<Category, usize>,
    pub tier_counts: BTreeMap<AbcTier, usize>,
    /// Total amount per category, largest first.
    pub amount_by_category: Vec<(Category, Decimal)>,
    /// Category x tier counts. Every category present has all three tiers.
    pub cross_tab: BTreeMap<Category, BTreeMap<AbcTier, usize>>,
}

impl Summary {
    pub fn from_ranked(records: &[RankedRecord]) -> Summary {
        let mut summary = Summary {
            total_records: records.len(),
            ..Default::default()
        };
        let mut amounts: BTreeMap<Category, Decimal> = BTreeMap::new();

        for r in records {
            *summary.category_counts.entry(r.category).or_default() += 1;
            *summary.tier_counts.entry(r.abc_tier).or_default() += 1;
            let amount = amounts.entry(r.category).or_default();
            *amount = amount.saturating_add(r.amount);
            let row = summary
                .cross_tab
                .entry(r.category)
                .or_insert_with(|| AbcTier::ALL.into_iter().map(|t| (t, 0)).collect());
            *row.entry(r.abc_tier).or_default() += 1;
        }

        let mut by_amount: Vec<(Category, Decimal)> = amounts.into_iter().collect();
        by_amount.sort_by(|a, b| b.1.cmp(&a.1));
        summary.amount_by_category = by_amount;
        summary
    }

    /// Row total for one category (the "All" column of the cross tab).
    pub fn category_total(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// Column total for one tier (the "All" row of the cross tab).
    pub fn tier_total(&self, tier: AbcTier) -> usize {
        self.tier_counts.get(&tier).copied().unwrap_or(0)
    }

    pub fn total_amount(&self) -> Decimal {
        self.amount_by_category
            .iter()
            .fold(Decimal::ZERO, |acc, (_, a)| acc.saturating_add(*a))
    }
}
