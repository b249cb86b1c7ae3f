use crate::model::{AbcTier, Category, Record};
use crate::rules::ValidationReport;
use crate::summary::Summary;
use crate::trace::TraceBundle;
use rust_decimal::Decimal;
use serde::Serialize;

/// A record with its primary category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub category: Category,
}

/// A classified record after ABC ranking within its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub category: Category,
    /// quantity * unit price, zero when either is not numeric.
    pub amount: Decimal,
    /// Running sum of `amount` within the category, in ranked order.
    pub cumulative_amount: Decimal,
    /// `cumulative_amount / category total`, zero when the total is zero.
    pub cumulative_percentage: Decimal,
    pub abc_tier: AbcTier,
}

/// Full result of a classify + rank pass over one table.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Input table headers, in order.
    pub headers: Vec<String>,
    /// Ranked records: grouped by category, descending amount within a group.
    pub records: Vec<RankedRecord>,
    pub summary: Summary,
    pub validation: ValidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceBundle>,
}
