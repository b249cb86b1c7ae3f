//! Per-record decision tracing for the classifier.
//!
//! The classifier reports every rule check to an optional
//! [`ClassifyObserver`]. [`TraceRecorder`] is the stock observer: it keeps
//! the steps for the first few records so an operator can see why a code
//! landed where it did.

use crate::classify::evaluate::clause_details;
use crate::error::EvaluationError;
use crate::model::{Category, Record};
use crate::rules::schema::Rule;
use serde::{Deserialize, Serialize};

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

/// Which stage of the two-stage classification a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Import,
    Domestic,
}

/// Receives classifier events. All methods default to no-ops.
pub trait ClassifyObserver {
    /// A rule was evaluated for the record at `index`.
    fn rule_checked(
        &mut self,
        _index: usize,
        _record: &Record,
        _stage: Stage,
        _category: Category,
        _rule: &Rule,
        _matched: bool,
    ) {
    }

    /// A category had no rule and was skipped.
    fn rule_missing(&mut self, _index: usize, _record: &Record, _category: Category) {}

    /// Final label for the record at `index`.
    fn decided(&mut self, _index: usize, _record: &Record, _category: Category) {}

    /// The record could not be evaluated and was labelled as an error.
    fn failed(&mut self, _index: usize, _record: &Record, _error: &EvaluationError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ClassifyObserver for NoopObserver {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStepType {
    ImportCheck,
    DomesticCheck,
    MissingRule,
    Fallback,
    Fault,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_type: TraceStepType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Every step taken for one record, plus the label it ended with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordTrace {
    pub index: usize,
    pub row: usize,
    pub product_code: String,
    pub currency: String,
    pub steps: Vec<TraceStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceBundle {
    pub trace_schema_version: String,
    pub records: Vec<RecordTrace>,
}

/// Records the steps of the first `limit` records.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    limit: usize,
    records: Vec<RecordTrace>,
}

impl TraceRecorder {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[RecordTrace] {
        &self.records
    }

    pub fn into_bundle(self) -> TraceBundle {
        TraceBundle {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            records: self.records,
        }
    }

    fn entry(&mut self, index: usize, record: &Record) -> Option<&mut RecordTrace> {
        if index >= self.limit {
            return None;
        }
        let is_new = self.records.last().map_or(true, |t| t.index != index);
        if is_new {
            self.records.push(RecordTrace {
                index,
                row: record.row,
                product_code: record.product_code.to_string(),
                currency: record.currency.to_string(),
                steps: Vec::new(),
                category: None,
            });
        }
        self.records.last_mut()
    }
}

impl ClassifyObserver for TraceRecorder {
    fn rule_checked(
        &mut self,
        index: usize,
        record: &Record,
        stage: Stage,
        category: Category,
        rule: &Rule,
        matched: bool,
    ) {
        let code = record.product_code_key().unwrap_or_default();
        if let Some(trace) = self.entry(index, record) {
            let step_type = match stage {
                Stage::Import => TraceStepType::ImportCheck,
                Stage::Domestic => TraceStepType::DomesticCheck,
            };
            trace.steps.push(TraceStep {
                step_type,
                category: Some(category),
                matched: Some(matched),
                message: format!(
                    "{}: {} -> {}",
                    category,
                    rule_label(rule),
                    if matched { "match" } else { "no match" }
                ),
                details: clause_details(&rule.predicate, &code),
            });
        }
    }

    fn rule_missing(&mut self, index: usize, record: &Record, category: Category) {
        if let Some(trace) = self.entry(index, record) {
            trace.steps.push(TraceStep {
                step_type: TraceStepType::MissingRule,
                category: Some(category),
                matched: None,
                message: format!("{category}: no rule configured, skipped"),
                details: Vec::new(),
            });
        }
    }

    fn decided(&mut self, index: usize, record: &Record, category: Category) {
        if let Some(trace) = self.entry(index, record) {
            if category == Category::Other {
                trace.steps.push(TraceStep {
                    step_type: TraceStepType::Fallback,
                    category: Some(category),
                    matched: None,
                    message: "no rule matched, classified as other".into(),
                    details: Vec::new(),
                });
            }
            trace.category = Some(category);
        }
    }

    fn failed(&mut self, index: usize, record: &Record, error: &EvaluationError) {
        if let Some(trace) = self.entry(index, record) {
            trace.steps.push(TraceStep {
                step_type: TraceStepType::Fault,
                category: Some(Category::Error),
                matched: None,
                message: error.to_string(),
                details: Vec::new(),
            });
            trace.category = Some(Category::Error);
        }
    }
}

fn rule_label(rule: &Rule) -> String {
    if rule.description.is_empty() {
        rule.predicate.describe()
    } else {
        rule.description.clone()
    }
}
