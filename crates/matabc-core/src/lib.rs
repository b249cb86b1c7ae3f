pub mod classify;
pub mod error;
pub mod model;
pub mod parsing;
pub mod ranking;
pub mod rules;
pub mod summary;
pub mod table;
pub mod trace;

use classify::outcome::AnalysisResult;
use error::MatAbcError;
use rules::schema::RuleSet;
use summary::Summary;
use table::{ColumnMapping, Table};
use trace::TraceRecorder;

/// Knobs for a single analysis pass.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Record per-rule decision traces for the first `trace_limit` records.
    /// Zero disables tracing.
    pub trace_limit: usize,
}

/// Main API entry point: classify every row of `table` and rank each
/// category by value.
///
/// An incomplete rule set is reported, not rejected; categories without a
/// usable rule never match.
pub fn analyze(
    table: &Table,
    mapping: &ColumnMapping,
    rules: &RuleSet,
    options: &ClassifyOptions,
) -> Result<AnalysisResult, MatAbcError> {
    let validation = rules::validate(rules);
    if !validation.ok {
        for finding in validation.findings() {
            tracing::warn!(%finding, "rule set incomplete");
        }
    }

    let records = table.records(mapping)?;

    let mut recorder = (options.trace_limit > 0).then(|| TraceRecorder::new(options.trace_limit));
    let classified = classify::classify(
        records,
        rules,
        recorder.as_mut().map(|r| r as &mut dyn trace::ClassifyObserver),
    );

    let ranked = ranking::rank(classified);
    let summary = Summary::from_ranked(&ranked);
    tracing::info!(
        records = summary.total_records,
        categories = summary.category_counts.len(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        headers: table.headers.clone(),
        records: ranked,
        summary,
        validation,
        trace: recorder.map(TraceRecorder::into_bundle),
    })
}
