use crate::classify::evaluate::matches;
use crate::classify::outcome::ClassifiedRecord;
use crate::error::EvaluationError;
use crate::model::{Category, Record};
use crate::rules::schema::RuleSet;
use crate::trace::{ClassifyObserver, NoopObserver, RecordTrace, Stage, TraceRecorder};

/// Label every record with exactly one category.
///
/// Import is checked first; non-imports take the first match in
/// [`Category::DOMESTIC_PRIORITY`], else [`Category::Other`]. A record that
/// cannot be evaluated is labelled [`Category::Error`] and the batch goes on.
pub fn classify(
    records: Vec<Record>,
    rules: &RuleSet,
    observer: Option<&mut dyn ClassifyObserver>,
) -> Vec<ClassifiedRecord> {
    match observer {
        Some(o) => classify_all(records, rules, o),
        None => classify_all(records, rules, &mut NoopObserver),
    }
}

fn classify_all(
    records: Vec<Record>,
    rules: &RuleSet,
    observer: &mut dyn ClassifyObserver,
) -> Vec<ClassifiedRecord> {
    tracing::debug!(records = records.len(), rules = rules.rules.len(), "classifying");

    let mut faults = 0usize;
    let classified: Vec<ClassifiedRecord> = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let category = classify_record(index, &record, rules, &mut *observer);
            if category == Category::Error {
                faults += 1;
            }
            ClassifiedRecord { record, category }
        })
        .collect();

    if faults > 0 {
        tracing::warn!(faults, "some records could not be classified");
    }
    classified
}

/// Classify a single record, reporting each step to `observer`.
pub fn classify_record(
    index: usize,
    record: &Record,
    rules: &RuleSet,
    observer: &mut dyn ClassifyObserver,
) -> Category {
    match try_classify(index, record, rules, observer) {
        Ok(category) => {
            observer.decided(index, record, category);
            category
        }
        Err(e) => {
            tracing::warn!(row = record.row, error = %e, "record classified as error");
            observer.failed(index, record, &e);
            Category::Error
        }
    }
}

fn try_classify(
    index: usize,
    record: &Record,
    rules: &RuleSet,
    observer: &mut dyn ClassifyObserver,
) -> Result<Category, EvaluationError> {
    let code = record.product_code_key()?;
    let currency = record.currency_key()?;

    // Stage 1: import wins over everything else
    match rules.get(Category::Import) {
        Some(rule) => {
            let matched = matches(&rule.predicate, &code, &currency);
            observer.rule_checked(index, record, Stage::Import, Category::Import, rule, matched);
            if matched {
                return Ok(Category::Import);
            }
        }
        None => observer.rule_missing(index, record, Category::Import),
    }

    // Stage 2: domestic categories in fixed priority order
    for category in Category::DOMESTIC_PRIORITY {
        let Some(rule) = rules.get(category) else {
            observer.rule_missing(index, record, category);
            continue;
        };
        let matched = matches(&rule.predicate, &code, &currency);
        observer.rule_checked(index, record, Stage::Domestic, category, rule, matched);
        if matched {
            return Ok(category);
        }
    }

    Ok(Category::Other)
}

/// Run one ad-hoc product code / currency pair through the classifier and
/// return every step it took.
pub fn explain(product_code: &str, currency: &str, rules: &RuleSet) -> RecordTrace {
    let record = Record::adhoc(product_code, currency);
    let mut recorder = TraceRecorder::new(1);
    let category = classify_record(0, &record, rules, &mut recorder);
    recorder
        .records()
        .first()
        .cloned()
        .unwrap_or_else(|| RecordTrace {
            index: 0,
            row: 0,
            product_code: product_code.to_string(),
            currency: currency.to_string(),
            steps: Vec::new(),
            category: Some(category),
        })
}
