use matabc_core::error::MatAbcError;
use matabc_core::rules::{builtin, load_ruleset};
use matabc_core::table::{export::export_file, read_table_file, ColumnMapping};
use matabc_core::ClassifyOptions;
use std::path::PathBuf;

use crate::output;

pub struct Args {
    pub input_file: PathBuf,
    pub sheet: Option<String>,
    /// Product code, currency, quantity, unit price header overrides.
    pub columns: [Option<String>; 4],
    pub rules: Option<PathBuf>,
    pub output: String,
    pub out: Option<PathBuf>,
    pub trace: usize,
}

pub fn run(args: Args) -> Result<(), MatAbcError> {
    let rules = match &args.rules {
        Some(path) => load_ruleset(path)?,
        None => builtin::default_rules()?,
    };

    let table = read_table_file(&args.input_file, args.sheet.as_deref())?;

    // Unset columns fall back to the positional guess
    let guessed = ColumnMapping::guess(&table.headers)
        .ok_or_else(|| MatAbcError::TableRead("input has no columns".into()))?;
    let [product_code, currency, quantity, unit_price] = args.columns;
    let mapping = ColumnMapping {
        product_code: product_code.unwrap_or(guessed.product_code),
        currency: currency.unwrap_or(guessed.currency),
        quantity: quantity.unwrap_or(guessed.quantity),
        unit_price: unit_price.unwrap_or(guessed.unit_price),
    };
    tracing::debug!(?mapping, "column mapping");

    let options = ClassifyOptions {
        trace_limit: args.trace,
    };
    let result = matabc_core::analyze(&table, &mapping, &rules, &options)?;

    if let Some(path) = &args.out {
        export_file(path, &result)?;
        eprintln!("Wrote {} records to {}", result.records.len(), path.display());
    }

    match args.output.as_str() {
        "json" => output::json::print(&result)?,
        _ => output::table::print(&result),
    }

    Ok(())
}
