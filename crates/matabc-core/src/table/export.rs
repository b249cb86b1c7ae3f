//! Write ranked records back out as a table: the original columns followed
//! by the analysis columns.

use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};

use crate::classify::outcome::{AnalysisResult, RankedRecord};
use crate::error::MatAbcError;
use crate::model::Cell;

/// Columns appended after the input headers.
pub const ANALYSIS_COLUMNS: [&str; 5] = [
    "category",
    "amount",
    "cumulative_amount",
    "cumulative_percentage",
    "abc_tier",
];

pub fn write_csv<W: Write>(writer: W, result: &AnalysisResult) -> Result<(), MatAbcError> {
    let mut out = csv::Writer::from_writer(writer);

    let header: Vec<&str> = result
        .headers
        .iter()
        .map(String::as_str)
        .chain(ANALYSIS_COLUMNS)
        .collect();
    out.write_record(&header)?;

    for r in &result.records {
        let mut fields: Vec<String> = source_cells(r, result.headers.len())
            .map(|c| c.to_string())
            .collect();
        fields.extend(analysis_fields(r));
        out.write_record(&fields)?;
    }
    out.flush()?;
    Ok(())
}

/// Array of objects keyed by header name. Analysis keys overwrite input
/// columns of the same name.
pub fn write_json<W: Write>(mut writer: W, result: &AnalysisResult) -> Result<(), MatAbcError> {
    let rows: Vec<Value> = result
        .records
        .iter()
        .map(|r| {
            let mut obj = Map::new();
            for (name, cell) in result.headers.iter().zip(source_cells(r, result.headers.len())) {
                obj.insert(name.clone(), cell_json(cell));
            }
            for (name, value) in ANALYSIS_COLUMNS.iter().zip(analysis_fields(r)) {
                obj.insert((*name).to_string(), Value::String(value));
            }
            Value::Object(obj)
        })
        .collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.flush()?;
    Ok(())
}

/// Export by file extension: `.csv` or `.json`.
pub fn export_file(path: &Path, result: &AnalysisResult) -> Result<(), MatAbcError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let write: fn(std::io::BufWriter<std::fs::File>, &AnalysisResult) -> Result<(), MatAbcError> =
        match ext.as_str() {
            "csv" => write_csv,
            "json" => write_json,
            other => {
                return Err(MatAbcError::Export(format!(
                    "unsupported output format '{other}', use .csv or .json"
                )))
            }
        };
    let file = std::fs::File::create(path)?;
    write(std::io::BufWriter::new(file), result)?;
    tracing::debug!(path = %path.display(), records = result.records.len(), "results exported");
    Ok(())
}

fn source_cells(r: &RankedRecord, width: usize) -> impl Iterator<Item = &Cell> {
    const EMPTY: &Cell = &Cell::Empty;
    (0..width).map(move |i| r.record.cells.get(i).unwrap_or(EMPTY))
}

fn analysis_fields(r: &RankedRecord) -> [String; 5] {
    [
        r.category.key().to_string(),
        r.amount.normalize().to_string(),
        r.cumulative_amount.normalize().to_string(),
        r.cumulative_percentage.normalize().to_string(),
        r.abc_tier.to_string(),
    ]
}

fn cell_json(cell: &Cell) -> Value {
    match cell {
        Cell::Empty => Value::Null,
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AbcTier, Category, Record};
    use crate::rules::ValidationReport;
    use crate::summary::Summary;
    use rust_decimal_macros::dec;

    fn result() -> AnalysisResult {
        let record = Record {
            row: 2,
            product_code: Cell::text("4KZ-1"),
            currency: Cell::text("NTD"),
            quantity: Cell::text("2"),
            unit_price: Cell::text("10"),
            cells: vec![Cell::text("4KZ-1"), Cell::text("NTD"), Cell::text("2")],
        };
        let ranked = RankedRecord {
            record,
            category: Category::Electrical,
            amount: dec!(20),
            cumulative_amount: dec!(20),
            cumulative_percentage: dec!(1.00),
            abc_tier: AbcTier::C,
        };
        AnalysisResult {
            headers: vec!["code".into(), "currency".into(), "qty".into(), "price".into()],
            summary: Summary::from_ranked(std::slice::from_ref(&ranked)),
            records: vec![ranked],
            validation: ValidationReport::default(),
            trace: None,
        }
    }

    #[test]
    fn test_csv_appends_analysis_columns() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &result()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "code,currency,qty,price,category,amount,cumulative_amount,cumulative_percentage,abc_tier"
        );
        assert_eq!(lines.next().unwrap(), "4KZ-1,NTD,2,,electrical,20,20,1,C");
    }

    #[test]
    fn test_json_objects_keyed_by_header() {
        let mut buf = Vec::new();
        write_json(&mut buf, &result()).unwrap();
        let v: Value = serde_json::from_slice(&buf).unwrap();
        let row = &v[0];
        assert_eq!(row["code"], "4KZ-1");
        assert_eq!(row["price"], Value::Null);
        assert_eq!(row["category"], "electrical");
        assert_eq!(row["abc_tier"], "C");
    }

    /// Accepts every write, fails on flush.
    struct UnflushableWriter(Vec<u8>);

    impl Write for UnflushableWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn test_json_flush_failure_is_reported() {
        let err = write_json(UnflushableWriter(Vec::new()), &result()).unwrap_err();
        assert!(matches!(err, MatAbcError::Io(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_export_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out.csv");
        export_file(&csv_path, &result()).unwrap();
        assert!(std::fs::read_to_string(&csv_path).unwrap().contains("abc_tier"));

        let json_path = dir.path().join("out.JSON");
        export_file(&json_path, &result()).unwrap();
        let v: Value = serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
        assert_eq!(v[0]["category"], "electrical");

        let bad = dir.path().join("out.xlsx");
        assert!(matches!(
            export_file(&bad, &result()),
            Err(MatAbcError::Export(_))
        ));
    }
}
