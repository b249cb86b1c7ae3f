use csv::ReaderBuilder;

use crate::error::MatAbcError;
use crate::model::Cell;
use crate::table::{unnamed_header, Table, TableRow};

/// Parse CSV bytes with a header row. Rows may vary in length; blank rows
/// are skipped. Every non-empty field is kept as text.
pub fn read_csv(bytes: &[u8]) -> Result<Table, MatAbcError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| match h.trim() {
            "" => unnamed_header(i),
            name => name.to_string(),
        })
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        let cells: Vec<Cell> = record
            .iter()
            .map(|value| match value.trim() {
                "" => Cell::Empty,
                text => Cell::text(text),
            })
            .collect();

        if cells.iter().all(Cell::is_blank) {
            continue;
        }

        rows.push(TableRow { row, cells });
    }

    if headers.is_empty() {
        return Err(MatAbcError::TableRead("CSV has no header row".into()));
    }

    Ok(Table { headers, rows })
}
