pub mod delimited;
pub mod export;
pub mod xlsx;

use crate::error::MatAbcError;
use crate::model::{Cell, Record};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One data row of an input table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Spreadsheet row number; the header is row 1.
    pub row: usize,
    pub cells: Vec<Cell>,
}

/// A tabular dataset with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    /// Project every row onto the four mapped columns.
    ///
    /// Cells past the end of a short row read as empty.
    pub fn records(&self, mapping: &ColumnMapping) -> Result<Vec<Record>, MatAbcError> {
        let idx = mapping.resolve(self)?;
        let cell = |row: &TableRow, i: usize| row.cells.get(i).cloned().unwrap_or_default();

        Ok(self
            .rows
            .iter()
            .map(|row| Record {
                row: row.row,
                product_code: cell(row, idx.product_code),
                currency: cell(row, idx.currency),
                quantity: cell(row, idx.quantity),
                unit_price: cell(row, idx.unit_price),
                cells: row.cells.clone(),
            })
            .collect())
    }
}

/// Header names for the four columns the classifier needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub product_code: String,
    pub currency: String,
    pub quantity: String,
    pub unit_price: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndices {
    product_code: usize,
    currency: usize,
    quantity: usize,
    unit_price: usize,
}

impl ColumnMapping {
    /// Positional guess matching the usual export layout: product code in
    /// column 2, quantity 4, unit price 5, currency 6. Falls back to the first
    /// column when the table is narrower.
    pub fn guess(headers: &[String]) -> Option<ColumnMapping> {
        let first = headers.first()?;
        let at = |i: usize| headers.get(i).unwrap_or(first).clone();
        Some(ColumnMapping {
            product_code: at(1),
            currency: at(5),
            quantity: at(3),
            unit_price: at(4),
        })
    }

    fn resolve(&self, table: &Table) -> Result<ColumnIndices, MatAbcError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| MatAbcError::MissingColumn {
                    column: name.to_string(),
                    headers: table.headers.join(", "),
                })
        };
        Ok(ColumnIndices {
            product_code: find(&self.product_code)?,
            currency: find(&self.currency)?,
            quantity: find(&self.quantity)?,
            unit_price: find(&self.unit_price)?,
        })
    }
}

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<InputFormat, MatAbcError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(InputFormat::Spreadsheet),
            _ => Err(MatAbcError::UnsupportedFormat(ext)),
        }
    }
}

/// Read a CSV or spreadsheet file. `sheet` is ignored for CSV; for
/// spreadsheets `None` picks [`xlsx::default_sheet`].
pub fn read_table_file(path: &Path, sheet: Option<&str>) -> Result<Table, MatAbcError> {
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let table = match format {
        InputFormat::Csv => delimited::read_csv(&bytes)?,
        InputFormat::Spreadsheet => xlsx::read_xlsx(&bytes, sheet)?,
    };
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "table loaded"
    );
    Ok(table)
}

/// Header text for an unnamed column, 0-based index.
fn unnamed_header(index: usize) -> String {
    format!("column_{}", index + 1)
}
