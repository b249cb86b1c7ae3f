use std::io::Cursor;

use calamine::{Data, Range, Reader};
use rust_decimal::Decimal;

use crate::error::MatAbcError;
use crate::model::Cell;
use crate::parsing::values::f64_to_decimal;
use crate::table::{unnamed_header, Table, TableRow};

/// Sheets picked by default when present, in order of preference.
pub const PREFERRED_SHEETS: &[&str] = &["uservo2000", "分類物料"];

/// List worksheet names of a spreadsheet (xlsx, xlsm, xls or ods).
pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>, MatAbcError> {
    let workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MatAbcError::TableRead(format!("failed to open spreadsheet: {e}")))?;
    Ok(workbook.sheet_names())
}

/// Sheet to use when the caller names none: a preferred sheet if present,
/// else the first.
pub fn default_sheet(names: &[String]) -> Option<&str> {
    PREFERRED_SHEETS
        .iter()
        .find_map(|preferred| names.iter().find(|n| n.as_str() == *preferred))
        .or_else(|| names.first())
        .map(String::as_str)
}

/// Read one worksheet into a [`Table`]. The first row holds the headers;
/// fully blank rows are skipped.
pub fn read_xlsx(bytes: &[u8], sheet: Option<&str>) -> Result<Table, MatAbcError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MatAbcError::TableRead(format!("failed to open spreadsheet: {e}")))?;

    let names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(s) => s.to_string(),
        None => default_sheet(&names)
            .ok_or_else(|| MatAbcError::TableRead("spreadsheet has no worksheets".into()))?
            .to_string(),
    };
    if !names.contains(&sheet_name) {
        return Err(MatAbcError::SheetNotFound {
            sheet: sheet_name,
            available: names.join(", "),
        });
    }

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| MatAbcError::TableRead(format!("sheet '{sheet_name}': {e}")))?;

    let table = table_from_range(&range, &sheet_name)?;
    tracing::debug!(sheet = %sheet_name, rows = table.rows.len(), "worksheet read");
    Ok(table)
}

/// Header row first; row numbers follow the sheet, not the used range.
fn table_from_range(range: &Range<Data>, sheet_name: &str) -> Result<Table, MatAbcError> {
    // Spreadsheet row number of the first row in the used range
    let first_row = range.start().map(|(r, _)| r as usize + 1).unwrap_or(1);

    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| MatAbcError::TableRead(format!("sheet '{sheet_name}' is empty")))?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.to_string().trim() {
            "" => unnamed_header(i),
            name => name.to_string(),
        })
        .collect();

    let mut rows = Vec::new();
    for (idx, data_row) in rows_iter.enumerate() {
        let cells: Vec<Cell> = data_row.iter().map(cell_from_data).collect();
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        rows.push(TableRow {
            row: first_row + idx + 1,
            cells,
        });
    }
    Ok(Table { headers, rows })
}

fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.trim().to_string())
            }
        }
        Data::Float(f) => f64_to_decimal(*f).map(Cell::Number).unwrap_or(Cell::Empty),
        Data::Int(i) => Cell::Number(Decimal::from(*i)),
        Data::Error(e) => Cell::Error(e.to_string()),
        _ => Cell::Text(format!("{cell}")),
    }
}
