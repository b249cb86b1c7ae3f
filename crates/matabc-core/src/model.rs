use crate::error::EvaluationError;
use crate::parsing::values::coerce_decimal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary material category. Closed set, never extended at runtime.
///
/// Declaration order doubles as the partition order of ranked output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "進口")]
    Import,
    #[serde(alias = "板金")]
    SheetMetal,
    #[serde(alias = "加工件")]
    MachinedPart,
    #[serde(alias = "電料")]
    Electrical,
    #[serde(alias = "市購件")]
    Purchased,
    #[serde(alias = "其他")]
    Other,
    #[serde(alias = "錯誤")]
    Error,
}

impl Category {
    /// Categories that carry a rule in a complete rule set.
    pub const FIXED: [Category; 5] = [
        Category::Import,
        Category::SheetMetal,
        Category::MachinedPart,
        Category::Electrical,
        Category::Purchased,
    ];

    /// Second-stage check order for records that are not imports.
    pub const DOMESTIC_PRIORITY: [Category; 4] = [
        Category::SheetMetal,
        Category::MachinedPart,
        Category::Electrical,
        Category::Purchased,
    ];

    pub const ALL: [Category; 7] = [
        Category::Import,
        Category::SheetMetal,
        Category::MachinedPart,
        Category::Electrical,
        Category::Purchased,
        Category::Other,
        Category::Error,
    ];

    /// Identifier used in rule documents and output columns.
    pub fn key(self) -> &'static str {
        match self {
            Category::Import => "import",
            Category::SheetMetal => "sheet_metal",
            Category::MachinedPart => "machined_part",
            Category::Electrical => "electrical",
            Category::Purchased => "purchased",
            Category::Other => "other",
            Category::Error => "error",
        }
    }

    /// Label used by rule documents exported from the legacy tool.
    pub fn legacy_label(self) -> &'static str {
        match self {
            Category::Import => "進口",
            Category::SheetMetal => "板金",
            Category::MachinedPart => "加工件",
            Category::Electrical => "電料",
            Category::Purchased => "市購件",
            Category::Other => "其他",
            Category::Error => "錯誤",
        }
    }

    /// Resolve a rule-document key: identifier (any case) or legacy label.
    pub fn from_key(s: &str) -> Option<Category> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(trimmed) || c.legacy_label() == trimmed)
    }

    pub fn is_fixed(self) -> bool {
        Category::FIXED.contains(&self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value tier inside a category partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbcTier {
    A,
    B,
    C,
}

impl AbcTier {
    pub const ALL: [AbcTier; 3] = [AbcTier::A, AbcTier::B, AbcTier::C];
}

impl fmt::Display for AbcTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbcTier::A => write!(f, "A"),
            AbcTier::B => write!(f, "B"),
            AbcTier::C => write!(f, "C"),
        }
    }
}

/// A single spreadsheet cell as read from the input table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
    /// Spreadsheet error value such as `#REF!`.
    Error(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Cell {
        Cell::Text(s.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(d) => write!(f, "{}", d.normalize()),
            Cell::Error(code) => f.write_str(code),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<Decimal> for Cell {
    fn from(d: Decimal) -> Self {
        Cell::Number(d)
    }
}

/// One material row: the four mapped fields plus the full source row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Spreadsheet row number (header is row 1), or 0 for ad-hoc records.
    pub row: usize,
    pub product_code: Cell,
    pub currency: Cell,
    pub quantity: Cell,
    pub unit_price: Cell,
    /// Every cell of the source row, in header order.
    #[serde(skip)]
    pub cells: Vec<Cell>,
}

impl Record {
    /// Build a record from text values, as typed by an operator.
    pub fn adhoc(product_code: &str, currency: &str) -> Record {
        Record {
            row: 0,
            product_code: Cell::text(product_code),
            currency: Cell::text(currency),
            quantity: Cell::Empty,
            unit_price: Cell::Empty,
            cells: Vec::new(),
        }
    }

    pub fn with_amount_fields(mut self, quantity: Cell, unit_price: Cell) -> Record {
        self.quantity = quantity;
        self.unit_price = unit_price;
        self
    }

    /// Trimmed, uppercased product code. Missing values become "".
    pub fn product_code_key(&self) -> Result<String, EvaluationError> {
        match_key(&self.product_code, self.row, "product code")
    }

    /// Trimmed, uppercased currency. Missing values become "".
    pub fn currency_key(&self) -> Result<String, EvaluationError> {
        match_key(&self.currency, self.row, "currency")
    }

    /// `quantity * unit_price`, or zero when either side is not numeric.
    pub fn amount(&self) -> Decimal {
        match (coerce_decimal(&self.quantity), coerce_decimal(&self.unit_price)) {
            (Some(q), Some(p)) => q.checked_mul(p).unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }
}

fn match_key(cell: &Cell, row: usize, field: &'static str) -> Result<String, EvaluationError> {
    match cell {
        Cell::Error(code) => Err(EvaluationError::CellError {
            row,
            field,
            code: code.clone(),
        }),
        other => Ok(other.to_string().trim().to_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_from_key_accepts_legacy_labels() {
        assert_eq!(Category::from_key("板金"), Some(Category::SheetMetal));
        assert_eq!(Category::from_key("Import"), Some(Category::Import));
        assert_eq!(Category::from_key(" machined_part "), Some(Category::MachinedPart));
        assert_eq!(Category::from_key("widgets"), None);
    }

    #[test]
    fn test_category_order_follows_declaration() {
        let mut cats = vec![Category::Other, Category::Purchased, Category::Import];
        cats.sort();
        assert_eq!(cats, vec![Category::Import, Category::Purchased, Category::Other]);
    }

    #[test]
    fn test_missing_fields_become_empty_keys() {
        let r = Record {
            row: 2,
            product_code: Cell::Empty,
            currency: Cell::text("  usd "),
            quantity: Cell::Empty,
            unit_price: Cell::Empty,
            cells: vec![],
        };
        assert_eq!(r.product_code_key().unwrap(), "");
        assert_eq!(r.currency_key().unwrap(), "USD");
    }

    #[test]
    fn test_error_cell_is_a_fault() {
        let mut r = Record::adhoc("4KB1", "NTD");
        r.row = 7;
        r.currency = Cell::Error("#REF!".into());
        let err = r.currency_key().unwrap_err();
        assert!(err.to_string().contains("row 7"));
    }

    #[test]
    fn test_amount_coerces_failures_to_zero() {
        let r = Record::adhoc("X", "NTD").with_amount_fields(Cell::from(dec!(3)), Cell::text("12.5"));
        assert_eq!(r.amount(), dec!(37.5));

        let r = Record::adhoc("X", "NTD").with_amount_fields(Cell::text("n/a"), Cell::from(dec!(2)));
        assert_eq!(r.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_numeric_product_code_display() {
        let r = Record {
            product_code: Cell::from(dec!(12345.0)),
            ..Record::adhoc("", "")
        };
        assert_eq!(r.product_code_key().unwrap(), "12345");
    }
}
