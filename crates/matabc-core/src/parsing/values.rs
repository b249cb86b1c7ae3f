use crate::model::Cell;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Coerce a cell into a number for amount calculation.
///
/// Handles formats like:
/// - Number(12.5) -> 12.5
/// - "68" -> 68
/// - " 0.030 " -> 0.030
/// - "1.5e3" -> 1500
/// - "", "n/a", "#REF!" or a thousands-separated "1,200" -> None
pub fn coerce_decimal(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(d) => Some(*d),
        Cell::Text(s) => parse_decimal(s),
        Cell::Empty | Cell::Error(_) => None,
    }
}

/// Parse a decimal from free text, accepting plain and scientific notation.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() || s.contains(',') {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Convert f64 to Decimal, preserving reasonable precision.
///
/// Uses string round-trip to avoid floating-point artifacts
/// (e.g., 0.0035_f64 becoming 0.00349999...). Non-finite input yields None.
pub fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let s = format!("{f}");
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_decimal("68"), Some(dec!(68)));
        assert_eq!(parse_decimal(" 0.030 "), Some(dec!(0.030)));
        assert_eq!(parse_decimal("-4"), Some(dec!(-4)));
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(parse_decimal("1.5e3"), Some(dec!(1500)));
    }

    #[test]
    fn test_non_numeric_is_none() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal("1,200"), None);
        assert_eq!(coerce_decimal(&Cell::Error("#DIV/0!".into())), None);
        assert_eq!(coerce_decimal(&Cell::Empty), None);
    }

    #[test]
    fn test_f64_to_decimal_preserves_precision() {
        assert_eq!(f64_to_decimal(0.0035), Some(dec!(0.0035)));
        assert_eq!(f64_to_decimal(68.0), Some(dec!(68)));
        assert_eq!(f64_to_decimal(1.23), Some(dec!(1.23)));
        assert_eq!(f64_to_decimal(f64::NAN), None);
    }
}
