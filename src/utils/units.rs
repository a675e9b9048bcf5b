//! Small numeric helpers shared by the column model and the backends

use crate::utils::error::{TableError, TableResult};

const NUMERIC: &str = "0123456789+-.";

/// Split a length such as `"3.5cm"` into its number and unit
pub fn string_to_float_unit(string: &str) -> TableResult<(f64, String)> {
    let string = string.trim();
    let split = string
        .char_indices()
        .find(|(_, c)| !NUMERIC.contains(*c))
        .map(|(i, _)| i)
        .unwrap_or(string.len());

    let number = string[..split].trim();
    let value = number.parse::<f64>().map_err(|_| {
        TableError::invalid_width(
            string,
            format!("could not convert {:?} to a number", number),
        )
    })?;

    Ok((value, string[split..].trim().to_string()))
}

/// Format a number with at most two decimals and no trailing zeros
pub fn format_decimal(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Spreadsheet-style column letters: 0 → A, 25 → Z, 26 → AA
pub fn number_to_uppercase(number: usize) -> String {
    let mut letters = Vec::new();
    let mut n = number + 1;

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }

    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_float_unit() {
        assert_eq!(string_to_float_unit("3cm").unwrap(), (3.0, "cm".to_string()));
        assert_eq!(
            string_to_float_unit(" 2.5 em ").unwrap(),
            (2.5, "em".to_string())
        );
        assert_eq!(string_to_float_unit("0.4").unwrap(), (0.4, String::new()));
        assert_eq!(string_to_float_unit("+0.30").unwrap(), (0.3, String::new()));
    }

    #[test]
    fn test_string_to_float_unit_invalid() {
        let err = string_to_float_unit("wide").unwrap_err();
        assert!(matches!(err, TableError::InvalidWidth { .. }));
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(3.0), "3");
        assert_eq!(format_decimal(1.5), "1.5");
        assert_eq!(format_decimal(0.126), "0.13");
        assert_eq!(format_decimal(0.0), "0");
    }

    #[test]
    fn test_number_to_uppercase() {
        assert_eq!(number_to_uppercase(0), "A");
        assert_eq!(number_to_uppercase(25), "Z");
        assert_eq!(number_to_uppercase(26), "AA");
        assert_eq!(number_to_uppercase(27), "AB");
    }
}
