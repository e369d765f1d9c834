//! A1 notation helpers.

use crate::errors::{Result, TrendBotError};

/// Accepts a single cell such as `T3` or `AB120`. Ranges, sheet prefixes and
/// R1C1 notation are rejected.
pub fn validate_cell_address(cell: &str) -> Result<()> {
    let letters = cell.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let digits = &cell[letters..];

    let valid = (1..=3).contains(&letters)
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if valid {
        Ok(())
    } else {
        Err(TrendBotError::Configuration(format!(
            "invalid target cell '{}': expected a single A1 cell like T3",
            cell
        )))
    }
}

/// `'Tab Name'!T3`, with embedded quotes doubled.
pub fn a1_range(tab: &str, cell: &str) -> String {
    format!("'{}'!{}", tab.replace('\'', "''"), cell)
}
