//! Display/storage date translation.
//!
//! Users type and read `DD/MM/YYYY`; storage holds `YYYY-MM-DD`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static DISPLAY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("valid display date regex")
});

const DISPLAY_FORMAT: &str = "%d/%m/%Y";
const STORAGE_FORMAT: &str = "%Y-%m-%d";

/// Rejected date input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateValidationError {
    /// Text does not look like `DD/MM/YYYY`.
    #[error("`{0}` is not in DD/MM/YYYY format")]
    Pattern(String),
    /// Text has the right shape but names no calendar day.
    #[error("`{0}` is not a real calendar date")]
    Impossible(String),
}

/// Parses a `DD/MM/YYYY` date typed by a user.
///
/// Surrounding whitespace is ignored. Day and month must be two digits and the
/// year four, so a successful parse always formats back to the same text.
pub fn parse_display_date(text: &str) -> Result<NaiveDate, DateValidationError> {
    let trimmed = text.trim();
    let captures = DISPLAY_DATE_RE
        .captures(trimmed)
        .ok_or_else(|| DateValidationError::Pattern(trimmed.to_string()))?;

    let field = |index: usize| -> Result<u32, DateValidationError> {
        captures[index]
            .parse::<u32>()
            .map_err(|_| DateValidationError::Pattern(trimmed.to_string()))
    };
    let day = field(1)?;
    let month = field(2)?;
    let year = i32::try_from(field(3)?)
        .map_err(|_| DateValidationError::Pattern(trimmed.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateValidationError::Impossible(trimmed.to_string()))
}

/// Renders a date as `DD/MM/YYYY`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Renders a date in canonical storage form, `YYYY-MM-DD`.
pub fn to_storage_date(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}

/// Parses canonical storage text back into a date.
pub fn parse_storage_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, STORAGE_FORMAT).ok()
}
