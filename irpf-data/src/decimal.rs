use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error, PartialEq)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

impl ParseDecimalError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Rewrites a locale-formatted number into the `1234.56` form.
///
/// When both `,` and `.` appear, the one occurring last is the decimal
/// separator and the other groups thousands. A single `,` is a decimal comma.
/// A separator repeated more than once only groups thousands.
fn normalize_locale_input(s: &str) -> String {
    let compact: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let last_comma = compact.rfind(',');
    let last_dot = compact.rfind('.');
    let commas = compact.matches(',').count();
    let dots = compact.matches('.').count();

    match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) if commas == 1 => compact.replace(',', "."),
        (Some(_), None) => compact.replace(',', ""),
        (None, Some(_)) if dots > 1 => compact.replace('.', ""),
        _ => compact,
    }
}

/// Parses a number written with either the Spanish or the English
/// convention.
///
/// Empty or whitespace-only input is treated as 0.
///
/// # Examples
///
/// ```
/// use irpf_data::parse_locale_decimal;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_locale_decimal("0,095").unwrap(), dec!(0.095));
/// assert_eq!(parse_locale_decimal("12.450,00").unwrap(), dec!(12450));
/// assert_eq!(parse_locale_decimal("12450.5").unwrap(), dec!(12450.5));
/// ```
pub fn parse_locale_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_locale_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Numeric setting as written in the configuration file: a TOML integer, a
/// TOML float, or a string in either locale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDecimal {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawDecimal {
    /// True for a string holding only whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    pub fn to_decimal(&self) -> Result<Decimal, ParseDecimalError> {
        match self {
            Self::Integer(value) => Ok(Decimal::from(*value)),
            // The shortest round-trip representation of the float, so `0.095`
            // stays `0.095` instead of picking up binary noise.
            Self::Float(value) => {
                let text = value.to_string();
                text.parse().map_err(|e| ParseDecimalError {
                    input: text,
                    source: e,
                })
            }
            Self::Text(text) => parse_locale_decimal(text),
        }
    }
}
