//! Validated progressive tables.
//!
//! A [`BracketTable`] can only be built from rows that describe a single
//! contiguous scale starting at zero. Malformed rows are rejected with a
//! [`ConfigurationError`] when the table is loaded, so the apportioner never
//! has to second-guess its input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::TaxBracket;

/// Reasons a set of brackets cannot form a table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("bracket table has no rows")]
    EmptyTable,

    #[error("first bracket must start at 0, got {0}")]
    FirstBracketNotAtZero(Decimal),

    #[error("bracket {index} has a negative bound")]
    NegativeBound { index: usize },

    #[error("bracket {index} ends at {end}, which is not above its start {start}")]
    EmptyRange {
        index: usize,
        start: Decimal,
        end: Decimal,
    },

    /// Ranges must be contiguous: each bracket starts where the previous ended.
    #[error("bracket {index} starts at {start} but the previous bracket ends at {previous_end}")]
    NotContiguous {
        index: usize,
        start: Decimal,
        previous_end: Decimal,
    },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedNotLast { index: usize },

    #[error("bracket {index} has rate {rate}, expected a fraction between 0 and 1")]
    RateOutOfRange { index: usize, rate: Decimal },
}

/// Ordered, non-overlapping brackets for one jurisdiction and tax year.
///
/// Immutable once built. The top bracket may be bounded, in which case any
/// income above [`BracketTable::span`] is left unallocated by the apportioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates `brackets` and wraps them in a table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the rows are empty, do not start at
    /// zero, contain negative or empty ranges, leave gaps or overlaps between
    /// consecutive rows, place an unbounded row anywhere but last, or carry a
    /// rate outside `[0, 1]`.
    ///
    /// # Example
    ///
    /// ```
    /// use irpf_core::{BracketTable, TaxBracket};
    /// use rust_decimal_macros::dec;
    ///
    /// let table = BracketTable::new(vec![
    ///     TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
    ///     TaxBracket::bounded(dec!(10000), dec!(20000), dec!(0.20)),
    ///     TaxBracket::unbounded(dec!(20000), dec!(0.30)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.len(), 3);
    /// assert_eq!(table.span(), None);
    /// ```
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, ConfigurationError> {
        let first = brackets.first().ok_or(ConfigurationError::EmptyTable)?;
        if first.range_start != Decimal::ZERO {
            return Err(ConfigurationError::FirstBracketNotAtZero(
                first.range_start,
            ));
        }

        let last_index = brackets.len() - 1;
        let mut previous_end: Option<Decimal> = None;

        for (index, bracket) in brackets.iter().enumerate() {
            Self::check_bracket(index, bracket)?;

            if let Some(previous_end) = previous_end {
                if bracket.range_start != previous_end {
                    return Err(ConfigurationError::NotContiguous {
                        index,
                        start: bracket.range_start,
                        previous_end,
                    });
                }
            }

            match bracket.range_end {
                Some(end) => previous_end = Some(end),
                None if index != last_index => {
                    return Err(ConfigurationError::UnboundedNotLast { index });
                }
                None => {}
            }
        }

        debug!(rows = brackets.len(), "bracket table validated");
        Ok(Self { brackets })
    }

    fn check_bracket(
        index: usize,
        bracket: &TaxBracket,
    ) -> Result<(), ConfigurationError> {
        let negative_end = bracket.range_end.is_some_and(|end| end < Decimal::ZERO);
        if bracket.range_start < Decimal::ZERO || negative_end {
            return Err(ConfigurationError::NegativeBound { index });
        }
        if let Some(end) = bracket.range_end {
            if end <= bracket.range_start {
                return Err(ConfigurationError::EmptyRange {
                    index,
                    start: bracket.range_start,
                    end,
                });
            }
        }
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(ConfigurationError::RateOutOfRange {
                index,
                rate: bracket.rate,
            });
        }
        Ok(())
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaxBracket> {
        self.brackets.iter()
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// Always `false`; a table holds at least one bracket.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Total income covered by the table, or `None` when the top bracket is
    /// unbounded.
    pub fn span(&self) -> Option<Decimal> {
        self.brackets.last().and_then(|bracket| bracket.range_end)
    }

    /// Rate of the top bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets
            .last()
            .map(|bracket| bracket.rate)
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = ConfigurationError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

impl<'a> IntoIterator for &'a BracketTable {
    type Item = &'a TaxBracket;
    type IntoIter = std::slice::Iter<'a, TaxBracket>;

    fn into_iter(self) -> Self::IntoIter {
        self.brackets.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn valid_rows() -> Vec<TaxBracket> {
        vec![
            TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
            TaxBracket::bounded(dec!(10000), dec!(20000), dec!(0.20)),
            TaxBracket::unbounded(dec!(20000), dec!(0.30)),
        ]
    }

    // =========================================================================
    // accepted tables
    // =========================================================================

    #[test]
    fn new_accepts_contiguous_rows() {
        let table = BracketTable::new(valid_rows()).expect("rows are valid");

        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert_eq!(table.brackets()[1].rate, dec!(0.20));
        assert_eq!(table.top_rate(), dec!(0.30));
    }

    #[test]
    fn new_accepts_bounded_top_bracket() {
        let table = BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
            TaxBracket::bounded(dec!(10000), dec!(20000), dec!(0.20)),
        ])
        .expect("bounded top bracket is allowed");

        assert_eq!(table.span(), Some(dec!(20000)));
    }

    #[test]
    fn new_accepts_zero_and_full_rates() {
        let table = BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(5000), dec!(0)),
            TaxBracket::unbounded(dec!(5000), dec!(1)),
        ]);

        assert!(table.is_ok());
    }

    #[test]
    fn span_is_none_when_top_bracket_unbounded() {
        let table = BracketTable::new(valid_rows()).unwrap();

        assert_eq!(table.span(), None);
    }

    // =========================================================================
    // rejected tables
    // =========================================================================

    #[test]
    fn new_rejects_empty_rows() {
        assert_eq!(BracketTable::new(vec![]), Err(ConfigurationError::EmptyTable));
    }

    #[test]
    fn new_rejects_first_bracket_above_zero() {
        let result = BracketTable::new(vec![TaxBracket::unbounded(dec!(100), dec!(0.10))]);

        assert_eq!(
            result,
            Err(ConfigurationError::FirstBracketNotAtZero(dec!(100)))
        );
    }

    #[test]
    fn new_rejects_negative_start() {
        let result = BracketTable::new(vec![TaxBracket::unbounded(dec!(-1), dec!(0.10))]);

        assert_eq!(
            result,
            Err(ConfigurationError::FirstBracketNotAtZero(dec!(-1)))
        );
    }

    #[test]
    fn new_rejects_negative_end() {
        let result = BracketTable::new(vec![TaxBracket::bounded(
            dec!(0),
            dec!(-500),
            dec!(0.10),
        )]);

        assert_eq!(result, Err(ConfigurationError::NegativeBound { index: 0 }));
    }

    #[test]
    fn new_rejects_empty_range() {
        let result = BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
            TaxBracket::bounded(dec!(10000), dec!(10000), dec!(0.20)),
        ]);

        assert_eq!(
            result,
            Err(ConfigurationError::EmptyRange {
                index: 1,
                start: dec!(10000),
                end: dec!(10000),
            })
        );
    }

    #[test]
    fn new_rejects_gap_between_brackets() {
        let result = BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
            TaxBracket::unbounded(dec!(12000), dec!(0.20)),
        ]);

        assert_eq!(
            result,
            Err(ConfigurationError::NotContiguous {
                index: 1,
                start: dec!(12000),
                previous_end: dec!(10000),
            })
        );
    }

    #[test]
    fn new_rejects_overlapping_brackets() {
        let result = BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
            TaxBracket::unbounded(dec!(8000), dec!(0.20)),
        ]);

        assert!(matches!(
            result,
            Err(ConfigurationError::NotContiguous { index: 1, .. })
        ));
    }

    #[test]
    fn new_rejects_descending_rows() {
        let result = BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(20000), dec!(0.10)),
            TaxBracket::bounded(dec!(10000), dec!(20000), dec!(0.20)),
        ]);

        assert!(matches!(
            result,
            Err(ConfigurationError::NotContiguous { index: 1, .. })
        ));
    }

    #[test]
    fn new_rejects_unbounded_bracket_before_last() {
        let result = BracketTable::new(vec![
            TaxBracket::unbounded(dec!(0), dec!(0.10)),
            TaxBracket::unbounded(dec!(10000), dec!(0.20)),
        ]);

        assert_eq!(result, Err(ConfigurationError::UnboundedNotLast { index: 0 }));
    }

    #[test]
    fn new_rejects_rate_above_one() {
        let result = BracketTable::new(vec![TaxBracket::unbounded(dec!(0), dec!(9.5))]);

        assert_eq!(
            result,
            Err(ConfigurationError::RateOutOfRange {
                index: 0,
                rate: dec!(9.5),
            })
        );
    }

    #[test]
    fn new_rejects_negative_rate() {
        let result = BracketTable::new(vec![TaxBracket::unbounded(dec!(0), dec!(-0.1))]);

        assert!(matches!(
            result,
            Err(ConfigurationError::RateOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn try_from_vec_validates() {
        let table: Result<BracketTable, _> = valid_rows().try_into();

        assert!(table.is_ok());
    }

    #[test]
    fn into_iterator_yields_rows_in_order() {
        let table = BracketTable::new(valid_rows()).unwrap();

        let starts: Vec<_> = (&table).into_iter().map(|b| b.range_start).collect();

        assert_eq!(starts, vec![dec!(0), dec!(10000), dec!(20000)]);
    }
}
