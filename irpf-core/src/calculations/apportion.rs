//! Progressive-bracket apportionment.
//!
//! Walks a [`BracketTable`] from the lowest band upwards, filling each band
//! with as much of the taxable amount as it can hold and charging that slice
//! at the band's rate. The rate of the band where the amount runs out is the
//! marginal rate.
//!
//! # Example
//!
//! ```
//! use irpf_core::{BracketTable, TaxBracket, apportion};
//! use rust_decimal_macros::dec;
//!
//! let table = BracketTable::new(vec![
//!     TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
//!     TaxBracket::bounded(dec!(10000), dec!(20000), dec!(0.20)),
//!     TaxBracket::unbounded(dec!(20000), dec!(0.30)),
//! ])
//! .unwrap();
//!
//! let result = apportion(&table, dec!(15000));
//!
//! assert_eq!(result.retained_amount, dec!(2000));
//! assert_eq!(result.marginal_rate, dec!(0.20));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{BracketTable, TaxBracket};

/// Outcome of apportioning one amount across a table. Not rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxationResult {
    /// Tax retained across all bands.
    pub retained_amount: Decimal,

    /// Rate applied to the last euro of the amount; zero when the amount is
    /// zero or negative.
    pub marginal_rate: Decimal,

    /// Part of the amount above a bounded table's span. Always zero for a
    /// table whose top bracket is unbounded.
    pub unallocated: Decimal,
}

impl TaxationResult {
    pub const ZERO: Self = Self {
        retained_amount: Decimal::ZERO,
        marginal_rate: Decimal::ZERO,
        unallocated: Decimal::ZERO,
    };
}

/// Slice of the amount that fell into one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandShare {
    pub bracket: TaxBracket,
    pub taken: Decimal,
    pub retained: Decimal,
}

/// Stateless apportioner bound to one table.
#[derive(Debug, Clone, Copy)]
pub struct BracketApportioner<'a> {
    table: &'a BracketTable,
}

impl<'a> BracketApportioner<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a BracketTable {
        self.table
    }

    /// Apportions `taxable_amount` across the table.
    ///
    /// Zero or negative amounts (negative computable income is a normal
    /// outcome of deductions) return [`TaxationResult::ZERO`].
    pub fn apportion(
        &self,
        taxable_amount: Decimal,
    ) -> TaxationResult {
        self.walk(taxable_amount, |_| {})
    }

    /// Per-band detail of [`BracketApportioner::apportion`]. Only bands that
    /// received part of the amount are listed.
    pub fn breakdown(
        &self,
        taxable_amount: Decimal,
    ) -> Vec<BandShare> {
        let mut shares = Vec::with_capacity(self.table.len());
        self.walk(taxable_amount, |share| shares.push(share));
        shares
    }

    fn walk(
        &self,
        taxable_amount: Decimal,
        mut on_band: impl FnMut(BandShare),
    ) -> TaxationResult {
        if taxable_amount <= Decimal::ZERO {
            return TaxationResult::ZERO;
        }

        let mut remaining = taxable_amount;
        let mut retained = Decimal::ZERO;
        let mut marginal_rate = Decimal::ZERO;

        for bracket in self.table {
            let capacity = bracket.width().unwrap_or(remaining);
            let taken = remaining.min(capacity).max(Decimal::ZERO);
            let band_retained = taken * bracket.rate;

            retained += band_retained;
            remaining -= taken;
            marginal_rate = bracket.rate;

            on_band(BandShare {
                bracket: *bracket,
                taken,
                retained: band_retained,
            });

            if remaining.is_zero() {
                break;
            }
        }

        if !remaining.is_zero() {
            warn!(
                %taxable_amount,
                unallocated = %remaining,
                "amount exceeds the span of a bounded bracket table"
            );
        }

        TaxationResult {
            retained_amount: retained,
            marginal_rate,
            unallocated: remaining,
        }
    }
}

/// Apportions `taxable_amount` across `table`.
///
/// Shorthand for `BracketApportioner::new(table).apportion(taxable_amount)`.
pub fn apportion(
    table: &BracketTable,
    taxable_amount: Decimal,
) -> TaxationResult {
    BracketApportioner::new(table).apportion(taxable_amount)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn example_table() -> BracketTable {
        BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
            TaxBracket::bounded(dec!(10000), dec!(20000), dec!(0.20)),
            TaxBracket::unbounded(dec!(20000), dec!(0.30)),
        ])
        .unwrap()
    }

    fn bounded_table() -> BracketTable {
        BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(10000), dec!(0.10)),
            TaxBracket::bounded(dec!(10000), dec!(20000), dec!(0.20)),
        ])
        .unwrap()
    }

    /// State scale for 2021.
    fn state_table_2021() -> BracketTable {
        BracketTable::new(vec![
            TaxBracket::bounded(dec!(0), dec!(12450), dec!(0.095)),
            TaxBracket::bounded(dec!(12450), dec!(20200), dec!(0.12)),
            TaxBracket::bounded(dec!(20200), dec!(35200), dec!(0.15)),
            TaxBracket::bounded(dec!(35200), dec!(60000), dec!(0.185)),
            TaxBracket::bounded(dec!(60000), dec!(300000), dec!(0.225)),
            TaxBracket::unbounded(dec!(300000), dec!(0.245)),
        ])
        .unwrap()
    }

    // =========================================================================
    // apportion tests
    // =========================================================================

    #[test]
    fn apportion_inside_second_bracket() {
        let result = apportion(&example_table(), dec!(15000));

        // 10000 * 0.10 + 5000 * 0.20
        assert_eq!(result.retained_amount, dec!(2000));
        assert_eq!(result.marginal_rate, dec!(0.20));
        assert_eq!(result.unallocated, dec!(0));
    }

    #[test]
    fn apportion_into_unbounded_bracket() {
        let result = apportion(&example_table(), dec!(25000));

        // 1000 + 2000 + 5000 * 0.30
        assert_eq!(result.retained_amount, dec!(4500));
        assert_eq!(result.marginal_rate, dec!(0.30));
    }

    #[test]
    fn apportion_zero_amount_is_zero_result() {
        assert_eq!(apportion(&example_table(), dec!(0)), TaxationResult::ZERO);
    }

    #[test]
    fn apportion_negative_amount_is_zero_result() {
        assert_eq!(
            apportion(&example_table(), dec!(-1063.50)),
            TaxationResult::ZERO
        );
    }

    #[test]
    fn apportion_on_boundary_uses_lower_bracket_rate() {
        let result = apportion(&example_table(), dec!(10000));

        assert_eq!(result.retained_amount, dec!(1000));
        assert_eq!(result.marginal_rate, dec!(0.10));
    }

    #[test]
    fn apportion_just_above_boundary_uses_upper_bracket_rate() {
        let result = apportion(&example_table(), dec!(10000.01));

        assert_eq!(result.retained_amount, dec!(1000.002));
        assert_eq!(result.marginal_rate, dec!(0.20));
    }

    #[test]
    fn apportion_full_span_consumes_every_bracket() {
        let table = bounded_table();
        let apportioner = BracketApportioner::new(&table);

        let result = apportioner.apportion(dec!(20000));
        let shares = apportioner.breakdown(dec!(20000));

        assert_eq!(result.retained_amount, dec!(3000));
        assert_eq!(result.marginal_rate, dec!(0.20));
        assert_eq!(result.unallocated, dec!(0));
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].taken, dec!(10000));
        assert_eq!(shares[1].taken, dec!(10000));
    }

    #[test]
    fn apportion_beyond_bounded_span_reports_unallocated() {
        let result = apportion(&bounded_table(), dec!(25000));

        assert_eq!(result.retained_amount, dec!(3000));
        assert_eq!(result.marginal_rate, dec!(0.20));
        assert_eq!(result.unallocated, dec!(5000));
    }

    #[test]
    fn apportion_is_idempotent() {
        let table = state_table_2021();

        let first = apportion(&table, dec!(48123.45));
        let second = apportion(&table, dec!(48123.45));

        assert_eq!(first, second);
    }

    #[test]
    fn apportion_state_table_on_computable_income() {
        let result = apportion(&state_table_2021(), dec!(21412.50));

        // 12450 * 0.095 + 7750 * 0.12 + 1212.50 * 0.15
        assert_eq!(result.retained_amount, dec!(2294.625));
        assert_eq!(result.marginal_rate, dec!(0.15));
    }

    #[test]
    fn apportion_state_table_on_personal_minimum() {
        let result = apportion(&state_table_2021(), dec!(5550));

        assert_eq!(result.retained_amount, dec!(527.25));
        assert_eq!(result.marginal_rate, dec!(0.095));
    }

    #[test]
    fn apportion_very_large_amount_stays_in_top_bracket() {
        let result = apportion(&state_table_2021(), dec!(1000000));

        assert_eq!(result.marginal_rate, dec!(0.245));
        assert_eq!(result.unallocated, dec!(0));
    }

    // =========================================================================
    // breakdown tests
    // =========================================================================

    #[test]
    fn breakdown_lists_only_touched_bands() {
        let shares = BracketApportioner::new(&example_table()).breakdown(dec!(15000));

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].taken, dec!(10000));
        assert_eq!(shares[0].retained, dec!(1000));
        assert_eq!(shares[1].taken, dec!(5000));
        assert_eq!(shares[1].retained, dec!(1000));
    }

    #[test]
    fn breakdown_sums_to_retained_amount() {
        let table = state_table_2021();
        let apportioner = BracketApportioner::new(&table);

        for amount in [dec!(100), dec!(12450), dec!(33000.75), dec!(75000), dec!(450000)] {
            let shares = apportioner.breakdown(amount);
            let total: Decimal = shares.iter().map(|s| s.retained).sum();
            let taken: Decimal = shares.iter().map(|s| s.taken).sum();

            assert_eq!(total, apportioner.apportion(amount).retained_amount);
            assert_eq!(taken, amount);
        }
    }

    #[test]
    fn breakdown_of_zero_is_empty() {
        assert!(BracketApportioner::new(&example_table()).breakdown(dec!(0)).is_empty());
    }

    // =========================================================================
    // shape of the retained curve
    // =========================================================================

    #[test]
    fn retained_is_non_decreasing_and_convex() {
        let table = example_table();
        let amounts: Vec<Decimal> = (0..=80).map(|step| Decimal::from(step * 500)).collect();
        let retained: Vec<Decimal> = amounts
            .iter()
            .map(|amount| apportion(&table, *amount).retained_amount)
            .collect();

        let increments: Vec<Decimal> = retained.windows(2).map(|w| w[1] - w[0]).collect();

        assert!(increments.iter().all(|inc| *inc >= Decimal::ZERO));
        assert!(increments.windows(2).all(|w| w[1] >= w[0]));
    }
}
