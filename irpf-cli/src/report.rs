//! Plain-text rendering of calculation results. Amounts are printed with two
//! decimals; nothing here feeds back into the calculations.

use std::fmt;

use irpf_core::calculations::common::round_half_up;
use irpf_core::calculations::{SalaryBreakdown, SalaryComparison, Standing};
use irpf_core::{BracketTable, RegionId};
use rust_decimal::Decimal;

use crate::app::Calculation;

const LABEL_WIDTH: usize = 28;
const VALUE_WIDTH: usize = 12;

fn money(value: Decimal) -> String {
    format!("{:.2}", round_half_up(value))
}

fn percent(value: Decimal) -> String {
    format!("{:.2} %", round_half_up(value))
}

fn line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: &str,
) -> fmt::Result {
    writeln!(f, "  {label:<LABEL_WIDTH$}{value:>VALUE_WIDTH$}")
}

/// Title of every section after the first, preceded by a blank line.
fn section(
    f: &mut fmt::Formatter<'_>,
    title: &str,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")
}

fn comparison_line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    comparison: &SalaryComparison,
) -> fmt::Result {
    let position = match comparison.standing {
        Standing::Above => "above",
        Standing::Below => "below",
        Standing::Equal => "equal to",
    };
    writeln!(
        f,
        "  {label:<LABEL_WIDTH$}{:>VALUE_WIDTH$}  ({} {position} the average)",
        money(comparison.average_salary),
        percent(comparison.difference_pct.abs()),
    )
}

fn breakdown_lines(
    f: &mut fmt::Formatter<'_>,
    breakdown: &SalaryBreakdown,
) -> fmt::Result {
    let parts = [
        ("Net salary", breakdown.net),
        ("Non-taxable income", breakdown.non_taxable),
        ("Social security", breakdown.social_security),
        ("Withholding", breakdown.withholding),
    ];
    for (label, value) in parts {
        writeln!(
            f,
            "  {label:<LABEL_WIDTH$}{:>VALUE_WIDTH$}  {:>8}",
            money(value),
            percent(breakdown.share_pct(value)),
        )?;
    }
    Ok(())
}

/// Full report for one calculation.
pub struct CalculationReport<'a>(pub &'a Calculation);

impl fmt::Display for CalculationReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let calculation = self.0;
        let result = &calculation.result;
        let outlook = &calculation.outlook;

        writeln!(
            f,
            "Withholding {} - {} ({})",
            calculation.year,
            calculation.region_name,
            calculation.contract.label()
        )?;

        section(f, "Gross salary")?;
        line(f, "Taxable", &money(result.taxable_gross))?;
        line(f, "Non-taxable", &money(result.non_taxable_gross))?;
        line(f, "Total", &money(result.total_gross))?;

        section(f, "Deductions")?;
        line(f, "Social security", &money(result.social_security))?;
        line(f, "Total deductions", &money(result.total_deductions))?;
        line(f, "Computable income", &money(result.computable_income))?;

        section(f, "Withholding")?;
        line(f, "State quota", &money(result.state.quota))?;
        line(f, "Regional quota", &money(result.regional.quota))?;
        line(f, "Rent deduction", &money(result.rent_deduction))?;
        line(f, "Total withholding", &money(result.total_withholding))?;
        line(f, "Withholding rate", &percent(result.withholding_rate))?;
        line(
            f,
            "Marginal rate",
            &percent(result.marginal_rate * Decimal::ONE_HUNDRED),
        )?;

        section(f, "Net salary")?;
        line(f, "Yearly", &money(result.yearly_net))?;
        line(f, "Monthly (12 payments)", &money(result.monthly_net))?;

        if outlook.state_comparison.is_some() || outlook.regional_comparison.is_some() {
            section(f, "Average salary")?;
            if let Some(comparison) = &outlook.state_comparison {
                comparison_line(f, "State", comparison)?;
            }
            if let Some(comparison) = &outlook.regional_comparison {
                comparison_line(f, &calculation.region_name, comparison)?;
            }
        }

        section(f, "Savings (monthly / yearly)")?;
        line(
            f,
            "Average saver",
            &format!(
                "{} / {}",
                money(outlook.savings.average_monthly),
                money(outlook.savings.average_yearly)
            ),
        )?;
        line(
            f,
            "Recommended",
            &format!(
                "{} / {}",
                money(outlook.savings.recommended_monthly),
                money(outlook.savings.recommended_yearly)
            ),
        )?;

        section(f, "Monthly rent")?;
        line(f, "Comfortable", &money(outlook.rent.comfortable_monthly))?;
        line(f, "Maximum", &money(outlook.rent.max_monthly))?;

        section(f, "Yearly breakdown")?;
        breakdown_lines(f, &outlook.yearly)?;
        if outlook.yearly.withholding_share_understated {
            writeln!(
                f,
                "  Withholding share is over total gross, which includes non-taxable income."
            )?;
        }

        Ok(())
    }
}

/// One region per line: slug and display name.
pub struct RegionList<'a> {
    pub year: i32,
    pub regions: &'a [(RegionId, String)],
}

impl fmt::Display for RegionList<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Regions configured for {}", self.year)?;
        for (id, name) in self.regions {
            writeln!(f, "  {:<LABEL_WIDTH$}{name}", id.as_str())?;
        }
        Ok(())
    }
}

/// Bracket table as `from  to  rate` rows. The unbounded top bracket has an
/// empty `to` column.
pub struct TableReport<'a> {
    pub title: &'a str,
    pub table: &'a BracketTable,
}

impl fmt::Display for TableReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "  {:>VALUE_WIDTH$}  {:>VALUE_WIDTH$}  {:>8}",
            "From", "To", "Rate"
        )?;
        for bracket in self.table {
            let end = bracket.range_end.map(money).unwrap_or_default();
            writeln!(
                f,
                "  {:>VALUE_WIDTH$}  {end:>VALUE_WIDTH$}  {:>8}",
                money(bracket.range_start),
                percent(bracket.rate * Decimal::ONE_HUNDRED),
            )?;
        }
        Ok(())
    }
}

pub fn render_calculation(calculation: &Calculation) -> String {
    CalculationReport(calculation).to_string()
}

pub fn render_regions(
    year: i32,
    regions: &[(RegionId, String)],
) -> String {
    RegionList { year, regions }.to_string()
}

pub fn render_table(
    title: &str,
    table: &BracketTable,
) -> String {
    TableReport { title, table }.to_string()
}
