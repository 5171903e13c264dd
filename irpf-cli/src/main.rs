use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use irpf_core::{ContractType, RegionId, TableSource};
use irpf_data::{ParseDecimalError, parse_locale_decimal};
use rust_decimal::Decimal;
use tracing::debug;

use irpf_cli::app::{self, CalculationRequest};
use irpf_cli::{logging, report};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Spanish IRPF withholding calculator for salaried employees.
///
/// Loads the withholding tables from a TOML configuration (`--config`, the
/// IRPF_CONFIG variable, or the built-in tables) and derives net salary from
/// gross salary.
#[derive(Debug, Parser)]
#[command(name = "irpf", version, about)]
struct Cli {
    /// Configuration file with the withholding tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute withholding and net salary.
    Calculate(CalculateArgs),

    /// List the regions configured for a tax year.
    Regions {
        /// Tax year; defaults to the most recent one configured.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Print a bracket table.
    Tables {
        /// Tax year; defaults to the most recent one configured.
        #[arg(long)]
        year: Option<i32>,

        /// Region name or slug; prints the state table when omitted.
        #[arg(long)]
        region: Option<String>,
    },
}

#[derive(Debug, Args)]
struct CalculateArgs {
    /// Tax year; defaults to the most recent one configured.
    #[arg(long)]
    year: Option<i32>,

    /// Region name or slug, e.g. "Comunidad de Madrid".
    #[arg(long)]
    region: String,

    /// Yearly gross salary subject to withholding. Accepts `25000`,
    /// `25.000,00` or `25,000.00`.
    #[arg(long, value_parser = parse_amount)]
    gross: Decimal,

    /// Yearly exempt income such as meal or transport cards.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    non_taxable: Decimal,

    /// Contract kind: indefinite (indefinido) or temporary (temporal).
    #[arg(long, value_parser = parse_contract, default_value = "indefinite")]
    contract: ContractType,

    /// Monthly rent paid, for the regional rent deduction.
    #[arg(long, value_parser = parse_amount)]
    monthly_rent: Option<Decimal>,

    /// Ignore the regional rent deduction even when rent is given.
    #[arg(long)]
    no_rent_deduction: bool,
}

fn parse_contract(s: &str) -> Result<ContractType, String> {
    ContractType::parse(s)
        .ok_or_else(|| format!("unknown contract '{s}', expected indefinite or temporary"))
}

fn parse_amount(s: &str) -> Result<Decimal, ParseDecimalError> {
    parse_locale_decimal(s)
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = app::load_config(cli.config.as_deref())?;
    debug!(years = ?config.list_tax_years(), "configuration ready");

    let output = match cli.command {
        Command::Calculate(args) => {
            let request = CalculationRequest {
                year: args.year,
                region: args.region,
                taxable_gross: args.gross,
                non_taxable_gross: args.non_taxable,
                contract: args.contract,
                monthly_rent: args.monthly_rent,
                apply_rent_deduction: !args.no_rent_deduction,
            };
            let calculation = app::run_calculation(&config, &request)?;
            report::render_calculation(&calculation)
        }
        Command::Regions { year } => {
            let year = app::resolve_year(&config, year)?;
            let regions: Vec<(RegionId, String)> = config
                .list_regions(year)?
                .into_iter()
                .map(|region| {
                    let name = config.region_name(year, &region);
                    (region, name)
                })
                .collect();
            report::render_regions(year, &regions)
        }
        Command::Tables { year, region } => {
            let year = app::resolve_year(&config, year)?;
            let region = region.as_deref().map(RegionId::new);
            let table = app::lookup_table(&config, year, region.as_ref())?;
            let title = match &region {
                Some(region) => format!("{} {year}", config.region_name(year, region)),
                None => format!("State {year}"),
            };
            report::render_table(&title, table)
        }
    };

    print!("{output}");

    Ok(())
}
