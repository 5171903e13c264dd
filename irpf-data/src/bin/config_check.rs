use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use irpf_core::TableSource;
use irpf_data::IrpfConfig;

/// Validate a withholding configuration file.
///
/// Every tax year, bracket table, rent deduction rule and average salary is
/// parsed and validated exactly as `irpf` would load it. Prints a summary of
/// what the file configures.
#[derive(Parser, Debug)]
#[command(name = "irpf-config-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Checking configuration: {}", args.file.display());

    let config = IrpfConfig::from_file(&args.file)
        .with_context(|| format!("Invalid configuration: {}", args.file.display()))?;

    for year in config.list_tax_years() {
        let tables = config
            .year(year)
            .with_context(|| format!("Tax year {year} not found"))?;
        println!(
            "{year}: state table with {} brackets, {} regions",
            tables.state.len(),
            tables.regions.len()
        );
        for region in tables.regions.values() {
            let rent = match region.rent_rule {
                Some(rule) => format!("rent deduction {} up to {}", rule.rate, rule.cap),
                None => "no rent deduction".to_string(),
            };
            println!(
                "  {}: {} brackets, {rent}",
                region.display_name,
                region.brackets.len()
            );
        }
    }

    println!("Configuration is valid.");

    Ok(())
}
