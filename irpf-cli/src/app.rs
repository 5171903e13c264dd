use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use irpf_core::calculations::{SalaryOutlook, WithholdingInput, WithholdingResult, WithholdingWorksheet};
use irpf_core::{BracketTable, ContractType, Jurisdiction, RegionId, TableSource};
use irpf_data::IrpfConfig;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Environment variable naming a configuration file when `--config` is absent.
pub const CONFIG_ENV: &str = "IRPF_CONFIG";

/// Loads `path`, falling back to `IRPF_CONFIG` and then to the built-in
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<IrpfConfig> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);

    match path.map(Path::to_path_buf).or(from_env) {
        Some(path) => IrpfConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => {
            debug!("using built-in configuration");
            IrpfConfig::builtin().context("Built-in configuration is invalid")
        }
    }
}

/// Uses `requested` if given, else the most recent configured year.
pub fn resolve_year(
    source: &dyn TableSource,
    requested: Option<i32>,
) -> Result<i32> {
    match requested {
        Some(year) => Ok(year),
        None => match source.latest_tax_year() {
            Some(year) => Ok(year),
            None => bail!("No tax years are configured"),
        },
    }
}

/// Inputs of one withholding calculation, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRequest {
    pub year: Option<i32>,
    pub region: String,
    pub taxable_gross: Decimal,
    pub non_taxable_gross: Decimal,
    pub contract: ContractType,
    pub monthly_rent: Option<Decimal>,
    pub apply_rent_deduction: bool,
}

impl CalculationRequest {
    pub fn new(
        region: &str,
        taxable_gross: Decimal,
    ) -> Self {
        Self {
            year: None,
            region: region.to_string(),
            taxable_gross,
            non_taxable_gross: Decimal::ZERO,
            contract: ContractType::default(),
            monthly_rent: None,
            apply_rent_deduction: true,
        }
    }
}

/// A finished calculation with everything the report prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    pub year: i32,
    pub region: RegionId,
    pub region_name: String,
    pub contract: ContractType,
    pub result: WithholdingResult,
    pub outlook: SalaryOutlook,
}

pub fn run_calculation(
    source: &dyn TableSource,
    request: &CalculationRequest,
) -> Result<Calculation> {
    let year = resolve_year(source, request.year)?;
    let region = RegionId::new(&request.region);

    let params = source.params(year)?;
    let state_table = source.state_table(year)?;
    let regional_table = source.regional_table(year, &region)?;
    let rent_deduction = rent_deduction(source, year, &region, request)?;

    let input = WithholdingInput {
        taxable_gross: request.taxable_gross,
        non_taxable_gross: request.non_taxable_gross,
        contract: request.contract,
        rent_deduction,
    };
    let result = WithholdingWorksheet::new(state_table, regional_table, params)
        .calculate(&input)
        .context("Withholding calculation failed")?;

    let outlook = SalaryOutlook::build(
        &result,
        &source.outlook_config(),
        source.average_salary(&Jurisdiction::State),
        source.average_salary(&Jurisdiction::Region(region.clone())),
    )
    .context("Salary outlook failed")?;

    info!(
        year,
        region = %region,
        total_withholding = %result.total_withholding,
        "calculation complete"
    );

    Ok(Calculation {
        year,
        region_name: source.region_name(year, &region),
        region,
        contract: request.contract,
        result,
        outlook,
    })
}

fn rent_deduction(
    source: &dyn TableSource,
    year: i32,
    region: &RegionId,
    request: &CalculationRequest,
) -> Result<Decimal> {
    let Some(monthly_rent) = request.monthly_rent else {
        return Ok(Decimal::ZERO);
    };
    if !request.apply_rent_deduction {
        debug!("rent deduction disabled");
        return Ok(Decimal::ZERO);
    }

    match source.rent_rule(year, region)? {
        Some(rule) => Ok(rule.deduction(monthly_rent)?),
        None => {
            info!(region = %region, "region has no rent deduction");
            Ok(Decimal::ZERO)
        }
    }
}

/// Table for `region`, or the state table when `region` is `None`.
pub fn lookup_table<'a>(
    source: &'a dyn TableSource,
    year: i32,
    region: Option<&RegionId>,
) -> Result<&'a BracketTable> {
    let table = match region {
        Some(region) => source.regional_table(year, region)?,
        None => source.state_table(year)?,
    };
    Ok(table)
}
