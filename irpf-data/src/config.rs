//! Tax tables and withholding parameters loaded from a TOML document.
//!
//! ```toml
//! [[years]]
//! year = 2021
//! work_expenses_deduction = "2000"
//! personal_minimum = "5550"
//!
//! [years.social_security]
//! indefinite = "0,0635"
//! temporary = "0,064"
//!
//! [[years.state]]
//! start = "0"
//! end = "12.450,00"
//! rate = "0,095"
//!
//! [[years.regions]]
//! name = "Comunidad de Madrid"
//! rent_deduction = { rate = "0,30", cap = "1000" }
//!
//! [[years.regions.brackets]]
//! start = "0"
//! rate = "0,09"
//!
//! [average_salaries]
//! state = "24.395,98"
//! ```
//!
//! Numbers may be written as TOML numbers or as strings in either locale. A
//! bracket without `end` (or with an empty one) is the unbounded top bracket.
//! Every table and parameter set is validated while loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use irpf_core::calculations::{OutlookConfig, OutlookError, WithholdingError};
use irpf_core::{
    BracketTable, ConfigurationError, Jurisdiction, RegionId, RentDeductionRule, SourceError,
    TableSource, TaxBracket, WithholdingParams,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::decimal::{ParseDecimalError, RawDecimal};

const BUILTIN_CONFIG: &str = include_str!("../config/irpf.toml");

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("missing amount for {field}")]
    MissingAmount { field: String },

    #[error("invalid amount for {field}: {source}")]
    InvalidAmount {
        field: String,
        #[source]
        source: ParseDecimalError,
    },

    #[error("invalid {jurisdiction} table for {year}: {source}")]
    InvalidTable {
        year: i32,
        jurisdiction: Jurisdiction,
        #[source]
        source: ConfigurationError,
    },

    #[error("invalid withholding parameters for {year}: {source}")]
    InvalidParams {
        year: i32,
        #[source]
        source: WithholdingError,
    },

    #[error("invalid rent deduction for region '{region}' in {year}: {source}")]
    InvalidRentRule {
        year: i32,
        region: RegionId,
        #[source]
        source: WithholdingError,
    },

    #[error("invalid outlook settings: {0}")]
    InvalidOutlook(#[from] OutlookError),

    #[error("tax year {0} is configured more than once")]
    DuplicateTaxYear(i32),

    #[error("region '{region}' is configured more than once for {year}")]
    DuplicateRegion { year: i32, region: RegionId },
}

// Raw TOML shapes. Amounts stay as `RawDecimal` until validated.

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    years: Vec<RawYear>,
    #[serde(default)]
    average_salaries: BTreeMap<String, RawDecimal>,
    #[serde(default)]
    outlook: RawOutlook,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawYear {
    year: i32,
    work_expenses_deduction: RawDecimal,
    personal_minimum: RawDecimal,
    social_security: RawSocialSecurity,
    state: Vec<RawBracket>,
    #[serde(default)]
    regions: Vec<RawRegion>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSocialSecurity {
    indefinite: RawDecimal,
    temporary: RawDecimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBracket {
    start: RawDecimal,
    #[serde(default)]
    end: Option<RawDecimal>,
    rate: RawDecimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegion {
    name: String,
    #[serde(default)]
    rent_deduction: Option<RawRentRule>,
    brackets: Vec<RawBracket>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRentRule {
    rate: RawDecimal,
    cap: RawDecimal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutlook {
    average_savings_rate: Option<RawDecimal>,
    recommended_savings_rate: Option<RawDecimal>,
    comfortable_rent_share: Option<RawDecimal>,
    max_rent_share: Option<RawDecimal>,
}

/// Validated tables of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTables {
    /// Name as written in the configuration, e.g. `Comunidad de Madrid`.
    pub display_name: String,
    pub brackets: BracketTable,
    pub rent_rule: Option<RentDeductionRule>,
}

/// Everything configured for one tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearTables {
    pub params: WithholdingParams,
    pub state: BracketTable,
    pub regions: BTreeMap<RegionId, RegionTables>,
}

/// Loaded configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrpfConfig {
    years: BTreeMap<i32, YearTables>,
    average_salaries: BTreeMap<Jurisdiction, Decimal>,
    outlook: OutlookConfig,
}

impl IrpfConfig {
    /// Configuration shipped with the crate (2021 tables).
    pub fn builtin() -> Result<Self, ConfigLoadError> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigLoadError> {
        let raw: RawConfig = toml::from_str(s)?;

        let mut years = BTreeMap::new();
        for raw_year in raw.years {
            let year = raw_year.year;
            let tables = build_year(raw_year)?;
            if years.insert(year, tables).is_some() {
                return Err(ConfigLoadError::DuplicateTaxYear(year));
            }
        }

        let mut average_salaries = BTreeMap::new();
        for (key, value) in &raw.average_salaries {
            let salary = amount(value, || format!("average_salaries.{key}"))?;
            average_salaries.insert(Jurisdiction::from_key(key), salary);
        }

        let outlook = build_outlook(&raw.outlook)?;
        outlook.validate()?;

        info!(
            years = years.len(),
            averages = average_salaries.len(),
            "configuration loaded"
        );

        Ok(Self {
            years,
            average_salaries,
            outlook,
        })
    }

    pub fn year(
        &self,
        year: i32,
    ) -> Result<&YearTables, SourceError> {
        self.years.get(&year).ok_or(SourceError::TaxYearNotFound(year))
    }

    pub fn region(
        &self,
        year: i32,
        region: &RegionId,
    ) -> Result<&RegionTables, SourceError> {
        self.year(year)?
            .regions
            .get(region)
            .ok_or_else(|| SourceError::RegionNotFound {
                year,
                region: region.clone(),
            })
    }
}

impl TableSource for IrpfConfig {
    fn list_tax_years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    fn list_regions(
        &self,
        year: i32,
    ) -> Result<Vec<RegionId>, SourceError> {
        Ok(self.year(year)?.regions.keys().cloned().collect())
    }

    fn state_table(
        &self,
        year: i32,
    ) -> Result<&BracketTable, SourceError> {
        Ok(&self.year(year)?.state)
    }

    fn regional_table(
        &self,
        year: i32,
        region: &RegionId,
    ) -> Result<&BracketTable, SourceError> {
        Ok(&self.region(year, region)?.brackets)
    }

    fn params(
        &self,
        year: i32,
    ) -> Result<&WithholdingParams, SourceError> {
        Ok(&self.year(year)?.params)
    }

    fn rent_rule(
        &self,
        year: i32,
        region: &RegionId,
    ) -> Result<Option<&RentDeductionRule>, SourceError> {
        Ok(self.region(year, region)?.rent_rule.as_ref())
    }

    fn average_salary(
        &self,
        jurisdiction: &Jurisdiction,
    ) -> Option<Decimal> {
        self.average_salaries.get(jurisdiction).copied()
    }

    fn region_name(
        &self,
        year: i32,
        region: &RegionId,
    ) -> String {
        self.region(year, region)
            .map(|tables| tables.display_name.clone())
            .unwrap_or_else(|_| region.display_name())
    }

    fn outlook_config(&self) -> OutlookConfig {
        self.outlook.clone()
    }
}

/// Required amount. A blank string is rejected; only a bracket `end` may be
/// left blank.
fn amount(
    raw: &RawDecimal,
    field: impl FnOnce() -> String,
) -> Result<Decimal, ConfigLoadError> {
    if raw.is_blank() {
        return Err(ConfigLoadError::MissingAmount { field: field() });
    }
    raw.to_decimal().map_err(|source| ConfigLoadError::InvalidAmount {
        field: field(),
        source,
    })
}

fn build_year(raw: RawYear) -> Result<YearTables, ConfigLoadError> {
    let year = raw.year;

    let params = WithholdingParams {
        tax_year: year,
        work_expenses_deduction: amount(&raw.work_expenses_deduction, || {
            format!("{year}.work_expenses_deduction")
        })?,
        personal_minimum: amount(&raw.personal_minimum, || format!("{year}.personal_minimum"))?,
        indefinite_ss_rate: amount(&raw.social_security.indefinite, || {
            format!("{year}.social_security.indefinite")
        })?,
        temporary_ss_rate: amount(&raw.social_security.temporary, || {
            format!("{year}.social_security.temporary")
        })?,
    };
    params
        .validate()
        .map_err(|source| ConfigLoadError::InvalidParams { year, source })?;

    let state = build_table(year, Jurisdiction::State, &raw.state)?;

    let mut regions = BTreeMap::new();
    for raw_region in raw.regions {
        let region = RegionId::new(&raw_region.name);
        let brackets = build_table(year, Jurisdiction::Region(region.clone()), &raw_region.brackets)?;

        let rent_rule = match &raw_region.rent_deduction {
            Some(rule) => Some(build_rent_rule(year, &region, rule)?),
            None => None,
        };

        let tables = RegionTables {
            display_name: raw_region.name.trim().to_string(),
            brackets,
            rent_rule,
        };
        if regions.insert(region.clone(), tables).is_some() {
            return Err(ConfigLoadError::DuplicateRegion { year, region });
        }
    }

    debug!(year, regions = regions.len(), "tax year loaded");

    Ok(YearTables {
        params,
        state,
        regions,
    })
}

fn build_table(
    year: i32,
    jurisdiction: Jurisdiction,
    rows: &[RawBracket],
) -> Result<BracketTable, ConfigLoadError> {
    let mut brackets = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let field = |name: &str| format!("{year}.{jurisdiction}[{index}].{name}");

        let range_start = amount(&row.start, || field("start"))?;
        let range_end = match &row.end {
            Some(end) if !end.is_blank() => Some(amount(end, || field("end"))?),
            _ => None,
        };
        let rate = amount(&row.rate, || field("rate"))?;

        brackets.push(TaxBracket {
            range_start,
            range_end,
            rate,
        });
    }

    BracketTable::new(brackets).map_err(|source| ConfigLoadError::InvalidTable {
        year,
        jurisdiction,
        source,
    })
}

fn build_rent_rule(
    year: i32,
    region: &RegionId,
    raw: &RawRentRule,
) -> Result<RentDeductionRule, ConfigLoadError> {
    let rule = RentDeductionRule {
        rate: amount(&raw.rate, || format!("{year}.{region}.rent_deduction.rate"))?,
        cap: amount(&raw.cap, || format!("{year}.{region}.rent_deduction.cap"))?,
    };
    rule.validate()
        .map_err(|source| ConfigLoadError::InvalidRentRule {
            year,
            region: region.clone(),
            source,
        })?;
    Ok(rule)
}

fn build_outlook(raw: &RawOutlook) -> Result<OutlookConfig, ConfigLoadError> {
    let defaults = OutlookConfig::default();
    let pick = |value: &Option<RawDecimal>, fallback: Decimal, name: &str| match value {
        Some(value) => amount(value, || format!("outlook.{name}")),
        None => Ok(fallback),
    };

    Ok(OutlookConfig {
        average_savings_rate: pick(
            &raw.average_savings_rate,
            defaults.average_savings_rate,
            "average_savings_rate",
        )?,
        recommended_savings_rate: pick(
            &raw.recommended_savings_rate,
            defaults.recommended_savings_rate,
            "recommended_savings_rate",
        )?,
        comfortable_rent_share: pick(
            &raw.comfortable_rent_share,
            defaults.comfortable_rent_share,
            "comfortable_rent_share",
        )?,
        max_rent_share: pick(&raw.max_rent_share, defaults.max_rent_share, "max_rent_share")?,
    })
}
