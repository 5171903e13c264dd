use serde::{Deserialize, Serialize};

/// Employment contract kind; selects the employee social security rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    #[default]
    Indefinite,
    Temporary,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indefinite => "indefinite",
            Self::Temporary => "temporary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "indefinite" | "indefinido" => Some(Self::Indefinite),
            "temporary" | "temporal" => Some(Self::Temporary),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Indefinite => "Indefinite contract",
            Self::Temporary => "Temporary contract",
        }
    }
}
