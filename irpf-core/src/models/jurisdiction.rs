use std::fmt;

use serde::{Deserialize, Serialize};

/// Slug identifying an autonomous community, e.g. `comunidad-de-madrid`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RegionId(String);

impl RegionId {
    /// Builds the slug from either a display name (`"Comunidad de Madrid"`)
    /// or an existing slug. Lower-cases and joins words with `-`.
    pub fn new(name: &str) -> Self {
        let slug = name
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable name: every word capitalised, `-` replaced by spaces.
    pub fn display_name(&self) -> String {
        self.0
            .split('-')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<String> for RegionId {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<RegionId> for String {
    fn from(region: RegionId) -> Self {
        region.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tax authority owning a bracket table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    State,
    Region(RegionId),
}

impl Jurisdiction {
    /// Parses the keys used for per-jurisdiction settings: `state` or a region slug.
    pub fn from_key(key: &str) -> Self {
        if key.trim().eq_ignore_ascii_case("state") {
            Self::State
        } else {
            Self::Region(RegionId::new(key))
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::State => f.write_str("state"),
            Self::Region(region) => write!(f, "region {region}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_slugifies_display_name() {
        assert_eq!(RegionId::new("Comunidad de Madrid").as_str(), "comunidad-de-madrid");
    }

    #[test]
    fn new_keeps_existing_slug() {
        assert_eq!(RegionId::new("comunidad-de-madrid").as_str(), "comunidad-de-madrid");
    }

    #[test]
    fn new_collapses_extra_whitespace() {
        assert_eq!(RegionId::new("  Castilla   y León ").as_str(), "castilla-y-león");
    }

    #[test]
    fn display_name_capitalises_words() {
        assert_eq!(RegionId::new("comunidad-de-madrid").display_name(), "Comunidad De Madrid");
        assert_eq!(RegionId::new("cataluña").display_name(), "Cataluña");
    }

    #[test]
    fn from_key_recognises_state() {
        assert_eq!(Jurisdiction::from_key("state"), Jurisdiction::State);
        assert_eq!(Jurisdiction::from_key("STATE"), Jurisdiction::State);
        assert_eq!(
            Jurisdiction::from_key("cataluña"),
            Jurisdiction::Region(RegionId::new("cataluña"))
        );
    }

    #[test]
    fn jurisdiction_display() {
        assert_eq!(Jurisdiction::State.to_string(), "state");
        assert_eq!(
            Jurisdiction::Region(RegionId::new("Cataluña")).to_string(),
            "region cataluña"
        );
    }
}
