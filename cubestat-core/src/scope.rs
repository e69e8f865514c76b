//! Geographic comparison breadth.

use serde::{Deserialize, Serialize};

/// How wide a comparison reaches: everyone, the subject's continent, or the
/// subject's country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    World,
    Continent,
    Region,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::World, Scope::Continent, Scope::Region];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Continent => "continent",
            Self::Region => "region",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string cannot be parsed into a `Scope`.
#[derive(Debug, Clone)]
pub struct ScopeParseError(pub String);

impl std::fmt::Display for ScopeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown scope: '{}' (expected world, continent or region)", self.0)
    }
}

impl std::error::Error for ScopeParseError {}

impl std::str::FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "world" | "w" | "wr" => Ok(Self::World),
            "continent" | "c" | "cr" => Ok(Self::Continent),
            "region" | "country" | "national" | "r" | "nr" => Ok(Self::Region),
            _ => Err(ScopeParseError(s.to_string())),
        }
    }
}
