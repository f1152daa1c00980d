use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Kind of page a worker scrapes.
///
/// Each variant maps to its own pair of environment variables (`<TYPE>_URL`, `<TYPE>_NAME`)
/// and to the `SCRAPE_MODE` value understood by the worker image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetType {
    Hotel,
    Resto,
    Airline,
}

impl TargetType {
    /// Value of `SCRAPE_MODE` for this target.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TargetType::Hotel => "HOTEL",
            TargetType::Resto => "RESTO",
            TargetType::Airline => "AIRLINE",
        }
    }

    /// Environment variable carrying the target URL.
    pub const fn url_var(&self) -> &'static str {
        match self {
            TargetType::Hotel => "HOTEL_URL",
            TargetType::Resto => "RESTO_URL",
            TargetType::Airline => "AIRLINE_URL",
        }
    }

    /// Environment variable carrying the target display name.
    pub const fn name_var(&self) -> &'static str {
        match self {
            TargetType::Hotel => "HOTEL_NAME",
            TargetType::Resto => "RESTO_NAME",
            TargetType::Airline => "AIRLINE_NAME",
        }
    }
}

impl FromStr for TargetType {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HOTEL" => Ok(TargetType::Hotel),
            "RESTO" => Ok(TargetType::Resto),
            "AIRLINE" => Ok(TargetType::Airline),
            _ => Err(ModelError::InvalidTargetType(s.to_string())),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
