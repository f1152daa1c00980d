use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Role of a running container, derived from its `TaskOwner` label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ephemeral scrape worker owned by a request.
    Worker,
    /// Long-lived VPN egress container shared through leases.
    Proxy,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Proxy => "proxy",
        }
    }
}

impl FromStr for Role {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "worker" | "scraper" => Ok(Role::Worker),
            "proxy" => Ok(Role::Proxy),
            _ => Err(ModelError::InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
