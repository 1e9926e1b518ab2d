use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Paper,
    Live,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Paper => "paper",
            AccountType::Live => "live",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paper" => Ok(AccountType::Paper),
            "live" => Ok(AccountType::Live),
            other => Err(format!("unknown account type '{other}'")),
        }
    }
}

/// Persisted trading-account settings.
///
/// Broker API credentials are never part of this record; they live in a
/// separate secret store and only their presence is recorded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSettings {
    pub account_type: AccountType,
    pub paper_balance: f64,
    pub broker: String,
    pub server_url: String,
    #[serde(default)]
    pub has_credentials: bool,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            account_type: AccountType::Paper,
            paper_balance: 100_000.0,
            broker: String::new(),
            server_url: String::new(),
            has_credentials: false,
        }
    }
}

/// Broker API credentials. `Debug` never prints the secret material.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
