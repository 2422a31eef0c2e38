//! Deployment settings read by the gates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_store::{ACCESS_MODE_KEY, PermissionStore, StoreResult, TERMS_TEXT_KEY};

/// Global access mode of the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Every sender passes.
    AllowAll,
    /// Registered senders only; commands go through the access decision.
    Strict,
    /// Maintenance: only holders of the admin role pass.
    Debug,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::AllowAll => "allow_all",
            AccessMode::Strict => "strict",
            AccessMode::Debug => "debug",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized access mode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAccessMode(pub String);

impl FromStr for AccessMode {
    type Err = UnknownAccessMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow_all" => Ok(AccessMode::AllowAll),
            "strict" => Ok(AccessMode::Strict),
            "debug" => Ok(AccessMode::Debug),
            other => Err(UnknownAccessMode(other.to_string())),
        }
    }
}

/// Settings fetched once per pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub access_mode: Option<String>,
    pub terms_text: Option<String>,
}

impl SettingsSnapshot {
    pub async fn fetch<S>(store: &S) -> StoreResult<Self>
    where
        S: PermissionStore + ?Sized,
    {
        Ok(Self {
            access_mode: store.get_setting(ACCESS_MODE_KEY).await?,
            terms_text: store.get_setting(TERMS_TEXT_KEY).await?,
        })
    }

    /// Terms text, treating an empty value as absent.
    pub fn terms_text(&self) -> Option<&str> {
        self.terms_text.as_deref().filter(|text| !text.is_empty())
    }
}
