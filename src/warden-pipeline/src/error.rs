//! Error types for the authorization pipeline.
//!
//! A [`ConfigurationFault`] means the deployment's reference data is
//! inconsistent. It is never shown to the sender; the pipeline halts.

use std::path::PathBuf;

use thiserror::Error;
use warden_policy::ExternalId;
use warden_store::StoreError;

/// Fatal fault raised by a pipeline stage.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationFault {
    /// The sender's user record was expected but could not be read back.
    #[error("user {external_id} disappeared during the {stage} stage")]
    UserVanished {
        external_id: ExternalId,
        stage: &'static str,
    },

    /// The terms text setting is absent or empty.
    #[error("terms text is not configured")]
    MissingTermsText,

    /// A required setting is absent.
    #[error("setting '{0}' is not configured")]
    MissingSetting(&'static str),

    /// The access mode setting holds a value outside the known modes.
    #[error("unknown access mode '{0}'")]
    UnknownAccessMode(String),

    /// Roles could not be read for a user in debug mode.
    #[error("roles of user {external_id} are unavailable")]
    RolesUnavailable { external_id: ExternalId },

    /// The backing store failed.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// A previous fault stopped the pipeline.
    #[error("pipeline halted after an earlier configuration fault")]
    Halted,
}

/// Errors while loading [`PipelineConfig`](crate::PipelineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display() {
        let fault = ConfigurationFault::UserVanished {
            external_id: ExternalId(7),
            stage: "terms",
        };
        assert_eq!(fault.to_string(), "user 7 disappeared during the terms stage");

        let fault = ConfigurationFault::UnknownAccessMode("open".to_string());
        assert_eq!(fault.to_string(), "unknown access mode 'open'");
    }

    #[test]
    fn test_store_error_conversion() {
        let fault: ConfigurationFault = StoreError::Unavailable("db down".to_string()).into();
        assert!(matches!(fault, ConfigurationFault::Store(_)));
        assert_eq!(fault.to_string(), "store failure: store unavailable: db down");
    }
}
