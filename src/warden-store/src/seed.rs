//! TOML seed format for reference data.
//!
//! ```toml
//! [settings]
//! access_mode = "strict"
//! terms_text = "Be nice."
//!
//! [[roles]]
//! name = "admin"
//! priority = 100
//!
//! [[users]]
//! external_id = 42
//! roles = ["admin"]
//! registered = true
//!
//! [[permissions]]
//! for_role = "admin"
//! allow_command = "all"
//! ```
//!
//! Permission rows keep the untyped store shape; they are validated into
//! [`PermissionRule`]s when the seed is applied.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use warden_policy::{PermissionRule, RawPermissionRow};

use crate::error::SeedError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRole {
    pub name: String,
    pub priority: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub external_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub registered: bool,
    #[serde(default)]
    pub terms_accepted: bool,
}

/// Reference data loaded into a store at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub settings: HashMap<String, String>,
    #[serde(default)]
    pub roles: Vec<SeedRole>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub permissions: Vec<RawPermissionRow>,
}

impl Seed {
    pub fn parse(content: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(content)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&content)
    }

    /// Validates every permission row.
    pub fn rules(&self) -> Result<Vec<PermissionRule>, SeedError> {
        self.permissions
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, row)| {
                PermissionRule::try_from(row).map_err(|source| SeedError::InvalidRule { index, source })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_policy::{RuleEffect, RuleError, RuleTarget, UserId};

    const SEED: &str = r#"
[settings]
access_mode = "strict"
terms_text = "Be nice."

[[roles]]
name = "admin"
priority = 100

[[roles]]
name = "student"
priority = 10

[[users]]
external_id = 42
username = "root"
roles = ["admin"]
registered = true

[[permissions]]
for_role = "admin"
allow_command = "all"

[[permissions]]
for_user = 1
deny_command = "ban"
allow_command = ""
"#;

    #[test]
    fn test_parse_seed() {
        let seed = Seed::parse(SEED).unwrap();
        assert_eq!(seed.roles.len(), 2);
        assert_eq!(seed.users[0].roles, vec!["admin".to_string()]);
        assert_eq!(seed.settings.get("access_mode").map(String::as_str), Some("strict"));

        let rules = seed.rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].target, RuleTarget::User(UserId(1)));
        assert!(matches!(rules[1].effect, RuleEffect::Deny(_)));
    }

    #[test]
    fn test_invalid_row_reports_index() {
        let seed = Seed::parse(
            r#"
[[permissions]]
for_role = "admin"
allow_command = "all"

[[permissions]]
for_role = "admin"
for_user = 3
allow_command = "start"
"#,
        )
        .unwrap();

        match seed.rules() {
            Err(SeedError::InvalidRule { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source, RuleError::AmbiguousTarget);
            }
            other => panic!("expected invalid rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(Seed::parse("[[roles]]\nname = 5"), Err(SeedError::Parse(_))));
    }
}
