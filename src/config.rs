//! Policy configuration. Loaded once at startup.
//!
//! ```yaml
//! classification_field: "file_schema:auth_level_cde"
//! privileged_identities: [system, Administrator]
//! rules:
//!   - { code: MCD_DEFAULT, required_group: ACA-HO }
//!   - { code: MCD_HOONLY,  required_group: ACA-HO }
//!   - { code: MCD_HOFLD,   required_group: ACA-FR }
//!   - { code: MCD_HOCLNT,  required_group: ACA-CLNT }
//! ```
//!
//! Every key is optional; omitted keys take the values above.

use crate::error::{PolicyError, Result};
use crate::identity::PrivilegedIdentities;
use crate::rules::{standard_rules, ClassificationRule, ClassificationRuleTable};
use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::path::Path;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV_VAR: &str = "AUTHLEVEL_POLICY_CONFIG";

/// Schema-qualified property holding the classification code.
pub const DEFAULT_CLASSIFICATION_FIELD: &str = "file_schema:auth_level_cde";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_classification_field")]
    pub classification_field: String,
    #[serde(default)]
    pub privileged_identities: PrivilegedIdentities,
    #[serde(default = "standard_rules")]
    pub rules: Vec<ClassificationRule>,
}

fn default_classification_field() -> String {
    DEFAULT_CLASSIFICATION_FIELD.to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            classification_field: default_classification_field(),
            privileged_identities: PrivilegedIdentities::default(),
            rules: standard_rules(),
        }
    }
}

impl PolicyConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Load from the file named by [`CONFIG_ENV_VAR`], or defaults when the
    /// variable is unset or blank. A value that is not valid UTF-8 is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var(CONFIG_ENV_VAR))
    }

    fn from_env_value(value: std::result::Result<String, VarError>) -> Result<Self> {
        match value {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(target: "authlevel::config", path = %path, "loading policy config");
                Self::from_file(path)
            }
            Ok(_) | Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(PolicyError::invalid_config(format!(
                "{} is not valid UTF-8: {:?}",
                CONFIG_ENV_VAR, raw
            ))),
        }
    }

    pub fn with_classification_field(mut self, field: impl Into<String>) -> Self {
        self.classification_field = field.into();
        self
    }

    pub fn with_privileged_identities(mut self, privileged: PrivilegedIdentities) -> Self {
        self.privileged_identities = privileged;
        self
    }

    pub fn with_rules(mut self, rules: Vec<ClassificationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Validate the rules into a table.
    pub fn rule_table(&self) -> Result<ClassificationRuleTable> {
        ClassificationRuleTable::new(self.rules.clone())
    }
}
