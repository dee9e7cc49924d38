//! Classification rule table: which group may read which classification code.
//!
//! ```text
//! ┌──────────────┬──────────────────┐
//! │ code         │ required group   │
//! ├──────────────┼──────────────────┤
//! │ MCD_DEFAULT  │ ACA-HO           │
//! │ MCD_HOONLY   │ ACA-HO           │
//! │ MCD_HOFLD    │ ACA-FR           │
//! │ MCD_HOCLNT   │ ACA-CLNT         │
//! └──────────────┴──────────────────┘
//! ```
//!
//! The first two codes share a group. The query-side restriction for that
//! group therefore admits both codes.

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const CODE_DEFAULT: &str = "MCD_DEFAULT";
pub const CODE_HO_ONLY: &str = "MCD_HOONLY";
pub const CODE_HO_FIELD: &str = "MCD_HOFLD";
pub const CODE_HO_CLIENT: &str = "MCD_HOCLNT";

pub const GROUP_HO: &str = "ACA-HO";
pub const GROUP_FR: &str = "ACA-FR";
pub const GROUP_CLNT: &str = "ACA-CLNT";

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Classification attribute value this rule governs.
    pub code: String,
    /// Group whose members are granted access to documents with `code`.
    pub required_group: String,
}

impl ClassificationRule {
    pub fn new(code: impl Into<String>, required_group: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            required_group: required_group.into(),
        }
    }
}

/// Ordered, validated rule table. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRuleTable {
    rules: Vec<ClassificationRule>,
}

impl ClassificationRuleTable {
    /// Validate and build a table.
    ///
    /// Rejects an empty table, blank codes or groups, and duplicate codes.
    pub fn new(rules: Vec<ClassificationRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(PolicyError::invalid_rule_table("table has no rules"));
        }

        let mut seen = HashSet::new();
        for (index, rule) in rules.iter().enumerate() {
            if rule.code.trim().is_empty() {
                return Err(PolicyError::invalid_rule_table(format!(
                    "rule {} has an empty code",
                    index
                )));
            }
            if rule.required_group.trim().is_empty() {
                return Err(PolicyError::invalid_rule_table(format!(
                    "rule {} ({}) has an empty required group",
                    index, rule.code
                )));
            }
            if !seen.insert(rule.code.as_str()) {
                return Err(PolicyError::invalid_rule_table(format!(
                    "duplicate code {}",
                    rule.code
                )));
            }
        }

        Ok(Self { rules })
    }

    /// The four-rule table used in production.
    pub fn standard() -> Self {
        Self {
            rules: standard_rules(),
        }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule whose code equals `code` exactly.
    pub fn lookup(&self, code: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|rule| rule.code == code)
    }

    /// Distinct groups in order of first appearance. This is also the
    /// priority order used to pick an identity's governing group.
    pub fn governed_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !groups.contains(&rule.required_group.as_str()) {
                groups.push(&rule.required_group);
            }
        }
        groups
    }

    /// Codes bound to `group`, in table order.
    pub fn codes_for_group(&self, group: &str) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.required_group == group)
            .map(|rule| rule.code.as_str())
            .collect()
    }
}

impl Default for ClassificationRuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

pub(crate) fn standard_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(CODE_DEFAULT, GROUP_HO),
        ClassificationRule::new(CODE_HO_ONLY, GROUP_HO),
        ClassificationRule::new(CODE_HO_FIELD, GROUP_FR),
        ClassificationRule::new(CODE_HO_CLIENT, GROUP_CLNT),
    ]
}
