//! Access decision returned by the point check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single access check.
///
/// `Unknown` means the policy declines to opine; the host combines it with
/// the decisions of other policies. It is not a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Grant,
    Deny,
    Unknown,
}

impl Decision {
    /// True for `Grant` and `Deny`.
    pub fn is_conclusive(&self) -> bool {
        !matches!(self, Decision::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Grant => "GRANT",
            Decision::Deny => "DENY",
            Decision::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conclusive() {
        assert!(Decision::Grant.is_conclusive());
        assert!(Decision::Deny.is_conclusive());
        assert!(!Decision::Unknown.is_conclusive());
    }

    #[test]
    fn test_serde_names_match_display() {
        for d in [Decision::Grant, Decision::Deny, Decision::Unknown] {
            let json = serde_json::to_string(&d).unwrap();
            assert_eq!(json, format!("\"{}\"", d));
        }
    }
}
