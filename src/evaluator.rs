//! Point decision: may this identity read this document?

use crate::decision::Decision;
use crate::identity::Identity;
use crate::rules::ClassificationRuleTable;
use query_filter::FieldSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A host document as seen by the policy: named field access plus a
/// reference used in audit logs.
pub trait ClassifiedDocument: FieldSource {
    fn reference(&self) -> &str;
}

/// Plain document record: an id and its string properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DocumentRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(field.into(), value.into());
        self
    }
}

impl FieldSource for DocumentRecord {
    fn field(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

impl ClassifiedDocument for DocumentRecord {
    fn reference(&self) -> &str {
        &self.id
    }
}

/// Maps a classification value and an identity to a [`Decision`].
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    table: Arc<ClassificationRuleTable>,
}

impl PolicyEvaluator {
    pub fn new(table: Arc<ClassificationRuleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ClassificationRuleTable {
        &self.table
    }

    /// Decide on a raw classification value.
    ///
    /// - absent value → `Unknown`
    /// - value with no rule → `Unknown`
    /// - matching rule → `Grant` if the identity is in the rule's group, else `Deny`
    pub fn evaluate(&self, classification: Option<&str>, identity: &dyn Identity) -> Decision {
        self.decide(classification, identity, None)
    }

    /// Decide on a document, reading its classification from `field`.
    pub fn evaluate_document(
        &self,
        document: &dyn ClassifiedDocument,
        field: &str,
        identity: &dyn Identity,
    ) -> Decision {
        self.decide(document.field(field), identity, Some(document.reference()))
    }

    fn decide(
        &self,
        classification: Option<&str>,
        identity: &dyn Identity,
        document: Option<&str>,
    ) -> Decision {
        let decision = match classification.and_then(|code| self.table.lookup(code)) {
            Some(rule) if identity.is_member_of(&rule.required_group) => Decision::Grant,
            Some(_) => Decision::Deny,
            None => Decision::Unknown,
        };

        tracing::trace!(
            target: "authlevel::decision",
            decision = %decision,
            identity = identity.name(),
            document = document.unwrap_or("-"),
            classification = classification.unwrap_or("-"),
            "returning access decision"
        );

        decision
    }
}
