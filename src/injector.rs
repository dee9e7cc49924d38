//! Listing-time enforcement: restrict a query so that documents the
//! requester may not read never reach the result set.
//!
//! For a governed identity the restriction is
//! `field IS NULL OR field IN (<codes of its group>)`, conjoined to the
//! right of any existing WHERE filter. Privileged and ungoverned identities
//! get the query back untouched.

use crate::identity::{Identity, PrivilegedIdentities};
use crate::rules::ClassificationRuleTable;
use query_filter::{Filter, Query};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct QueryPredicateInjector {
    table: Arc<ClassificationRuleTable>,
    field: String,
    privileged: PrivilegedIdentities,
}

impl QueryPredicateInjector {
    pub fn new(
        table: Arc<ClassificationRuleTable>,
        field: impl Into<String>,
        privileged: PrivilegedIdentities,
    ) -> Self {
        Self {
            table,
            field: field.into(),
            privileged,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn privileged(&self) -> &PrivilegedIdentities {
        &self.privileged
    }

    pub fn is_privileged(&self, name: &str) -> bool {
        self.privileged.contains(name)
    }

    /// First table group (in priority order) the identity belongs to.
    pub fn governing_group(&self, identity: &dyn Identity) -> Option<&str> {
        self.table
            .governed_groups()
            .into_iter()
            .find(|group| identity.is_member_of(group))
    }

    /// `field IS NULL OR field IN (codes)`, or `None` if no code maps to `group`.
    ///
    /// A single-code group uses `field = 'code'`.
    pub fn restriction_for_group(&self, group: &str) -> Option<Filter> {
        let codes = self.table.codes_for_group(group);
        let admitted = match codes.as_slice() {
            [] => return None,
            [code] => Filter::eq(self.field.as_str(), *code),
            _ => Filter::in_list(self.field.as_str(), codes.iter().copied()),
        };
        Some(Filter::is_null(self.field.as_str()).or(admitted))
    }

    /// Restriction that applies to `identity`, if any.
    pub fn restriction_for(&self, identity: &dyn Identity) -> Option<Filter> {
        if self.is_privileged(identity.name()) {
            return None;
        }
        self.governing_group(identity)
            .and_then(|group| self.restriction_for_group(group))
    }

    /// Compose the restriction for `identity` with `existing`.
    ///
    /// - privileged or ungoverned identity → `existing` unchanged
    /// - no existing filter → the restriction alone
    /// - otherwise → `existing AND restriction`
    ///
    /// A filter that already carries the same restriction as a top-level
    /// conjunct is returned unchanged, so the output is structurally
    /// `existing AND restriction` only when `existing` does not carry it yet.
    /// Both forms admit the same rows.
    pub fn inject(&self, identity: &dyn Identity, existing: Option<Filter>) -> Option<Filter> {
        if self.is_privileged(identity.name()) {
            tracing::debug!(
                target: "authlevel::query",
                identity = identity.name(),
                "privileged identity, query left unrestricted"
            );
            return existing;
        }

        let Some(group) = self.governing_group(identity) else {
            tracing::debug!(
                target: "authlevel::query",
                identity = identity.name(),
                "identity in no governed group, query left unrestricted"
            );
            return existing;
        };

        let Some(restriction) = self.restriction_for_group(group) else {
            return existing;
        };

        tracing::debug!(
            target: "authlevel::query",
            identity = identity.name(),
            group,
            restriction = %restriction,
            "restricting query"
        );

        match existing {
            None => Some(restriction),
            Some(filter) if filter.contains_conjunct(&restriction) => Some(filter),
            Some(filter) => Some(filter.and(restriction)),
        }
    }

    /// Rewrite a query's WHERE clause for `identity`. The input query is not modified.
    pub fn rewrite(&self, identity: &dyn Identity, query: &Query) -> Query {
        let where_clause = self.inject(identity, query.where_clause.clone());
        if where_clause == query.where_clause {
            return query.clone();
        }
        query.with_where(where_clause)
    }
}
