//! Contracts the host registers this policy against.
//!
//! ```text
//!                   ┌──────────────────────────┐
//! access check ───► │ SecurityPolicy           │ ──► Decision
//!                   │   check_permission()     │
//!                   ├──────────────────────────┤
//! query compile ──► │ QueryTransformer         │ ──► Query'
//!                   │   transform()            │
//!                   └──────────────────────────┘
//! ```

use crate::config::PolicyConfig;
use crate::decision::Decision;
use crate::error::{PolicyError, Result};
use crate::evaluator::{ClassifiedDocument, PolicyEvaluator};
use crate::identity::{Directory, Identity};
use crate::injector::QueryPredicateInjector;
use query_filter::Query;
use std::sync::Arc;

/// Arguments of one access check as supplied by the host.
///
/// `permission`, `resolved_permissions` and `additional_principals` are
/// carried for multi-policy hosts; the classification policy ignores them.
pub struct AccessCheck<'a> {
    pub document: &'a dyn ClassifiedDocument,
    pub identity: &'a dyn Identity,
    pub permission: &'a str,
    pub resolved_permissions: &'a [String],
    pub additional_principals: &'a [String],
}

impl<'a> AccessCheck<'a> {
    pub fn new(
        document: &'a dyn ClassifiedDocument,
        identity: &'a dyn Identity,
        permission: &'a str,
    ) -> Self {
        Self {
            document,
            identity,
            permission,
            resolved_permissions: &[],
            additional_principals: &[],
        }
    }
}

/// Rewrites a listing query for a requesting principal.
pub trait QueryTransformer: Send + Sync {
    fn transform(&self, principal_name: &str, query: &Query) -> Result<Query>;
}

/// A document-level security policy as seen by the host.
pub trait SecurityPolicy: Send + Sync {
    fn check_permission(&self, check: &AccessCheck<'_>) -> Decision;

    /// Whether the policy may deny `permission` in a way the host has to
    /// account for outside of query rewriting.
    fn is_restricting_permission(&self, permission: &str) -> bool;

    /// Whether the policy can be expressed as a query restriction for `repository`.
    fn is_expressible_in_query(&self, repository: &str) -> bool;

    fn query_transformer(&self, repository: &str) -> &dyn QueryTransformer;
}

/// Query transformer that resolves the principal through the directory
/// before restricting the query.
pub struct AuthLevelTransformer {
    injector: QueryPredicateInjector,
    directory: Arc<dyn Directory>,
}

impl AuthLevelTransformer {
    pub fn new(injector: QueryPredicateInjector, directory: Arc<dyn Directory>) -> Self {
        Self {
            injector,
            directory,
        }
    }

    pub fn injector(&self) -> &QueryPredicateInjector {
        &self.injector
    }
}

impl QueryTransformer for AuthLevelTransformer {
    fn transform(&self, principal_name: &str, query: &Query) -> Result<Query> {
        if self.injector.is_privileged(principal_name) {
            return Ok(query.clone());
        }

        // The incoming name carries no groups; the directory entry does.
        let principal = self.directory.resolve(principal_name).ok_or_else(|| {
            tracing::warn!(
                target: "authlevel::query",
                principal = principal_name,
                "principal not found in directory"
            );
            PolicyError::unresolved_identity(principal_name)
        })?;

        Ok(self.injector.rewrite(&principal, query))
    }
}

/// Classification-code policy: point decisions plus query restriction.
pub struct AuthLevelPolicy {
    evaluator: PolicyEvaluator,
    transformer: AuthLevelTransformer,
    field: String,
}

impl AuthLevelPolicy {
    /// Build from config, validating the rule table.
    pub fn from_config(config: &PolicyConfig, directory: Arc<dyn Directory>) -> Result<Self> {
        let table = Arc::new(config.rule_table()?);
        let injector = QueryPredicateInjector::new(
            Arc::clone(&table),
            config.classification_field.clone(),
            config.privileged_identities.clone(),
        );

        tracing::debug!(
            target: "authlevel::config",
            field = %config.classification_field,
            rules = table.len(),
            "classification policy ready"
        );

        Ok(Self {
            evaluator: PolicyEvaluator::new(table),
            transformer: AuthLevelTransformer::new(injector, directory),
            field: config.classification_field.clone(),
        })
    }

    pub fn evaluator(&self) -> &PolicyEvaluator {
        &self.evaluator
    }

    pub fn injector(&self) -> &QueryPredicateInjector {
        self.transformer.injector()
    }

    pub fn classification_field(&self) -> &str {
        &self.field
    }
}

impl SecurityPolicy for AuthLevelPolicy {
    fn check_permission(&self, check: &AccessCheck<'_>) -> Decision {
        self.evaluator
            .evaluate_document(check.document, &self.field, check.identity)
    }

    fn is_restricting_permission(&self, _permission: &str) -> bool {
        false
    }

    fn is_expressible_in_query(&self, _repository: &str) -> bool {
        true
    }

    fn query_transformer(&self, _repository: &str) -> &dyn QueryTransformer {
        &self.transformer
    }
}
