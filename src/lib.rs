//! Document-level access control keyed on a classification attribute.
//!
//! This crate provides:
//!
//! - **ClassificationRuleTable**: which group may read which classification code
//! - **PolicyEvaluator**: point decision (`Grant` / `Deny` / `Unknown`) for one document
//! - **QueryPredicateInjector**: listing-time restriction added to a query's WHERE clause
//! - **AuthLevelPolicy**: both of the above behind the host's [`SecurityPolicy`] contract
//!
//! # Architecture
//!
//! ```text
//! PolicyConfig (YAML/env) ──► ClassificationRuleTable (Arc, read-only)
//!                                       │
//!                        ┌──────────────┴──────────────┐
//!                        ▼                             ▼
//!                 PolicyEvaluator             QueryPredicateInjector
//!              (document, identity)          (identity, WHERE filter)
//!                        │                             │
//!                        ▼                             ▼
//!                    Decision              existing AND (f IS NULL OR f IN codes)
//! ```
//!
//! Both sides read the same table, so a row the injected filter admits is
//! never denied by the point check for the same identity.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use authlevel_policy::{ClassificationRuleTable, Decision, PolicyEvaluator, Principal};
//!
//! let evaluator = PolicyEvaluator::new(Arc::new(ClassificationRuleTable::standard()));
//! let field_rep = Principal::new("alice", ["ACA-FR"]);
//!
//! assert_eq!(evaluator.evaluate(Some("MCD_HOFLD"), &field_rep), Decision::Grant);
//! assert_eq!(evaluator.evaluate(Some("MCD_HOCLNT"), &field_rep), Decision::Deny);
//! assert_eq!(evaluator.evaluate(None, &field_rep), Decision::Unknown);
//! ```

mod config;
mod decision;
mod error;
mod evaluator;
mod hooks;
mod identity;
mod injector;
mod rules;

pub use config::{PolicyConfig, CONFIG_ENV_VAR, DEFAULT_CLASSIFICATION_FIELD};
pub use decision::Decision;
pub use error::{PolicyError, Result};
pub use evaluator::{ClassifiedDocument, DocumentRecord, PolicyEvaluator};
pub use hooks::{AccessCheck, AuthLevelPolicy, AuthLevelTransformer, QueryTransformer, SecurityPolicy};
pub use identity::{
    Directory, Identity, Principal, PrivilegedIdentities, StaticDirectory, ADMINISTRATOR_USERNAME,
    SYSTEM_USERNAME,
};
pub use injector::QueryPredicateInjector;
pub use rules::{
    ClassificationRule, ClassificationRuleTable, CODE_DEFAULT, CODE_HO_CLIENT, CODE_HO_FIELD,
    CODE_HO_ONLY, GROUP_CLNT, GROUP_FR, GROUP_HO,
};

pub use query_filter::{FieldSource, Filter, Query};
