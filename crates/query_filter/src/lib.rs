//! Query model shared between the access-control layer and the query executor.
//!
//! - [`Filter`]: binary boolean predicate tree for a WHERE clause
//! - [`Query`]: the query envelope whose WHERE clause policies rewrite
//! - [`FieldSource`]: row capability used to evaluate a filter in memory
//!
//! Filters are values. Composition (`and`, `or`, `not`) builds new nodes
//! around its operands and never edits an existing tree, so a filter handed
//! to one policy can still be inspected unchanged by the next.

mod filter;
mod query;

pub use filter::{FieldSource, Filter};
pub use query::Query;
