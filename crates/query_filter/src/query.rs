//! Query envelope carrying an optional WHERE filter.

use crate::filter::Filter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A compiled listing query as handed to the policy layer by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub select: Vec<String>,
    pub from: Vec<String>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<Filter>,
    #[serde(default)]
    pub order_by: Vec<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl Query {
    /// `SELECT * FROM <from>` with no WHERE clause.
    pub fn select_all(from: impl Into<String>) -> Self {
        Self {
            select: vec!["*".to_string()],
            from: vec![from.into()],
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn filtered(mut self, filter: Filter) -> Self {
        self.where_clause = Some(filter);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Copy of this query with a new WHERE clause; every other clause is kept.
    pub fn with_where(&self, where_clause: Option<Filter>) -> Self {
        Self {
            where_clause,
            ..self.clone()
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.select.join(", "), self.from.join(", "))?;
        if let Some(filter) = &self.where_clause {
            write!(f, " WHERE {}", filter)?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", self.order_by.join(", "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full_query() {
        let q = Query::select_all("Document")
            .filtered(Filter::eq("ecm:primaryType", "File"))
            .order_by("dc:modified DESC")
            .limit(20)
            .offset(40);
        assert_eq!(
            q.to_string(),
            "SELECT * FROM Document WHERE ecm:primaryType = 'File' ORDER BY dc:modified DESC LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn test_with_where_preserves_other_clauses() {
        let q = Query::select_all("Document").order_by("dc:title").limit(5);
        let replaced = q.with_where(Some(Filter::is_null("x")));
        assert_eq!(replaced.select, q.select);
        assert_eq!(replaced.from, q.from);
        assert_eq!(replaced.order_by, q.order_by);
        assert_eq!(replaced.limit, Some(5));
        assert_eq!(replaced.where_clause, Some(Filter::is_null("x")));
        // Input query untouched
        assert!(q.where_clause.is_none());
    }

    #[test]
    fn test_query_json_uses_where_key() {
        let json = r#"{"select":["*"],"from":["Document"],"where":{"is_null":"x"}}"#;
        let q: Query = serde_json::from_str(json).unwrap();
        assert_eq!(q.where_clause, Some(Filter::is_null("x")));
        assert!(q.order_by.is_empty());
    }
}
