//! Parsed query and batch definitions

use serde::{Deserialize, Serialize};

/// Ordered property names requested by a query.
///
/// Order follows the `SELECT` clause. It drives which properties are read
/// off each item but not the key order of the resulting records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnList(pub Vec<String>);

impl ColumnList {
    /// `SELECT * FROM ...`: every property the item exposes.
    pub fn is_wildcard(&self) -> bool {
        self.0.len() == 1 && self.0[0] == "*"
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ColumnList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// A query whose column list has been located.
///
/// `text` is the original string, sent to the service untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub text: String,
    pub columns: ColumnList,
}

/// A batch of queries read from a `.wql` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub statements: Vec<BatchStatement>,
}

/// One query line of a batch file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatement {
    /// 1-based line number in the source file
    pub line: usize,
    pub query: String,
}
