//! Query construction from a class name, columns and equality filters

use serde::{Deserialize, Serialize};

use crate::error::{Result, WmiqError};

/// Right-hand side of a `WHERE` equality filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Bool(bool),
    Number(i64),
    Str(String),
}

impl FilterValue {
    /// Interpret CLI text: `true`/`false`, integers, otherwise a string.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" | "TRUE" | "True" => FilterValue::Bool(true),
            "false" | "FALSE" | "False" => FilterValue::Bool(false),
            _ => raw
                .parse::<i64>()
                .map(FilterValue::Number)
                .unwrap_or_else(|_| FilterValue::Str(raw.to_string())),
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        }
    }
}

/// Build `SELECT <columns> FROM <class> [WHERE k = v AND ...]`.
///
/// An empty column slice selects `*`. Filters are written in the given order.
pub fn build_query(class: &str, columns: &[String], filters: &[(String, FilterValue)]) -> Result<String> {
    if class.is_empty() || class.contains(char::is_whitespace) {
        return Err(WmiqError::InvalidArgument(format!(
            "class name must be a single word: '{}'",
            class
        )));
    }
    if let Some(bad) = columns.iter().find(|c| c.is_empty() || c.contains(',')) {
        return Err(WmiqError::InvalidArgument(format!("invalid column name: '{}'", bad)));
    }

    let column_list = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    };

    let mut query = format!("SELECT {} FROM {}", column_list, class);

    if !filters.is_empty() {
        let conditions: Vec<String> = filters
            .iter()
            .map(|(key, value)| format!("{} = {}", key, value))
            .collect();
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    Ok(query)
}

/// Parse a `KEY=VALUE` filter argument.
pub fn parse_filter(arg: &str) -> Result<(String, FilterValue)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), FilterValue::infer(value.trim())))
        }
        _ => Err(WmiqError::InvalidArgument(format!(
            "filter must have the form KEY=VALUE: '{}'",
            arg
        ))),
    }
}
