//! Column-list extraction for SQL-like management queries
//!
//! Only the text between `SELECT` and `FROM` is interpreted. Everything else
//! is the service's business.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, WmiqError};
use crate::parser::ast::*;

const SELECT_KEYWORD: &str = "select ";
const FROM_KEYWORD: &str = " from";

fn column_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r",[\t\n\x0C\r ]*").expect("column separator pattern is valid"))
}

/// Parse a query string, locating its column list.
///
/// Keywords are matched case-insensitively; column names keep their case.
pub fn parse_query(query: &str) -> Result<ParsedQuery> {
    // ASCII lowering keeps byte offsets aligned with the original string
    let lowered = query.to_ascii_lowercase();

    let start = lowered
        .find(SELECT_KEYWORD)
        .ok_or_else(|| WmiqError::MalformedQuery("missing select".to_string()))?
        + SELECT_KEYWORD.len();

    let end = lowered
        .find(FROM_KEYWORD)
        .ok_or_else(|| WmiqError::MalformedQuery("missing from".to_string()))?;

    if end < start {
        return Err(WmiqError::MalformedQuery(
            "from appears before the column list".to_string(),
        ));
    }

    let columns = column_separator()
        .split(&query[start..end])
        .map(str::to_string)
        .collect();

    Ok(ParsedQuery {
        text: query.to_string(),
        columns: ColumnList(columns),
    })
}

/// Parse a batch file: one query per non-empty line.
///
/// Lines starting with `--` or `#` are comments. Queries are not validated
/// here; see [`crate::script::validate_batch`].
pub fn parse_batch(input: &str) -> Batch {
    let statements = input
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with("--") || line.starts_with('#') {
                return None;
            }
            Some(BatchStatement {
                line: idx + 1,
                query: line.to_string(),
            })
        })
        .collect();

    Batch { statements }
}
