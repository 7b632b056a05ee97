//! Output formatting

use crate::engine::value::Record;
use crate::output::human::{format_human, format_human_explain};
use crate::output::json::{format_json, format_json_explain};
use crate::parser::{ColumnList, ParsedQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

pub fn format_output(columns: &ColumnList, records: &[Record], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(columns, records),
        OutputFormat::Json => format_json(records),
    }
}

pub fn format_explain(parsed: &ParsedQuery, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human_explain(parsed),
        OutputFormat::Json => format_json_explain(parsed),
    }
}

/// Column headers for display: query order, or every key seen (sorted) for
/// `SELECT *`.
pub fn display_columns(columns: &ColumnList, records: &[Record]) -> Vec<String> {
    if !columns.is_wildcard() {
        return columns.names().to_vec();
    }
    let mut names: Vec<String> = records.iter().flat_map(|r| r.keys().cloned()).collect();
    names.sort();
    names.dedup();
    names
}
