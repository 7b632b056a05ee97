//! Human-readable output formatting

use crate::engine::value::{Record, Value};
use crate::output::formatter::display_columns;
use crate::parser::{ColumnList, ParsedQuery};

const MAX_CELL_WIDTH: usize = 40;

pub fn format_human(columns: &ColumnList, records: &[Record]) -> String {
    if records.is_empty() {
        return "No records".to_string();
    }

    let headers = display_columns(columns, records);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|name| truncate(&record.get(name).unwrap_or(&Value::Null).to_string(), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    output.push_str(&format_row(&headers, &widths));
    output.push('\n');
    output.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    output.push('\n');
    for row in &rows {
        output.push_str(&format_row(row, &widths));
        output.push('\n');
    }
    output.push_str(&format!(
        "\n({} record{})",
        records.len(),
        if records.len() == 1 { "" } else { "s" }
    ));
    output
}

pub fn format_human_explain(parsed: &ParsedQuery) -> String {
    let mut output = format!("Query:   {}\nColumns:", parsed.text);
    if parsed.columns.is_wildcard() {
        output.push_str(" * (every property of each item)");
    } else {
        for (i, column) in parsed.columns.names().iter().enumerate() {
            output.push_str(&format!("\n  {}. {}", i + 1, column));
        }
    }
    output
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_query;

    fn record(name: &str, pid: u32) -> Record {
        let mut r = Record::new();
        r.insert("Name".to_string(), Value::from(name));
        r.insert("ProcessId".to_string(), Value::from(pid));
        r
    }

    #[test]
    fn test_table_follows_query_column_order() {
        let parsed = parse_query("SELECT ProcessId, Name FROM Win32_Process").unwrap();
        let out = format_human(&parsed.columns, &[record("System", 4), record("smss.exe", 388)]);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("ProcessId  Name"));
        assert!(lines.next().unwrap().starts_with("---"));
        assert_eq!(lines.next(), Some("4          System"));
        assert!(out.ends_with("(2 records)"));
    }

    #[test]
    fn test_empty() {
        let parsed = parse_query("SELECT Name FROM Win32_Process").unwrap();
        assert_eq!(format_human(&parsed.columns, &[]), "No records");
    }

    #[test]
    fn test_missing_value_shows_null() {
        let parsed = parse_query("SELECT Name, Path FROM X").unwrap();
        let out = format_human(&parsed.columns, &[record("a", 1)]);
        assert!(out.contains("NULL"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long command line", 10), "a very ...");
    }

    #[test]
    fn test_explain_lists_columns() {
        let parsed = parse_query("SELECT Name, ProcessId FROM Win32_Process").unwrap();
        let out = format_human_explain(&parsed);
        assert!(out.contains("1. Name"));
        assert!(out.contains("2. ProcessId"));
    }
}
