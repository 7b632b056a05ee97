//! JSON output formatting

use serde_json::{json, Value};

use crate::engine::value::Record;
use crate::parser::ParsedQuery;

pub fn format_json(records: &[Record]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

pub fn format_json_explain(parsed: &ParsedQuery) -> String {
    let data: Value = json!({
        "query": parsed.text,
        "columns": parsed.columns.names(),
        "wildcard": parsed.columns.is_wildcard(),
    });
    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::value::Value as PropertyValue;
    use crate::parser::parse_query;

    #[test]
    fn test_records_as_array() {
        let mut r = Record::new();
        r.insert("Caption".to_string(), PropertyValue::from("C:"));
        r.insert("Size".to_string(), PropertyValue::Null);
        let parsed: Value = serde_json::from_str(&format_json(&[r])).unwrap();
        assert_eq!(parsed[0]["Caption"], "C:");
        assert!(parsed[0]["Size"].is_null());
    }

    #[test]
    fn test_explain() {
        let parsed = parse_query("SELECT a, b FROM T").unwrap();
        let out: Value = serde_json::from_str(&format_json_explain(&parsed)).unwrap();
        assert_eq!(out["columns"], json!(["a", "b"]));
        assert_eq!(out["wildcard"], false);
    }
}
