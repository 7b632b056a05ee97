//! Batch validation
//!
//! Every line of a batch is checked before the first query runs.

use crate::parser::{parse_query, Batch};

/// A problem found in one batch line
#[derive(Debug, Clone)]
pub struct BatchValidationError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for BatchValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Validate every statement of a batch.
pub fn validate_batch(batch: &Batch) -> Vec<BatchValidationError> {
    let mut errors: Vec<BatchValidationError> = batch
        .statements
        .iter()
        .filter_map(|stmt| {
            parse_query(&stmt.query).err().map(|e| BatchValidationError {
                line: stmt.line,
                message: e.to_string(),
            })
        })
        .collect();

    if batch.statements.is_empty() {
        errors.push(BatchValidationError {
            line: 0,
            message: "batch contains no queries".to_string(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_batch;

    #[test]
    fn test_valid_batch() {
        let batch = parse_batch("SELECT Name FROM Win32_Process\nSELECT Caption FROM Win32_OperatingSystem");
        assert!(validate_batch(&batch).is_empty());
    }

    #[test]
    fn test_reports_line_numbers() {
        let batch = parse_batch("SELECT Name FROM Win32_Process\n\nSELECT Caption\nFROM X");
        let errors = validate_batch(&batch);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 3);
        assert!(errors[0].to_string().contains("missing from"));
        assert_eq!(errors[1].line, 4);
    }

    #[test]
    fn test_empty_batch() {
        let errors = validate_batch(&parse_batch("-- nothing here\n"));
        assert_eq!(errors.len(), 1);
    }
}
