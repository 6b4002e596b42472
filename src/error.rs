//! Error reporting for job input documents

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// A job document that is not valid JSON or not shaped like a job
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid job input at line {line}, column {column}: {message}")]
pub struct InputError {
    pub message: String,
    /// 1-based; 0 when the failure has no position
    pub line: usize,
    pub column: usize,
}

impl InputError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// Byte offset of the failure position in `source`
    pub fn offset(&self, source: &str) -> usize {
        if self.line == 0 {
            return 0;
        }
        let line_start: usize = source
            .split_inclusive('\n')
            .take(self.line - 1)
            .map(str::len)
            .sum();
        let line_len = source[line_start.min(source.len())..]
            .find('\n')
            .unwrap_or(source.len() - line_start.min(source.len()));
        (line_start + self.column.saturating_sub(1).min(line_len)).min(source.len())
    }

    /// Render a source-annotated report of this error
    pub fn format(&self, source: &str, filename: &str) -> String {
        let offset = self.offset(source);
        let end = (offset + 1).min(source.len()).max(offset);

        let mut output = Vec::new();
        let written = Report::build(ReportKind::Error, filename, offset)
            .with_message("invalid job input")
            .with_label(
                Label::new((filename, offset..end))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output);

        match written {
            Ok(()) => String::from_utf8_lossy(&output).into_owned(),
            Err(_) => format!("{}: {}", filename, self),
        }
    }
}

impl From<serde_json::Error> for InputError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        // serde_json appends " at line N column M"; the position is kept separately
        let message = match message.rfind(" at line ") {
            Some(idx) => message[..idx].to_string(),
            None => message,
        };
        Self::new(message, err.line(), err.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_serde_error() {
        let source = "{\n  \"config\": {,\n}";
        let err: InputError = serde_json::from_str::<serde_json::Value>(source)
            .unwrap_err()
            .into();
        assert_eq!(err.line, 2);
        assert!(!err.message.contains("at line"));
    }

    #[test]
    fn test_offset() {
        let source = "ab\ncdef\ng";
        assert_eq!(InputError::new("x", 2, 3).offset(source), 5);
        assert_eq!(InputError::new("x", 0, 0).offset(source), 0);
        assert_eq!(InputError::new("x", 9, 9).offset(source), source.len());
    }

    #[test]
    fn test_format_mentions_file() {
        let source = "{\"records\": }";
        let err = InputError::new("expected value", 1, 13);
        let report = err.format(source, "job.json");
        assert!(report.contains("job.json"));
        assert!(report.contains("expected value"));
    }
}
