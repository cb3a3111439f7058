//! Error types for parsing and validation.

use std::fmt;

use thiserror::Error;

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

/// Source range with inclusive start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    pub(crate) fn from_span(span: pest::Span<'_>) -> Self {
        let (start_line, start_col) = span.start_pos().line_col();
        let (end_line, end_col) = span.end_pos().line_col();
        Self {
            start: SourcePosition {
                line: start_line as u32,
                column: start_col as u32,
            },
            end: SourcePosition {
                line: end_line as u32,
                column: end_col as u32,
            },
        }
    }
}

/// Semantic validation diagnostic pointing at the offending statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub message: String,
    pub range: Option<SourceRange>,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error: {}", self.message)?;
        if let Some(range) = self.range {
            write!(
                f,
                " (at {}:{}-{}:{})",
                range.start.line, range.start.column, range.end.line, range.end.column
            )?;
        }
        Ok(())
    }
}

/// Errors that can occur during parsing or validation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Syntax error during parsing.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Semantic validation error.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Semantic validation error with an optional source range.
    #[error("{0}")]
    ValidationDiagnostic(ValidationDiagnostic),
}

impl FrontendError {
    pub fn validation(message: impl Into<String>, range: Option<SourceRange>) -> Self {
        Self::ValidationDiagnostic(ValidationDiagnostic {
            message: message.into(),
            range,
        })
    }

    /// Returns the rich validation diagnostic if present.
    pub fn validation_diagnostic(&self) -> Option<&ValidationDiagnostic> {
        match self {
            Self::ValidationDiagnostic(diag) => Some(diag),
            _ => None,
        }
    }
}
