//! Error types for template scanning and code generation

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A construct that can be opened and must later be closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    /// `@* ... *@`
    Comment,
    /// `( ... )`
    Paren,
    /// `[ ... ]`
    Bracket,
    /// `{ ... }` code block
    Block,
    /// Quoted string inside embedded code
    Quote,
    /// HTML element nested in a code block
    Tag,
    /// Quoted attribute value inside a tag
    Attribute,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::Comment => "comment",
            Construct::Paren => "parenthesis",
            Construct::Bracket => "bracket",
            Construct::Block => "block",
            Construct::Quote => "string literal",
            Construct::Tag => "tag",
            Construct::Attribute => "attribute value",
        };
        f.write_str(name)
    }
}

/// Errors raised while compiling a template
///
/// Every variant is fatal for the current compile; no partial output is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// An opened construct has no matching close before end of input
    #[error("unmatched {construct} opened at {span:?}")]
    Unmatched { construct: Construct, span: Span },

    /// A closing tag does not match the innermost open tag
    #[error("invalid tag: found </{found}> {}", expected_clause(.expected))]
    InvalidTag {
        expected: Option<String>,
        found: String,
        span: Span,
    },

    /// Markup that cannot be read as a tag at all
    #[error("malformed html at {span:?}: {message}")]
    MalformedHtml { message: String, span: Span },

    /// The model binding name cannot be used as an identifier in generated code
    #[error("invalid binding name '{name}'")]
    InvalidBindingName { name: String },
}

fn expected_clause(expected: &Option<String>) -> String {
    match expected {
        Some(name) => format!("while <{}> is open", name),
        None => "with no open tag".to_string(),
    }
}

impl CompileError {
    /// Create an unmatched-construct error
    pub fn unmatched(construct: Construct, span: Span) -> Self {
        Self::Unmatched { construct, span }
    }

    /// Create a mismatched closing tag error
    pub fn invalid_tag(expected: Option<String>, found: impl Into<String>, span: Span) -> Self {
        Self::InvalidTag {
            expected,
            found: found.into(),
            span,
        }
    }

    /// Create a malformed markup error
    pub fn malformed(message: impl Into<String>, span: Span) -> Self {
        Self::MalformedHtml {
            message: message.into(),
            span,
        }
    }

    /// Get the source span if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Unmatched { span, .. } => Some(span),
            Self::InvalidTag { span, .. } => Some(span),
            Self::MalformedHtml { span, .. } => Some(span),
            Self::InvalidBindingName { .. } => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("Error: {}\n", self);
        };
        let span = span.start.min(source.len())..span.end.min(source.len());
        let note = match self {
            Self::Unmatched { construct, .. } => format!("this {} is never closed", construct),
            Self::InvalidTag { expected: Some(name), .. } => {
                format!("expected </{}> here", name)
            }
            Self::InvalidTag { expected: None, .. } => "no element is open here".to_string(),
            _ => self.to_string(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(note)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("Error: {}\n", self),
        }
    }
}
