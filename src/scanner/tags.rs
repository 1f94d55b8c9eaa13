//! Tag balance tracking for markup nested inside code blocks

use tracing::trace;

use crate::error::{CompileError, Span};

/// An element opened inside a code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    pub name: String,
    pub self_closing: bool,
    pub span: Span,
}

/// Stack of open elements for one span of nested markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTracker {
    stack: Vec<OpenTag>,
}

impl TagTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an opening tag
    pub fn open(&mut self, name: impl Into<String>, span: Span) {
        self.stack.push(OpenTag {
            name: name.into(),
            self_closing: false,
            span,
        });
    }

    /// Record a self-closing tag; it never stays on the stack
    pub fn open_self_closing(&mut self, name: impl Into<String>, span: Span) -> Option<OpenTag> {
        self.stack.push(OpenTag {
            name: name.into(),
            self_closing: true,
            span,
        });
        self.stack.pop()
    }

    /// Pop the innermost element, which must be named `name`
    pub fn close(&mut self, name: &str, span: Span) -> Result<OpenTag, CompileError> {
        match self.stack.pop() {
            Some(open) if open.name == name => {
                trace!(tag = name, depth = self.stack.len(), "closed tag");
                Ok(open)
            }
            Some(open) => Err(CompileError::invalid_tag(Some(open.name), name, span)),
            None => Err(CompileError::invalid_tag(None, name, span)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn innermost(&self) -> Option<&OpenTag> {
        self.stack.last()
    }
}

/// Length in bytes of the tag name at the start of `rest`
///
/// Names start with an ASCII letter and continue with letters, digits,
/// `-`, `_`, `:` or `.`. Returns 0 when `rest` does not start a name.
pub fn tag_name_len(rest: &str) -> usize {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
        .map(|(i, _)| i)
        .unwrap_or(rest.len())
}

/// True when `rest` (starting at `<`) begins an opening or closing tag
pub fn starts_tag(rest: &str) -> bool {
    match rest.strip_prefix('<') {
        Some(after) => tag_name_len(after.strip_prefix('/').unwrap_or(after)) > 0,
        None => false,
    }
}
