//! Scan modes and the explicit mode stack
//!
//! Nesting (markup inside code inside markup inside code, to any depth) is
//! tracked with one stack of frames instead of recursion, so depth is bounded
//! only by memory and the whole state can be inspected at any point.

use tracing::trace;

use crate::error::Span;

use super::delimiter::Balance;
use super::directive::Keyword;
use super::tags::TagTracker;

/// The kind of text being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Markup,
    Block,
    Expression,
    AttributeValue,
    Comment,
    LineEscape,
}

/// A code block: `@{`, `@keyword ... {`, or a continuation clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFrame {
    pub opened_at: usize,
    pub balance: Balance,
    /// Keyword that opened the block, `None` for `@{`
    pub clause: Option<Keyword>,
}

/// Markup nested inside a code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupFrame {
    pub opened_at: usize,
    pub tags: TagTracker,
    /// Inside a `<text>` pseudo-element
    pub in_text: bool,
}

impl MarkupFrame {
    pub fn new(opened_at: usize) -> Self {
        Self {
            opened_at,
            tags: TagTracker::new(),
            in_text: false,
        }
    }

    /// All elements closed and not inside `<text>`: the markup may yield
    /// back to the enclosing code
    pub fn is_settled(&self) -> bool {
        self.tags.is_empty() && !self.in_text
    }
}

/// One entry of the mode stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Top-level template text; the bottom of every stack
    Document,
    Block(BlockFrame),
    Markup(MarkupFrame),
    /// Inside `<name ...` up to its `>`
    Tag { name: String, span: Span },
    AttributeValue { quote: char, opened_at: usize },
    Expression { opened_at: usize },
    Comment { opened_at: usize },
    LineEscape { opened_at: usize },
}

impl Frame {
    pub fn mode(&self) -> Mode {
        match self {
            Frame::Document | Frame::Markup(_) | Frame::Tag { .. } => Mode::Markup,
            Frame::Block(_) => Mode::Block,
            Frame::AttributeValue { .. } => Mode::AttributeValue,
            Frame::Expression { .. } => Mode::Expression,
            Frame::Comment { .. } => Mode::Comment,
            Frame::LineEscape { .. } => Mode::LineEscape,
        }
    }
}

/// Stack of active frames; never empty
#[derive(Debug, Clone)]
pub struct ModeStack {
    frames: Vec<Frame>,
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::Document],
        }
    }

    pub fn push(&mut self, frame: Frame) {
        trace!(mode = ?frame.mode(), depth = self.frames.len(), "push");
        self.frames.push(frame);
    }

    /// Pop the top frame; the document sentinel is never popped
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() == 1 {
            return None;
        }
        let frame = self.frames.pop();
        trace!(mode = ?frame.as_ref().map(Frame::mode), depth = self.frames.len(), "pop");
        frame
    }

    pub fn top(&self) -> &Frame {
        // The sentinel is never popped, so the stack is never empty
        &self.frames[self.frames.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Only the document sentinel remains
    pub fn is_settled(&self) -> bool {
        self.frames.len() == 1
    }

    /// Index of the innermost code block, if any
    pub fn innermost_block(&self) -> Option<usize> {
        self.frames
            .iter()
            .rposition(|frame| matches!(frame, Frame::Block(_)))
    }

    pub fn modes(&self) -> Vec<Mode> {
        self.frames.iter().map(Frame::mode).collect()
    }

    /// Frames from innermost to outermost
    pub fn iter_innermost(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().rev()
    }
}
