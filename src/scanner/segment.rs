//! Segment stream produced by the scanner

use serde::Serialize;

/// One unit of scanner output, in output order
///
/// Markup nested in a code block sits between the `Code` segments around
/// it, so its execution order and count are decided by that code at render
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    /// Text copied to the output unchanged
    Literal(String),
    /// Embedded expression source, evaluated and appended as a string
    Expression(String),
    /// Embedded statement source, emitted verbatim
    Code(String),
}

/// Accumulates segments, merging neighbouring literals and neighbouring code
#[derive(Debug, Default)]
pub struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Literal(prev)) => prev.push_str(text),
            _ => self.segments.push(Segment::Literal(text.to_string())),
        }
    }

    pub fn code(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Code(prev)) => prev.push_str(text),
            _ => self.segments.push(Segment::Code(text.to_string())),
        }
    }

    /// Expressions are never merged; each one is evaluated on its own
    pub fn expression(&mut self, source: &str) {
        self.segments.push(Segment::Expression(source.to_string()));
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn finish(self) -> Vec<Segment> {
        self.segments
    }
}
