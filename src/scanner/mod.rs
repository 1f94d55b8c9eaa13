//! Template scanner
//!
//! Splits template text into literal, expression and code segments. The
//! scanner tracks which mode it is in (markup, code block, expression, tag,
//! attribute value) and where each mode ends, but never parses the embedded
//! code.

pub mod delimiter;
pub mod directive;
pub mod lexer;
mod machine;
pub mod mode;
pub mod segment;
pub mod tags;

pub use machine::{scan, Scanner};
pub use segment::Segment;
