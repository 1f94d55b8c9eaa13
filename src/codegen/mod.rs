//! Code generator
//!
//! Turns the segment list into the body of a procedure in the embedded
//! language. Code segments are copied verbatim, so markup nested in a loop
//! is emitted once per iteration when the procedure runs.

pub mod config;
pub mod javascript;

pub use config::GeneratorConfig;
pub use javascript::{generate, Procedure, BUFFER};
