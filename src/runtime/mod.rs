//! Script runtime port
//!
//! Compiling a template produces source text in the embedded language; a
//! [`ScriptRuntime`] loads and runs it. The default runtime is [`BoaRuntime`].

pub mod boa;
pub mod error;

use std::fmt;

use serde_json::Value;

use crate::codegen::Procedure;

pub use boa::BoaRuntime;
pub use error::ScriptError;

/// Loads and runs generated procedures
pub trait ScriptRuntime: fmt::Debug + Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Load the procedure without running it, reporting syntax errors
    fn check(&self, procedure: &Procedure) -> Result<(), ScriptError>;

    /// Run the procedure with `model` bound to its parameter
    fn run(&self, procedure: &Procedure, model: &Value) -> Result<String, ScriptError>;
}
