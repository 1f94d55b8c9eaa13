//! Configuration for procedure generation

use crate::error::CompileError;

use super::javascript::BUFFER;

/// Words that cannot name the model parameter
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Configuration options for generated procedures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Name of the parameter the model is bound to
    pub binding_name: String,

    /// Whether model properties are reachable as bare names
    pub use_implicit_model_scope: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            binding_name: "model".to_string(),
            use_implicit_model_scope: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model parameter name
    pub fn with_binding_name(mut self, name: impl Into<String>) -> Self {
        self.binding_name = name.into();
        self
    }

    /// Set whether bare names resolve against the model
    pub fn with_implicit_model_scope(mut self, enabled: bool) -> Self {
        self.use_implicit_model_scope = enabled;
        self
    }

    /// Check that the binding name is a usable parameter name
    pub fn validate(&self) -> Result<(), CompileError> {
        if is_valid_binding_name(&self.binding_name) {
            Ok(())
        } else {
            Err(CompileError::InvalidBindingName {
                name: self.binding_name.clone(),
            })
        }
    }
}

fn is_valid_binding_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
    starts_well
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
        && name != BUFFER
}
