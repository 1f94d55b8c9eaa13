//! Errors raised by the script runtime

use thiserror::Error;

/// Errors from loading or running a generated procedure
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The generated code was rejected by the runtime (usually a syntax
    /// error in embedded code)
    #[error("generated code failed to load: {message}")]
    Load { message: String },

    /// The procedure raised while rendering
    #[error("template raised an error: {message}")]
    Evaluation { message: String },

    /// The model could not be converted to a runtime value
    #[error("model conversion failed: {0}")]
    Model(#[from] serde_json::Error),
}

impl ScriptError {
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}
