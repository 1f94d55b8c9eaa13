//! TOML settings for the command-line renderer
//!
//! ```toml
//! [template]
//! binding_name = "it"
//! implicit_scope = false
//! ```
//!
//! Every key is optional; missing keys keep the compile defaults.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::CompileOptions;

/// Errors that can occur when loading or parsing settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Loaded settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub template: TemplateSettings,
}

/// The `[template]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    pub binding_name: String,
    pub implicit_scope: bool,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        let options = CompileOptions::default();
        Self {
            binding_name: options.binding_name,
            implicit_scope: options.use_implicit_scope,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Compile options carrying these settings
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::new()
            .with_binding_name(self.template.binding_name.clone())
            .with_implicit_scope(self.template.implicit_scope)
    }
}
