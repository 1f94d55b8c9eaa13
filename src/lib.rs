//! Razor Template - compiles Razor-style templates into render procedures
//!
//! Template text mixes literal markup with embedded JavaScript introduced by
//! `@`. Compiling scans the text into segments, generates a procedure from
//! them and loads it into a script runtime; the resulting [`Template`] renders
//! any serializable model.
//!
//! # Example
//!
//! ```rust
//! use razor_template::compile;
//! use serde_json::json;
//!
//! let template = compile("<ul>@for (var i = 0; i < items.length; i++) { <li>@items[i]</li> }</ul>").unwrap();
//! let html = template.render(&json!({ "items": ["a", "b"] })).unwrap();
//! assert_eq!(html, "<ul><li>a</li> <li>b</li> </ul>");
//! ```

pub mod codegen;
pub mod error;
pub mod runtime;
pub mod scanner;
pub mod settings;

pub use codegen::{generate, GeneratorConfig, Procedure};
pub use error::{CompileError, Construct, Span};
pub use runtime::{BoaRuntime, ScriptError, ScriptRuntime};
pub use scanner::{scan, Segment};
pub use settings::Settings;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur anywhere in the compile/render pipeline
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template text could not be compiled
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// The script runtime rejected or failed to run the procedure
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
}

/// Options for one compile call
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name the model is bound to inside the template
    pub binding_name: String,
    /// Resolve bare names against the model's properties
    pub use_implicit_scope: bool,
    /// Runtime that loads and runs the generated procedure
    pub runtime: Arc<dyn ScriptRuntime>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            binding_name: "model".to_string(),
            use_implicit_scope: true,
            runtime: Arc::new(BoaRuntime::new()),
        }
    }
}

impl CompileOptions {
    /// Create a new set of options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model binding name
    pub fn with_binding_name(mut self, name: impl Into<String>) -> Self {
        self.binding_name = name.into();
        self
    }

    /// Enable or disable implicit model scope
    pub fn with_implicit_scope(mut self, enabled: bool) -> Self {
        self.use_implicit_scope = enabled;
        self
    }

    /// Use another script runtime
    pub fn with_runtime(mut self, runtime: impl ScriptRuntime + 'static) -> Self {
        self.runtime = Arc::new(runtime);
        self
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new()
            .with_binding_name(self.binding_name.clone())
            .with_implicit_model_scope(self.use_implicit_scope)
    }
}

/// A compiled template
///
/// Immutable once built; may be rendered any number of times, from any
/// thread.
#[derive(Debug, Clone)]
pub struct Template {
    procedure: Procedure,
    runtime: Arc<dyn ScriptRuntime>,
}

impl Template {
    /// Render with `model` bound to the template's binding name
    pub fn render<T: Serialize + ?Sized>(&self, model: &T) -> Result<String, TemplateError> {
        let model = serde_json::to_value(model).map_err(ScriptError::from)?;
        Ok(self.runtime.run(&self.procedure, &model)?)
    }

    /// Render with an empty model
    pub fn render_empty(&self) -> Result<String, TemplateError> {
        let model = serde_json::Value::Object(serde_json::Map::new());
        Ok(self.runtime.run(&self.procedure, &model)?)
    }

    /// The generated procedure
    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }
}

/// Compile template text with default options
pub fn compile(source: &str) -> Result<Template, TemplateError> {
    compile_with_options(source, &CompileOptions::default())
}

/// Compile template text with explicit options
///
/// # Example
///
/// ```rust
/// use razor_template::{compile_with_options, CompileOptions};
/// use serde_json::json;
///
/// let options = CompileOptions::new()
///     .with_binding_name("it")
///     .with_implicit_scope(false);
/// let template = compile_with_options("<p>@it.title</p>", &options).unwrap();
/// assert_eq!(template.render(&json!({ "title": "Hi" })).unwrap(), "<p>Hi</p>");
/// ```
pub fn compile_with_options(
    source: &str,
    options: &CompileOptions,
) -> Result<Template, TemplateError> {
    let segments = scan(source)?;
    let procedure = generate(&segments, &options.generator_config())?;
    options.runtime.check(&procedure)?;
    debug!(
        runtime = options.runtime.name(),
        binding = %options.binding_name,
        "compiled template"
    );
    Ok(Template {
        procedure,
        runtime: Arc::clone(&options.runtime),
    })
}
