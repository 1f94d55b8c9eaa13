//! JavaScript procedure generation from scanned segments

use tracing::debug;

use crate::error::CompileError;
use crate::scanner::Segment;

use super::GeneratorConfig;

/// Name of the output buffer local to every generated procedure
pub const BUFFER: &str = "__vout";

/// Generated template procedure: a function body taking the model as its
/// only parameter and returning the rendered string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub binding_name: String,
    pub body: String,
}

impl Procedure {
    /// The body wrapped as an anonymous function expression
    pub fn function_source(&self) -> String {
        format!("(function ({}) {{\n{}}})", self.binding_name, self.body)
    }

    /// A complete script that calls the procedure with `model_json`
    pub fn invocation_source(&self, model_json: &str) -> String {
        format!("{}({})", self.function_source(), model_json)
    }
}

/// Build a procedure body incrementally
pub struct ScriptBuilder {
    config: GeneratorConfig,
    body: String,
}

impl ScriptBuilder {
    pub fn new(config: GeneratorConfig) -> Self {
        let mut builder = Self {
            config,
            body: String::new(),
        };
        builder.prologue();
        builder
    }

    fn prologue(&mut self) {
        self.body.push_str(&format!("var {} = [];\n", BUFFER));
        if self.config.use_implicit_model_scope {
            // The scope object inherits the model's fields and owns the
            // buffer, so a model field can never hide it. A null or
            // primitive model leaves only the buffer in scope.
            self.body.push_str(&format!(
                "with ({{ __proto__: {}, {}: {} }}) {{\n",
                self.config.binding_name, BUFFER, BUFFER
            ));
        }
    }

    fn epilogue(&mut self) {
        if self.config.use_implicit_model_scope {
            self.body.push_str("}\n");
        }
        self.body.push_str(&format!("return {}.join(\"\");\n", BUFFER));
    }

    /// Append the statement for one segment
    pub fn add_segment(&mut self, segment: &Segment) {
        match segment {
            Segment::Literal(text) => {
                self.body
                    .push_str(&format!("{}.push({});\n", BUFFER, string_literal(text)));
            }
            Segment::Expression(source) => {
                self.body
                    .push_str(&format!("{}.push(({}));\n", BUFFER, source));
            }
            Segment::Code(source) => {
                self.body.push_str(source);
                self.body.push('\n');
            }
        }
    }

    pub fn build(mut self) -> Procedure {
        self.epilogue();
        Procedure {
            binding_name: self.config.binding_name,
            body: self.body,
        }
    }
}

/// Generate the procedure for a segment list
pub fn generate(segments: &[Segment], config: &GeneratorConfig) -> Result<Procedure, CompileError> {
    config.validate()?;
    let mut builder = ScriptBuilder::new(config.clone());
    for segment in segments {
        builder.add_segment(segment);
    }
    let procedure = builder.build();
    debug!(
        segments = segments.len(),
        body_bytes = procedure.body.len(),
        implicit_scope = config.use_implicit_model_scope,
        "generated procedure"
    );
    Ok(procedure)
}

/// Quote text as a JavaScript string literal
///
/// JSON string syntax is a subset of JavaScript's, so serde_json's escaping
/// covers quotes, backslashes, newlines and control characters.
fn string_literal(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
