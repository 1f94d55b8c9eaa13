//! Embedded JavaScript runtime backed by boa

use boa_engine::{Context, JsError, JsValue, Source};
use serde_json::Value;
use tracing::trace;

use crate::codegen::Procedure;

use super::{ScriptError, ScriptRuntime};

/// Runs procedures in a fresh boa context per call
///
/// Contexts are not shared, so one render cannot observe globals left behind
/// by another and the runtime is safe to use from several threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoaRuntime;

impl BoaRuntime {
    pub fn new() -> Self {
        Self
    }

    fn eval(context: &mut Context, script: &str) -> Result<JsValue, JsError> {
        context.eval(Source::from_bytes(script))
    }

    /// Native errors carry their kind and message; anything else thrown is
    /// shown as a value
    fn describe(err: JsError, context: &mut Context) -> String {
        match err.try_native(context) {
            Ok(native) => native.to_string(),
            Err(_) => err.to_string(),
        }
    }
}

impl ScriptRuntime for BoaRuntime {
    fn name(&self) -> &str {
        "boa"
    }

    fn check(&self, procedure: &Procedure) -> Result<(), ScriptError> {
        let mut context = Context::default();
        match Self::eval(&mut context, &procedure.function_source()) {
            Ok(_) => Ok(()),
            Err(err) => Err(ScriptError::load(Self::describe(err, &mut context))),
        }
    }

    fn run(&self, procedure: &Procedure, model: &Value) -> Result<String, ScriptError> {
        let model_json = serde_json::to_string(model)?;
        let script = procedure.invocation_source(&model_json);
        trace!(script_bytes = script.len(), "evaluating procedure");

        let mut context = Context::default();
        let text = match Self::eval(&mut context, &script)
            .and_then(|value| value.to_string(&mut context))
        {
            Ok(text) => text,
            Err(err) => return Err(ScriptError::evaluation(Self::describe(err, &mut context))),
        };
        Ok(text.to_std_string_escaped())
    }
}
