use crate::dispatcher::{ActionContext, DispatchError};
use serde_json::{json, Value};

// Built-in diagnostic action: reflects the resolved action and body back at
// the caller.
pub fn echo_action(ctx: &ActionContext) -> Result<Value, DispatchError> {
    Ok(json!({
        "act": ctx.act,
        "body": Value::Object(ctx.body.clone()),
    }))
}
