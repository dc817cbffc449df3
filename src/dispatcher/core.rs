use crate::ids::{to_id, to_id_str};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Context handed to an action handler: the resolved action name plus the
/// body mapping it was resolved from.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Normalized action name.
    pub act: String,
    /// Request body for this invocation (query parameters already merged).
    pub body: Map<String, Value>,
}

impl ActionContext {
    pub fn new(act: String, body: Map<String, Value>) -> Self {
        Self { act, body }
    }

    /// String-typed body field, if present.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}

/// Failure modes of a dispatch attempt.
#[derive(Debug)]
pub enum DispatchError {
    /// User-facing action error. The message is intended for direct client
    /// display and is returned under the `actionerror` payload field.
    Action(String),
    /// Internal fault. Never shown to the client; redacted details go to the
    /// crash reporter instead.
    Internal(anyhow::Error),
}

impl DispatchError {
    /// Shorthand for a user-facing error.
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Action(message) => write!(f, "action error: {message}"),
            DispatchError::Internal(err) => write!(f, "internal dispatch fault: {err}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Handler for one named action. Runs on the connection coroutine; blocking
/// work suspends only that request.
pub type ActionHandler = Arc<dyn Fn(&ActionContext) -> Result<Value, DispatchError> + Send + Sync>;

/// Registry of named actions.
///
/// Built once at startup, then shared read-only with the HTTP layer.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, ActionHandler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a name. Replaces any existing handler with
    /// the same name.
    pub fn register_action<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&ActionContext) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        let name = to_id_str(name);
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            warn!(act = %name, "replaced existing action handler");
        } else {
            info!(act = %name, total_actions = self.handlers.len(), "action registered");
        }
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Resolve the action descriptor for a request.
    ///
    /// The body's `act` field wins; otherwise a path under `/api/` names the
    /// action directly. `None` means no recognizable action was sent, which
    /// short-circuits with a client-visible error before any dispatch.
    pub fn parse_action(path: &str, body: &Map<String, Value>) -> Option<String> {
        if let Some(raw) = body.get("act") {
            let act = to_id(raw);
            if !act.is_empty() {
                return Some(act);
            }
        }
        let rest = path.strip_prefix("/api/")?;
        let act = to_id_str(rest.split('/').next().unwrap_or(""));
        (!act.is_empty()).then_some(act)
    }

    /// Execute the action named in `ctx`.
    ///
    /// `Ok(None)` is the neutral not-found outcome: no handler is registered
    /// under that name. A panicking handler is caught and surfaced as an
    /// internal fault.
    pub fn execute(&self, ctx: &ActionContext) -> Result<Option<Value>, DispatchError> {
        let Some(handler) = self.handlers.get(&ctx.act) else {
            debug!(act = %ctx.act, "no handler registered");
            return Ok(None);
        };
        let handler = Arc::clone(handler);
        let outcome =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(ctx)));
        match outcome {
            Ok(result) => result.map(Some),
            Err(panic) => Err(DispatchError::Internal(anyhow::anyhow!(
                "action handler '{}' panicked: {}",
                ctx.act,
                panic_message(&panic)
            ))),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
