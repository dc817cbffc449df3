use super::drain::InFlight;
use super::request::{parse_request, ParsedRequest, RequestBody};
use super::response::{write_dispatch_response, write_empty};
use crate::crashlog::{crashlog, CrashReporter};
use crate::dispatcher::{ActionContext, DispatchError, Dispatcher};
use crate::ids::RequestId;
use may_minihttp::{HttpService, Request, Response};
use serde_json::{json, Map, Value};
use std::io;
use std::sync::Arc;
use tracing::{error, info};

/// Payload for a batch element naming the reserved `json` action.
const NESTED_JSON_ERROR: &str = "Cannot request /api/json in a JSON request.";
/// Payload when no action descriptor resolves for a body.
const INVALID_ACTION_ERROR: &str = "Invalid request action sent.";
/// Source label handed to the crash reporter for dispatch faults.
const CRASH_SOURCE: &str = "an API request";
/// Body fields stripped before details reach the crash reporter.
const REDACTED_FIELDS: [&str; 2] = ["pass", "password"];

/// The request-to-response lifecycle.
///
/// One `ApiService` value is cloned per connection by the HTTP server; the
/// dispatcher, crash reporter and in-flight gauge are shared through `Arc`
/// so every clone observes the same state.
#[derive(Clone)]
pub struct ApiService {
    dispatcher: Arc<Dispatcher>,
    reporter: Arc<dyn CrashReporter>,
    in_flight: Arc<InFlight>,
    notify: Option<String>,
}

impl ApiService {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        reporter: Arc<dyn CrashReporter>,
        notify: Option<String>,
    ) -> Self {
        Self {
            dispatcher,
            reporter,
            in_flight: Arc::new(InFlight::new()),
            notify,
        }
    }

    /// The in-flight gauge shared with the router lifecycle.
    pub fn in_flight(&self) -> Arc<InFlight> {
        Arc::clone(&self.in_flight)
    }

    /// One full request-to-response cycle.
    ///
    /// A returned error is an internal dispatch fault that has already been
    /// answered with an empty 503; it propagates so the transport-level
    /// fault observer sees it too. Every other outcome, including action
    /// errors and not-found payloads, completes with a single 200 response
    /// carrying the prefixed JSON result, written once at the end.
    fn handle(&self, req: Request, res: &mut Response) -> anyhow::Result<()> {
        let request_id = RequestId::new();
        let ParsedRequest { method, path, body } = parse_request(req);
        info!(request_id = %request_id, method = %method, path = %path, "request received");

        let result = match body {
            RequestBody::Batch(bodies) => {
                let mut results = Vec::with_capacity(bodies.len());
                for body in bodies {
                    // nested batch introspection is disallowed, wherever the
                    // element sits
                    if body.get("act").and_then(Value::as_str) == Some("json") {
                        results.push(json!({ "actionerror": NESTED_JSON_ERROR }));
                        continue;
                    }
                    results.push(self.handle_one(&path, body, res)?);
                }
                Value::Array(results)
            }
            RequestBody::Single(body) => self.handle_one(&path, body, res)?,
        };

        write_dispatch_response(res, &result);
        Ok(())
    }

    /// Dispatch one action body and produce its payload value.
    ///
    /// The in-flight counter is incremented only when an action actually
    /// dispatches, and decremented exactly once on every exit path. On an
    /// internal fault the empty 503 is written here before the fault
    /// propagates.
    fn handle_one(
        &self,
        path: &str,
        body: Map<String, Value>,
        res: &mut Response,
    ) -> anyhow::Result<Value> {
        let Some(act) = Dispatcher::parse_action(path, &body) else {
            return Ok(json!({ "actionerror": INVALID_ACTION_ERROR }));
        };

        let ctx = ActionContext::new(act, body);
        self.in_flight.begin();
        let outcome = self.dispatcher.execute(&ctx);
        if self.in_flight.end() {
            // shutdown pending: tell the client this connection will not be
            // reused, whether or not the drain just completed
            res.header("Connection: close");
        }

        match outcome {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Ok(json!({ "code": 404 })),
            Err(DispatchError::Action(message)) => Ok(json!({ "actionerror": message })),
            Err(DispatchError::Internal(fault)) => {
                let mut details = ctx.body;
                for field in REDACTED_FIELDS {
                    details.remove(field);
                }
                crashlog(
                    self.reporter.as_ref(),
                    &fault,
                    CRASH_SOURCE,
                    &details,
                    self.notify.as_deref(),
                );
                write_empty(res, 503);
                Err(fault)
            }
        }
    }
}

impl HttpService for ApiService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        if let Err(fault) = self.handle(req, res) {
            // The empty 503 is already buffered; log the re-raised fault
            // here instead of returning Err, which would make the transport
            // clobber the response.
            error!(error = ?fault, "api request crashed");
        }
        Ok(())
    }
}
