use may_minihttp::Request;
use serde_json::{Map, Value};
use std::io::Read;
use tracing::debug;

/// A request body, shaped exactly once at the extraction boundary.
///
/// Batch vs single is decided here and never re-inspected downstream: a body
/// whose `json` field is an array becomes [`RequestBody::Batch`] with one
/// mapping per element, everything else is [`RequestBody::Single`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// One action invocation.
    Single(Map<String, Value>),
    /// An ordered sequence of action invocations.
    Batch(Vec<Map<String, Value>>),
}

/// Parsed pieces of an incoming request that the action layer consumes.
#[derive(Debug)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, ...).
    pub method: String,
    /// Request path with the query string stripped.
    pub path: String,
    /// Extracted body.
    pub body: RequestBody,
}

/// Extract the body mapping from the raw path and body text.
///
/// Query-string parameters are folded into the mapping first; a JSON-object
/// body or an urlencoded form body is merged on top, so body fields win over
/// query fields of the same name. A body that is valid JSON but not an
/// object contributes nothing.
pub fn extract_body(raw_path: &str, body_str: &str) -> RequestBody {
    let mut merged = Map::new();
    if let Some(pos) = raw_path.find('?') {
        for (k, v) in url::form_urlencoded::parse(raw_path[pos + 1..].as_bytes()) {
            merged.insert(k.to_string(), Value::String(v.to_string()));
        }
    }

    if !body_str.is_empty() {
        match serde_json::from_str::<Value>(body_str) {
            Ok(Value::Object(fields)) => merged.extend(fields),
            Ok(_) => debug!("non-object json body ignored"),
            Err(_) => {
                for (k, v) in url::form_urlencoded::parse(body_str.as_bytes()) {
                    merged.insert(k.to_string(), Value::String(v.to_string()));
                }
            }
        }
    }

    match merged.get("json") {
        Some(Value::Array(elements)) => {
            let bodies = elements
                .iter()
                .map(|element| match element {
                    Value::Object(fields) => fields.clone(),
                    // dispatches as an empty mapping and fails with the
                    // invalid-action payload, in order
                    _ => Map::new(),
                })
                .collect();
            RequestBody::Batch(bodies)
        }
        _ => RequestBody::Single(merged),
    }
}

/// Extract everything the action layer needs from a raw HTTP request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let mut body_str = String::new();
    let _ = req.body().read_to_string(&mut body_str);
    let body = extract_body(&raw_path, &body_str);

    debug!(
        method = %method,
        path = %path,
        batch = matches!(body, RequestBody::Batch(_)),
        "request parsed"
    );

    ParsedRequest { method, path, body }
}
