use may_minihttp::Response;
use serde_json::Value;

/// Prefix written before the JSON payload of every dispatch response.
/// Makes the body invalid JSON so it cannot be swallowed whole by a naive
/// cross-site script include.
pub const DISPATCH_PREFIX: char = ']';

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Serialize a dispatch result: the prefix immediately followed by compact
/// JSON, no trailing newline.
pub fn stringify(result: &Value) -> String {
    format!("{DISPATCH_PREFIX}{result}")
}

/// Write the single, buffered 200 response for a completed handling cycle.
pub fn write_dispatch_response(res: &mut Response, result: &Value) {
    res.status_code(200, status_reason(200));
    res.header("Content-Type: text/plain");
    res.body_vec(stringify(result).into_bytes());
}

/// Write an empty-bodied status response (the 503 internal-fault answer).
pub fn write_empty(res: &mut Response, status: u16) {
    res.status_code(status as usize, status_reason(status));
}
