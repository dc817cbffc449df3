//! Tests for the action dispatcher
//!
//! # Test Coverage
//!
//! Validates the dispatcher's core responsibilities:
//! - Action descriptor resolution (body `act` field, `/api/` path fallback)
//! - Handler registration and replacement
//! - Execution outcomes: result, neutral not-found, action error, fault
//! - Panic isolation (a broken handler becomes an internal fault)

use actiongate::dispatcher::{ActionContext, DispatchError, Dispatcher};
use serde_json::{json, Map, Value};

fn body_with(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_parse_action_normalizes_body_act() {
    let body = body_with(&[("act", json!("LOG IN!"))]);
    assert_eq!(
        Dispatcher::parse_action("/action.php", &body),
        Some("login".to_string())
    );
}

#[test]
fn test_parse_action_from_api_path() {
    let body = Map::new();
    assert_eq!(
        Dispatcher::parse_action("/api/getassertion", &body),
        Some("getassertion".to_string())
    );
    assert_eq!(
        Dispatcher::parse_action("/api/Mixed-Case/extra", &body),
        Some("mixedcase".to_string())
    );
}

#[test]
fn test_parse_action_body_wins_over_path() {
    let body = body_with(&[("act", json!("login"))]);
    assert_eq!(
        Dispatcher::parse_action("/api/register", &body),
        Some("login".to_string())
    );
}

#[test]
fn test_parse_action_unresolvable() {
    assert_eq!(Dispatcher::parse_action("/action.php", &Map::new()), None);
    assert_eq!(Dispatcher::parse_action("/api/", &Map::new()), None);
    // an act field that normalizes to nothing does not resolve
    let body = body_with(&[("act", json!("!!!"))]);
    assert_eq!(Dispatcher::parse_action("/action.php", &body), None);
}

#[test]
fn test_execute_returns_handler_result() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_action("ping", |_ctx| Ok(json!({ "pong": true })));

    let ctx = ActionContext::new("ping".to_string(), Map::new());
    let result = dispatcher.execute(&ctx).unwrap();
    assert_eq!(result, Some(json!({ "pong": true })));
}

#[test]
fn test_execute_unregistered_action_is_neutral_not_found() {
    let dispatcher = Dispatcher::new();
    let ctx = ActionContext::new("missing".to_string(), Map::new());
    assert_eq!(dispatcher.execute(&ctx).unwrap(), None);
}

#[test]
fn test_execute_passes_through_action_error() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_action("guarded", |_ctx| {
        Err(DispatchError::action("bad token"))
    });

    let ctx = ActionContext::new("guarded".to_string(), Map::new());
    match dispatcher.execute(&ctx) {
        Err(DispatchError::Action(message)) => assert_eq!(message, "bad token"),
        other => panic!("expected action error, got {other:?}"),
    }
}

#[test]
fn test_execute_catches_handler_panic() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_action("explode", |_ctx| panic!("handler bug"));

    let ctx = ActionContext::new("explode".to_string(), Map::new());
    match dispatcher.execute(&ctx) {
        Err(DispatchError::Internal(fault)) => {
            let text = format!("{fault}");
            assert!(text.contains("explode"), "fault names the action: {text}");
            assert!(text.contains("handler bug"), "fault carries the payload: {text}");
        }
        other => panic!("expected internal fault, got {other:?}"),
    }
}

#[test]
fn test_register_action_replaces_existing_handler() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_action("ping", |_ctx| Ok(json!(1)));
    dispatcher.register_action("ping", |_ctx| Ok(json!(2)));

    let ctx = ActionContext::new("ping".to_string(), Map::new());
    assert_eq!(dispatcher.execute(&ctx).unwrap(), Some(json!(2)));
}

#[test]
fn test_register_action_normalizes_name() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_action("Get Assertion", |_ctx| Ok(json!(true)));
    assert!(dispatcher.has_action("getassertion"));
}

#[test]
fn test_context_get_str() {
    let body = body_with(&[("name", json!("Blue")), ("count", json!(3))]);
    let ctx = ActionContext::new("ping".to_string(), body);
    assert_eq!(ctx.get_str("name"), Some("Blue"));
    assert_eq!(ctx.get_str("count"), None);
    assert_eq!(ctx.get_str("missing"), None);
}
