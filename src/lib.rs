//! # actiongate
//!
//! **actiongate** is a coroutine-powered HTTP action router for Rust, built
//! on the `may` runtime. It accepts inbound requests, normalizes each into
//! one or more named *actions*, runs every action through a registered
//! handler, and answers with a fixed, prefixed text format, with
//! coordinated graceful drain when the process shuts down.
//!
//! ## Architecture
//!
//! The library is organized into a handful of modules:
//!
//! - **[`ids`]** - canonical identifier normalization (`to_id`) and request
//!   correlation ids
//! - **[`config`]** - YAML settings consumed once at router construction
//! - **[`dispatcher`]** - action registry, extraction rule and execution
//! - **[`server`]** - HTTP layer: body extraction, dispatch fan-out,
//!   response serialization, and the drain-on-close protocol
//! - **[`crashlog`]** - injected crash-reporting capability with a console
//!   fallback
//!
//! ## Request lifecycle
//!
//! ```text
//! accept → body extraction (single | batch, decided once)
//!        → per-body dispatch (counter incremented around execution)
//!        → one buffered response: `]` + JSON, HTTP 200
//! ```
//!
//! Per-body outcomes are payload-level, not HTTP-level: an unrecognized
//! action answers `{"actionerror": ...}`, an unrouted action answers
//! `{"code": 404}`, and a user-facing action error answers with its
//! message, all under HTTP 200. Only an unexpected internal fault aborts
//! the cycle, answering an empty 503 after reporting the redacted failure.
//!
//! ## Quick start
//!
//! ```no_run
//! use actiongate::config::Settings;
//! use actiongate::crashlog::reporter_from_settings;
//! use actiongate::dispatcher::{DispatchError, Dispatcher};
//! use actiongate::server::Router;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> std::io::Result<()> {
//! let settings = Settings::default();
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_action("ping", |_ctx| Ok(json!({ "pong": true })));
//! dispatcher.register_action("guarded", |ctx| {
//!     if ctx.get_str("token").is_none() {
//!         // safe to show to the client, never crash-reported
//!         return Err(DispatchError::action("Access denied."));
//!     }
//!     Ok(json!({ "ok": true }))
//! });
//!
//! let reporter = reporter_from_settings(&settings);
//! let mut router = Router::bind(None, &settings, Arc::new(dispatcher), reporter)?;
//!
//! // ... later: stop accepting and let in-flight actions finish
//! router.close().wait();
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime considerations
//!
//! actiongate runs on the `may` coroutine runtime, not tokio. Handlers run
//! on connection coroutines; blocking suspends only that request. Stack
//! size is configurable via `ACTIONGATE_STACK_SIZE` (or the settings file)
//! and the runtime is incompatible with tokio-based libraries without
//! bridging.

pub mod cli;
pub mod config;
pub mod crashlog;
pub mod dispatcher;
pub mod echo;
pub mod ids;
pub mod server;

pub use config::Settings;
pub use crashlog::{crashlog, reporter_from_settings, ConsoleReporter, CrashReporter, FileReporter};
pub use dispatcher::{ActionContext, DispatchError, Dispatcher};
pub use ids::{to_id, to_id_str, RequestId};
pub use server::{ApiService, DrainHandle, InFlight, RequestBody, Router};
