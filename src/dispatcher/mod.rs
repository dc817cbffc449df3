//! # Dispatcher Module
//!
//! The dispatcher owns the registry of named actions and executes one action
//! per dispatch attempt on behalf of the HTTP layer.
//!
//! ## Overview
//!
//! An *action* is one unit of client-requested work, identified by its
//! normalized name. The dispatcher:
//!
//! - resolves the action descriptor for a request (body `act` field first,
//!   `/api/<act>` URL path second, both normalized through `to_id`)
//! - looks the action up in the registry and runs its handler
//! - distinguishes user-facing action errors from internal faults
//! - catches handler panics so one broken action cannot crash the server
//!
//! ## Outcomes
//!
//! `execute` has four outcomes, and the HTTP layer maps each to a fixed
//! payload shape:
//!
//! - `Ok(Some(value))` - the handler's result, returned verbatim
//! - `Ok(None)` - neutral not-found: no handler registered under that name
//! - `Err(DispatchError::Action(_))` - safe to show to the client
//! - `Err(DispatchError::Internal(_))` - redacted, crash-reported, 503

mod core;

pub use core::{ActionContext, ActionHandler, DispatchError, Dispatcher};
