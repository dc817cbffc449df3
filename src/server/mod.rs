//! # Server Module
//!
//! The HTTP layer: transport lifecycle, body extraction, dispatch fan-out
//! and the drain-on-close protocol.
//!
//! [`Router`] owns the listening socket for its entire lifetime. Requests
//! flow through [`request::parse_request`] (which decides single vs batch
//! exactly once), [`ApiService`] (which fans out to the dispatcher and owns
//! the fault boundary), and [`response`] (the `]`-prefixed wire format).
//! [`InFlight`] tracks dispatches in flight so `Router::close` can drain
//! before the process exits.

pub mod drain;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use drain::{DrainHandle, InFlight};
pub use request::{extract_body, parse_request, ParsedRequest, RequestBody};
pub use response::{stringify, DISPATCH_PREFIX};
pub use router::Router;
pub use service::ApiService;
