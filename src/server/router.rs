use super::drain::{DrainHandle, InFlight};
use super::service::ApiService;
use crate::config::Settings;
use crate::crashlog::CrashReporter;
use crate::dispatcher::Dispatcher;
use may::coroutine::JoinHandle;
use may_minihttp::HttpServer;
use std::io;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Owns the listening socket and the drain-on-close protocol.
///
/// Construction binds and starts accepting immediately; that is the only
/// externally observable side effect of [`Router::bind`] and it is
/// irreversible short of [`Router::close`].
pub struct Router {
    addr: SocketAddr,
    accept_handle: Option<JoinHandle<()>>,
    in_flight: Arc<InFlight>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("addr", &self.addr).finish()
    }
}

impl Router {
    /// Bind the listener and start accepting.
    ///
    /// The port resolves from the explicit override first, then the
    /// settings file, then the default. TLS material in the settings
    /// selects the secure transport, which this coroutine stack does not
    /// terminate; that configuration fails fast here rather than serving
    /// plaintext on a port the operator believes is secure.
    pub fn bind(
        port: Option<u16>,
        settings: &Settings,
        dispatcher: Arc<Dispatcher>,
        reporter: Arc<dyn CrashReporter>,
    ) -> io::Result<Self> {
        if settings.ssl.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "tls termination is not available on the coroutine transport; \
                 run behind a terminating proxy or remove the ssl settings",
            ));
        }

        let port = settings.resolve_port(port);
        let service = ApiService::new(dispatcher, reporter, settings.crash_notify_email.clone());
        let in_flight = service.in_flight();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let accept_handle = HttpServer(service).start(addr)?;
        info!(%addr, "listening");

        Ok(Self {
            addr,
            accept_handle: Some(accept_handle),
            in_flight,
        })
    }

    /// Address the listener was bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of dispatches currently in flight.
    pub fn active_requests(&self) -> usize {
        self.in_flight.active_requests()
    }

    /// Poll until the listener accepts connections.
    ///
    /// Startup aid for tests and supervisors; fails with `TimedOut` after
    /// ~250ms (50 attempts x 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        let probe = SocketAddr::from(([127, 0, 0, 1], self.addr.port()));
        for _ in 0..50 {
            if TcpStream::connect(probe).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting new connections immediately and return a completion
    /// that settles once every in-flight dispatch has finished.
    ///
    /// Idempotent: repeated calls return fresh handles that all settle at
    /// the same drain point, and a call while already idle settles
    /// immediately. In-flight dispatches are never interrupted; a hung
    /// downstream action holds the drain open indefinitely.
    pub fn close(&mut self) -> DrainHandle {
        if let Some(handle) = self.accept_handle.take() {
            info!("closing listener, draining in-flight requests");
            // SAFETY: cancel() is unsafe in the may runtime. The accept
            // coroutine owns no state beyond the listening socket, which is
            // being shut down here on purpose; already-accepted connection
            // coroutines are independent and keep running until drained.
            unsafe {
                handle.coroutine().cancel();
            }
            let _ = handle.join();
        }
        self.in_flight.close()
    }
}
