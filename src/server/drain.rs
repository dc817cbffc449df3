//! In-flight request accounting and the drain-on-close protocol.

use may::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use tracing::info;

/// Counts dispatches in flight and coordinates graceful drain.
///
/// The counter and the pending-drain waiters live behind one mutex. The lock
/// is held only for the bookkeeping itself, never across an action's
/// execution, so a slow handler cannot stall other requests here.
#[derive(Default)]
pub struct InFlight {
    state: Mutex<DrainState>,
}

#[derive(Default)]
struct DrainState {
    active_requests: usize,
    closing: bool,
    waiters: Vec<Sender<()>>,
}

/// Completion returned by [`InFlight::close`]. Settles once the in-flight
/// count has drained to zero.
pub struct DrainHandle {
    rx: Receiver<()>,
}

impl DrainHandle {
    /// Block until the drain completes.
    pub fn wait(self) {
        let _ = self.rx.recv();
    }
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dispatches currently in flight.
    pub fn active_requests(&self) -> usize {
        self.state.lock().unwrap().active_requests
    }

    /// True once a close has been requested.
    pub fn closing(&self) -> bool {
        self.state.lock().unwrap().closing
    }

    /// Record the start of a dispatch attempt.
    pub fn begin(&self) {
        self.state.lock().unwrap().active_requests += 1;
    }

    /// Record the end of a dispatch attempt, on any outcome.
    ///
    /// Resolves every pending drain handle when a close has been requested
    /// and the count reaches zero. Returns true when a close is pending so
    /// the caller can mark the connection for closure. Callers pair this
    /// with [`InFlight::begin`] exactly once per dispatch attempt.
    pub fn end(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        debug_assert!(state.active_requests > 0, "end without begin");
        state.active_requests = state.active_requests.saturating_sub(1);
        if state.closing && state.active_requests == 0 && !state.waiters.is_empty() {
            info!("in-flight requests drained");
            for waiter in state.waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
        state.closing
    }

    /// Request a close and return a completion that settles when the
    /// in-flight count reaches zero.
    ///
    /// Safe to call repeatedly: every handle settles at the same drain
    /// point, and a handle taken while already idle settles immediately.
    /// The decrement path in [`InFlight::end`] is the sole resolver for
    /// non-idle closes; nothing polls.
    pub fn close(&self) -> DrainHandle {
        let (tx, rx) = mpsc::channel();
        let mut state = self.state.lock().unwrap();
        state.closing = true;
        if state.active_requests == 0 {
            let _ = tx.send(());
        } else {
            state.waiters.push(tx);
        }
        DrainHandle { rx }
    }
}
