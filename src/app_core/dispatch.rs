//! Request lifetime: one worker thread per submission, completions over a channel.
//!
//! The event loop drains [`Dispatcher::try_recv`] between terminal events, so the
//! UI stays responsive while a lookup is in flight. Once the dispatcher is shut
//! down (or dropped) late workers throw their result away instead of delivering
//! it to state that no longer exists.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
#[cfg(test)]
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use crate::app_core::state::QueryRequest;
use crate::backend::{FaqBackend, FetchError};
use crate::model::AnswerItem;

/// Identifies one submission. Later submissions get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(pub u64);

/// Result of one backend lookup, tagged with the submission it belongs to.
#[derive(Debug)]
pub struct Completion {
    pub ticket: RequestTicket,
    pub outcome: Result<Vec<AnswerItem>, FetchError>,
}

pub struct Dispatcher {
    backend: Arc<dyn FaqBackend>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    alive: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn FaqBackend>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            backend,
            tx,
            rx,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Starts the lookup for `request` on a worker thread.
    pub fn dispatch(&self, request: QueryRequest) {
        if !self.is_alive() {
            warn!(ticket = request.ticket.0, "dispatcher shut down; request dropped");
            return;
        }

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let alive = Arc::clone(&self.alive);
        info!(
            ticket = request.ticket.0,
            app = %request.query.app_slug,
            "submitting question"
        );

        thread::spawn(move || {
            let outcome = backend.fetch_answers(&request.query);
            if !alive.load(Ordering::Acquire) {
                debug!(ticket = request.ticket.0, "discarding completion after shutdown");
                return;
            }
            let _ = tx.send(Completion {
                ticket: request.ticket,
                outcome,
            });
        });
    }

    /// Next finished lookup, if any, without blocking.
    pub fn try_recv(&self) -> Option<Completion> {
        if !self.is_alive() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next finished lookup.
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        if !self.is_alive() {
            return None;
        }
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Stops delivering completions. In-flight workers finish and discard their results.
    pub fn shutdown(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            debug!("dispatcher shut down");
            while self.rx.try_recv().is_ok() {}
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
