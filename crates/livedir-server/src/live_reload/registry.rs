//! Connected live reload clients.
//!
//! Every open WebSocket owns one entry. The socket task registers itself on
//! connect and removes itself on disconnect; the change notifier only ever
//! calls [`ClientRegistry::broadcast`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

/// Signal pushed from the server to every connected browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Navigate to the same page again.
    Reload,
    /// Re-fetch stylesheets in place.
    RefreshCss,
}

impl Signal {
    /// Wire representation, as understood by the injected script.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::RefreshCss => "refresh-css",
        }
    }
}

/// Identity of a connected client.
pub type ClientId = Uuid;

/// Registry of connected clients with fan-out delivery.
///
/// Sends are unbounded: a client that stops reading accumulates signals
/// until its socket closes.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<ClientId, mpsc::UnboundedSender<Signal>>>,
}

impl ClientRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, mpsc::UnboundedSender<Signal>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client.
    ///
    /// Returns the client's id and the receiving end of its signal queue.
    pub fn register(&self) -> (ClientId, mpsc::UnboundedReceiver<Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.lock().insert(id, tx);
        (id, rx)
    }

    /// Remove a client. Unknown ids are ignored.
    pub fn unregister(&self, id: ClientId) {
        self.lock().remove(&id);
    }

    /// Send `signal` to every client registered right now.
    ///
    /// Returns how many clients accepted the signal. A failed send is logged
    /// and skipped; it never stops delivery to the rest.
    pub fn broadcast(&self, signal: Signal) -> usize {
        let snapshot: Vec<_> = self
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in snapshot {
            if tx.send(signal).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(
                    client = %id,
                    signal = signal.as_str(),
                    "Client gone before delivery"
                );
            }
        }
        delivered
    }

    /// Number of connected clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no client is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
