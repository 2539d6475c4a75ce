//! Change notification - publish/subscribe keyed by resource URI
//!
//! An observer registered on `U` receives a publish of `P` when:
//! - `U == P`
//! - `U` is an ancestor of `P` and the observer asked for descendants
//! - `U` is a descendant of `P` (a collection change invalidates its items)
//!
//! Delivery goes through unbounded channels, so publishing never waits on a
//! slow observer. Observers whose subscription was dropped are pruned on the
//! next publish that would have reached them.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use crate::uri::ResourceUri;

struct Observer {
    uri: ResourceUri,
    notify_for_descendants: bool,
    tx: Sender<ResourceUri>,
}

impl Observer {
    fn wants(&self, changed: &ResourceUri) -> bool {
        self.uri == *changed
            || (self.notify_for_descendants && self.uri.is_ancestor_of(changed))
            || changed.is_ancestor_of(&self.uri)
    }
}

/// Registry of observers keyed by URI
#[derive(Default)]
pub struct ChangeNotifier {
    observers: Mutex<Vec<Observer>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `uri`
    pub fn subscribe(&self, uri: &ResourceUri, notify_for_descendants: bool) -> Subscription {
        let (tx, rx) = unbounded();
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Observer {
                uri: uri.clone(),
                notify_for_descendants,
                tx,
            });
        Subscription { uri: uri.clone(), rx }
    }

    /// Signal that the resource at `uri` changed. Returns the number of observers reached.
    pub fn publish(&self, uri: &ResourceUri) -> usize {
        let mut delivered = 0;
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|observer| {
                if !observer.wants(uri) {
                    return true;
                }
                match observer.tx.send(uri.clone()) {
                    Ok(()) => {
                        delivered += 1;
                        true
                    }
                    Err(_) => false,
                }
            });
        tracing::debug!("Notified {} observer(s) of {}", delivered, uri);
        delivered
    }

    /// Number of registered observers, including ones not yet pruned
    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Receiving end of a registration; dropping it unregisters lazily.
#[derive(Debug)]
pub struct Subscription {
    uri: ResourceUri,
    rx: Receiver<ResourceUri>,
}

impl Subscription {
    /// The URI this subscription watches
    pub fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    /// Next pending change, if any
    pub fn try_recv(&self) -> Option<ResourceUri> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next change
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ResourceUri> {
        match self.rx.recv_timeout(timeout) {
            Ok(uri) => Some(uri),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// All pending changes
    pub fn drain(&self) -> Vec<ResourceUri> {
        self.rx.try_iter().collect()
    }

    /// Whether any change arrived since the last call. Consumes the pending events.
    pub fn take_changed(&self) -> bool {
        !self.drain().is_empty()
    }
}
