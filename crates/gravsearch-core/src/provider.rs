//! Access to the current ontology snapshot.
//!
//! A compilation takes one `Arc<OntologySnapshot>` at the start and keeps it
//! until it finishes. Replacing the snapshot swaps the pointer; holders of
//! the old one are unaffected.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::OntologySnapshot;

/// Callback invoked after the snapshot is replaced.
pub type ChangeListener = Box<dyn Fn(&Arc<OntologySnapshot>) + Send + Sync>;

/// Pull/subscribe interface to the ontology subsystem.
pub trait OntologyProvider {
    fn current(&self) -> Arc<OntologySnapshot>;
    fn on_change(&self, listener: ChangeListener);
}

impl<T: OntologyProvider + ?Sized> OntologyProvider for &T {
    fn current(&self) -> Arc<OntologySnapshot> {
        (*self).current()
    }
    fn on_change(&self, listener: ChangeListener) {
        (*self).on_change(listener)
    }
}

impl<T: OntologyProvider + ?Sized> OntologyProvider for Arc<T> {
    fn current(&self) -> Arc<OntologySnapshot> {
        (**self).current()
    }
    fn on_change(&self, listener: ChangeListener) {
        (**self).on_change(listener)
    }
}

type SharedListener = Arc<dyn Fn(&Arc<OntologySnapshot>) + Send + Sync>;

/// In-process provider holding the latest snapshot.
///
/// Listeners run after the lock on the listener list is released, so they may
/// register further listeners or read the snapshot.
pub struct SharedOntology {
    snapshot: RwLock<Arc<OntologySnapshot>>,
    listeners: Mutex<Vec<SharedListener>>,
}

impl SharedOntology {
    pub fn new(snapshot: OntologySnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Install a new snapshot and notify listeners. Returns the previous one.
    pub fn replace(&self, snapshot: OntologySnapshot) -> Arc<OntologySnapshot> {
        let next = Arc::new(snapshot);
        let previous = std::mem::replace(&mut *self.snapshot.write(), Arc::clone(&next));

        let listeners = self.listeners.lock().clone();
        tracing::debug!(listeners = listeners.len(), "ontology snapshot replaced");
        for listener in &listeners {
            listener(&next);
        }

        previous
    }
}

impl OntologyProvider for SharedOntology {
    fn current(&self) -> Arc<OntologySnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    fn on_change(&self, listener: ChangeListener) {
        self.listeners.lock().push(Arc::from(listener));
    }
}

impl std::fmt::Debug for SharedOntology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOntology")
            .field("listeners", &self.listeners.lock().len())
            .finish_non_exhaustive()
    }
}
