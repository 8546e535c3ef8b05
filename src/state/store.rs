//! State Store - hält den [`ApplicationState`] und benachrichtigt Abonnenten
//!
//! Dispatches laufen serialisiert: Reducer, Speichern und Benachrichtigen
//! passieren unter einem Dispatch-Lock. Abonnenten sehen jeden Zustand
//! vollständig und in Dispatch-Reihenfolge.

use super::model::ApplicationState;
use super::reducer::reduce;
use crate::signaling::SipEvent;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

type Listener = Arc<dyn Fn(&ApplicationState) + Send + Sync>;

/// Handle zum Abmelden eines Listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

pub struct StateStore {
    state: RwLock<ApplicationState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    dispatch_lock: Mutex<()>,
    changes_tx: broadcast::Sender<ApplicationState>,
}

impl StateStore {
    pub fn new() -> Self {
        let (changes_tx, _) = broadcast::channel(100);

        Self {
            state: RwLock::new(ApplicationState::default()),
            listeners: Mutex::new(Vec::new()),
            dispatch_lock: Mutex::new(()),
            changes_tx,
        }
    }

    /// Aktueller Zustand (Snapshot)
    pub fn state(&self) -> ApplicationState {
        self.state.read().clone()
    }

    /// Registriert einen Listener, der nach jeder Änderung aufgerufen wird
    ///
    /// Listener dürfen selbst nicht `dispatch` aufrufen.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ApplicationState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.listeners.lock().push((id, Arc::new(listener)));
        tracing::debug!("State listener {} subscribed", id);
        id
    }

    /// Entfernt einen Listener. `false`, wenn er nicht (mehr) registriert war.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        before != listeners.len()
    }

    /// Receiver für Zustandsänderungen (für async Konsumenten)
    pub fn changes(&self) -> broadcast::Receiver<ApplicationState> {
        self.changes_tx.subscribe()
    }

    /// Wendet ein Event an. Gibt zurück, ob sich der Zustand geändert hat.
    pub fn dispatch(&self, event: &SipEvent) -> bool {
        let _dispatch = self.dispatch_lock.lock();

        let next = {
            let current = self.state.read();
            let next = reduce(&current, event);
            if next == *current {
                return false;
            }
            next
        };

        tracing::debug!(
            "State: connection={:?} call={:?} error={:?}",
            next.connection,
            next.call,
            next.error_kind
        );
        *self.state.write() = next.clone();

        // Liste kopieren, damit Listener (un)subscribe aufrufen können
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next);
        }

        let _ = self.changes_tx.send(next);
        true
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &*self.state.read())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}
