//! Rohe Engine-Events
//!
//! Die Engine meldet alles über einen [`EngineEventSink`]. Der Sink ist das
//! Ende einer Single-Consumer-Queue, die der Provider in Ankunftsreihenfolge
//! abarbeitet.

use super::traits::{MediaStream, PeerConnection, RtcSession, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wer eine Session erzeugt hat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Originator {
    Local,
    Remote,
    System,
}

/// Adressen aus dem initialen INVITE
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SipRequestInfo {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFailure {
    pub cause: Option<String>,
    /// Reason-Phrase der SIP-Antwort, falls eine kam
    pub reason_phrase: Option<String>,
}

/// Events einer einzelnen Session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Peer Connection wurde angelegt
    PeerConnection(Arc<dyn PeerConnection>),

    /// Neuer Remote-Stream (Renegotiation)
    StreamAdded(Arc<dyn MediaStream>),

    Accepted,

    Failed { cause: Option<String> },

    Ended { cause: Option<String> },

    Hold { originator: Originator },

    Unhold { originator: Originator },

    Muted,

    Unmuted,
}

/// Events des User Agents
#[derive(Debug, Clone)]
pub enum EngineEvent {
    Connecting,

    Connected,

    Disconnected,

    Registered,

    Unregistered,

    RegistrationFailed(RegistrationFailure),

    /// Neue ein- oder ausgehende Session
    NewSession {
        originator: Originator,
        session: Arc<dyn RtcSession>,
        request: SipRequestInfo,
    },

    /// Event einer bereits gemeldeten Session
    Session { id: SessionId, event: SessionEvent },
}

/// Callback-Handle, über das die Engine Events einreiht
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineEventSink {
    pub fn new(tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { tx }
    }

    /// Reiht ein Event ein. `false`, wenn der Provider schon beendet ist.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn emit_session(&self, id: SessionId, event: SessionEvent) -> bool {
        self.emit(EngineEvent::Session { id, event })
    }
}
