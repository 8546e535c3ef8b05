//! Normalisierte Signaling-Events
//!
//! Eingabe für Session-Controller und Reducer. Handles (Session, Stream)
//! werden nur vom Controller benutzt; der Reducer liest die Datenfelder.

use crate::engine::{MediaStream, RtcSession, SessionId};
use crate::state::{DtmfHandle, SessionInfo};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum SipEvent {
    Connecting,

    Connected,

    Disconnected,

    Registered,

    /// `transport_connected`: Transport stand beim Abmelden noch
    Unregistered { transport_connected: bool },

    RegistrationFailed { message: String },

    /// User Agent konnte nicht erzeugt werden
    ConfigurationFailed { message: String },

    NewSession {
        info: SessionInfo,
        session: Arc<dyn RtcSession>,
    },

    /// `dtmf` setzt der Controller, wenn die Media-Verbindung DTMF kann
    SessionAccepted {
        id: SessionId,
        dtmf: Option<DtmfHandle>,
    },

    /// Remote-Media liegt an (`renegotiation` bei nachträglichem Stream)
    SessionMediaAttached {
        id: SessionId,
        stream: Option<Arc<dyn MediaStream>>,
        renegotiation: bool,
    },

    SessionFailed {
        id: SessionId,
        cause: Option<String>,
    },

    SessionEnded {
        id: SessionId,
        cause: Option<String>,
    },

    SessionHoldChanged { id: SessionId, on_hold: bool },

    SessionMuteChanged { id: SessionId, muted: bool },
}

impl SipEvent {
    /// Session, auf die sich das Event bezieht
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            SipEvent::NewSession { info, .. } => Some(&info.id),
            SipEvent::SessionAccepted { id, .. }
            | SipEvent::SessionMediaAttached { id, .. }
            | SipEvent::SessionFailed { id, .. }
            | SipEvent::SessionEnded { id, .. }
            | SipEvent::SessionHoldChanged { id, .. }
            | SipEvent::SessionMuteChanged { id, .. } => Some(id),
            _ => None,
        }
    }
}
