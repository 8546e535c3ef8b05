//! Datenmodell des Providers

use crate::engine::{DtmfSender, SessionId};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;

// ============================================================================
// ENUMS
// ============================================================================

/// Verbindungs- und Registrierungsstatus des User Agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Registered,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Configuration,
    /// Für Transportfehler der Engine reserviert
    Connection,
    Registration,
}

/// Status des (einzigen) Anrufs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CallState {
    #[default]
    Idle,
    Starting,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

// ============================================================================
// SESSION
// ============================================================================

/// DTMF-Fähigkeit der aktiven Media-Verbindung
///
/// Zwei Handles sind gleich, wenn sie auf denselben Sender zeigen.
#[derive(Debug, Clone)]
pub struct DtmfHandle(Arc<dyn DtmfSender>);

impl DtmfHandle {
    pub fn new(sender: Arc<dyn DtmfSender>) -> Self {
        Self(sender)
    }

    pub fn sender(&self) -> &Arc<dyn DtmfSender> {
        &self.0
    }
}

impl PartialEq for DtmfHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Beschreibung einer neuen Session, wie sie der Adapter normalisiert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub direction: CallDirection,
    /// Adresse der Gegenseite ohne URI-Parameter
    pub counterpart: String,
    pub on_hold: bool,
    pub microphone_muted: bool,
    pub started_at: DateTime<Utc>,
}

/// Der aktuelle Anruf
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub direction: CallDirection,
    pub counterpart: String,
    pub on_hold: bool,
    pub microphone_muted: bool,
    #[serde(rename = "dtmfAvailable", serialize_with = "serialize_dtmf")]
    pub dtmf: Option<DtmfHandle>,
    pub started_at: DateTime<Utc>,
}

fn serialize_dtmf<S: Serializer>(dtmf: &Option<DtmfHandle>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_bool(dtmf.is_some())
}

impl From<SessionInfo> for Session {
    fn from(info: SessionInfo) -> Self {
        Self {
            id: info.id,
            direction: info.direction,
            counterpart: info.counterpart,
            on_hold: info.on_hold,
            microphone_muted: info.microphone_muted,
            dtmf: None,
            started_at: info.started_at,
        }
    }
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Gesamtzustand, den das Frontend sieht
///
/// `session` ist genau dann gesetzt, wenn `call != CallState::Idle`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub connection: ConnectionState,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub call: CallState,
    pub session: Option<Session>,
}

impl ApplicationState {
    pub fn is_registered(&self) -> bool {
        self.connection == ConnectionState::Registered
    }

    pub fn has_call(&self) -> bool {
        self.call != CallState::Idle
    }

    pub(crate) fn clear_error(&mut self) {
        self.error_kind = None;
        self.error_message = None;
    }

    pub(crate) fn set_error(&mut self, kind: ErrorKind, message: &str) {
        self.connection = ConnectionState::Error;
        self.error_kind = Some(kind);
        self.error_message = Some(message.to_string());
    }

    pub(crate) fn clear_call(&mut self) {
        self.call = CallState::Idle;
        self.session = None;
    }
}
