//! Kollaborateur-Traits der Signaling-Engine
//!
//! Die Engine liefert Handles (User Agent, Sessions, Tracks) als
//! `Arc<dyn ...>`. Alle Aufrufe sind synchron und kehren sofort zurück;
//! Ergebnisse kommen als Events über den [`super::EngineEventSink`].

use super::events::EngineEventSink;
use crate::config::IceServer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid user agent parameters: {0}")]
    InvalidParameters(String),

    #[error("Operation not allowed in current session state: {0}")]
    InvalidState(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

// ============================================================================
// IDENTIFIERS & OPTIONS
// ============================================================================

/// Opaquer Session-Handle der Engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Parameter zum Erzeugen eines User Agents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentParams {
    /// `sip:user@host`
    pub uri: String,
    pub password: String,
    /// `ws://` oder `wss://` Endpunkt des SIP-Servers
    pub socket_url: Url,
    /// Nach dem Verbinden automatisch registrieren
    pub register: bool,
    pub register_extra_headers: Vec<String>,
    pub session_timers_expires: u32,
}

/// Optionen für einen ausgehenden Anruf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub extra_headers: Vec<String>,
    pub ice_servers: Vec<IceServer>,
    pub ice_restart: bool,
    pub session_timers_expires: u32,
    /// `None` = Standard-Mikrofon der Plattform
    pub audio_input_device: Option<String>,
}

/// Optionen zum Annehmen eines eingehenden Anrufs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerOptions {
    pub ice_servers: Vec<IceServer>,
    pub ice_restart: bool,
    pub session_timers_expires: u32,
    pub audio_input_device: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldOptions {
    pub extra_headers: Vec<String>,
}

/// Beenden einer Session, optional mit SIP-Status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminateOptions {
    pub status_code: Option<u16>,
    pub reason_phrase: Option<String>,
}

impl TerminateOptions {
    /// 486 Busy Here
    pub fn busy() -> Self {
        Self {
            status_code: Some(486),
            reason_phrase: Some("Busy Here".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldState {
    pub local: bool,
    pub remote: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MuteState {
    pub audio: bool,
    pub video: bool,
}

// ============================================================================
// ENGINE TRAITS
// ============================================================================

/// Erzeugt User Agents (genau einer pro Provider)
pub trait UserAgentFactory: Send + Sync {
    fn create(&self, params: UserAgentParams) -> Result<Arc<dyn UserAgent>, EngineError>;
}

pub trait UserAgent: Send + Sync + fmt::Debug {
    /// Baut die Transportverbindung auf. Alle weiteren Events gehen an `events`.
    fn start(&self, events: EngineEventSink);

    fn stop(&self);

    fn is_connected(&self) -> bool;

    fn register(&self) -> Result<(), EngineError>;

    fn unregister(&self) -> Result<(), EngineError>;

    /// Startet einen Anruf. Die Session kommt als `NewSession` Event zurück.
    fn call(&self, target: &str, options: CallOptions) -> Result<(), EngineError>;
}

pub trait RtcSession: Send + Sync + fmt::Debug {
    fn id(&self) -> SessionId;

    fn is_on_hold(&self) -> HoldState;

    fn is_muted(&self) -> MuteState;

    /// Lokale Sender der Peer Connection (leer, solange keine existiert)
    fn senders(&self) -> Vec<Arc<dyn MediaSender>>;

    fn answer(&self, options: AnswerOptions) -> Result<(), EngineError>;

    fn terminate(&self, options: TerminateOptions) -> Result<(), EngineError>;

    fn hold(&self, options: HoldOptions) -> Result<(), EngineError>;

    fn unhold(&self, options: HoldOptions) -> Result<(), EngineError>;

    fn mute(&self);

    fn unmute(&self);
}

pub trait PeerConnection: Send + Sync + fmt::Debug {
    fn remote_streams(&self) -> Vec<Arc<dyn MediaStream>>;
}

pub trait MediaStream: Send + Sync + fmt::Debug {
    fn id(&self) -> String;
}

pub trait MediaSender: Send + Sync + fmt::Debug {
    fn track(&self) -> Option<Arc<dyn MediaTrack>>;

    fn dtmf(&self) -> Option<Arc<dyn DtmfSender>>;
}

pub trait MediaTrack: Send + Sync + fmt::Debug {
    fn kind(&self) -> String;

    /// Gibt das Gerät frei. Mehrfaches Stoppen ist erlaubt.
    fn stop(&self);
}

pub trait DtmfSender: Send + Sync + fmt::Debug {
    fn insert_dtmf(&self, tones: &str) -> Result<(), EngineError>;
}
