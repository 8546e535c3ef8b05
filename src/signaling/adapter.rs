//! Signaling Adapter
//!
//! Erzeugt genau einen User Agent pro Provider und übersetzt dessen
//! Events in [`SipEvent`]s:
//! - Verbindungs- und Registrierungsstatus
//! - Neue Sessions (Richtung, Gegenstelle, Hold/Mute-Status)
//! - Session-Events (Media, Accepted, Failed/Ended, Hold, Mute)

use super::events::SipEvent;
use crate::config::{ConfigurationError, ProviderConfig};
use crate::engine::{
    EngineEvent, EngineEventSink, Originator, SessionEvent, UserAgent, UserAgentFactory,
    UserAgentParams,
};
use crate::state::{CallDirection, SessionInfo};
use chrono::Utc;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("User agent already started")]
    AlreadyStarted,
}

// ============================================================================
// COUNTERPART
// ============================================================================

/// Schneidet URI-Parameter ab (alles ab dem ersten `;`)
///
/// Ohne Trenner oder bei leerem Präfix bleibt die Adresse unverändert.
pub fn normalize_counterpart(raw: &str) -> String {
    match raw.find(';') {
        Some(position) if position > 0 => raw[..position].to_string(),
        _ => raw.to_string(),
    }
}

// ============================================================================
// SIGNALING ADAPTER
// ============================================================================

pub struct SignalingAdapter {
    factory: Arc<dyn UserAgentFactory>,
    user_agent: OnceCell<Arc<dyn UserAgent>>,
}

impl SignalingAdapter {
    pub fn new(factory: Arc<dyn UserAgentFactory>) -> Self {
        Self {
            factory,
            user_agent: OnceCell::new(),
        }
    }

    /// Erzeugt und startet den User Agent
    ///
    /// Events der Engine landen im übergebenen `sink`. Ein zweiter Aufruf
    /// schlägt mit [`AdapterError::AlreadyStarted`] fehl.
    pub fn connect(
        &self,
        config: &ProviderConfig,
        sink: EngineEventSink,
    ) -> Result<Arc<dyn UserAgent>, AdapterError> {
        if self.user_agent.get().is_some() {
            return Err(AdapterError::AlreadyStarted);
        }

        config.validate()?;
        let params = UserAgentParams {
            uri: config.sip_uri(),
            password: config.password.clone(),
            socket_url: config.socket_url()?,
            register: config.auto_register,
            register_extra_headers: config.extra_headers.register.clone(),
            session_timers_expires: config.session_timers_expires,
        };

        tracing::info!(
            "Creating user agent {} via {}",
            params.uri,
            params.socket_url
        );

        let user_agent = self
            .factory
            .create(params)
            .map_err(|e| ConfigurationError::Engine(e.to_string()))?;

        self.user_agent
            .set(Arc::clone(&user_agent))
            .map_err(|_| AdapterError::AlreadyStarted)?;

        user_agent.start(sink);
        Ok(user_agent)
    }

    /// Der User Agent, falls `connect` erfolgreich war
    pub fn user_agent(&self) -> Option<Arc<dyn UserAgent>> {
        self.user_agent.get().cloned()
    }

    /// Stoppt den User Agent (Verbindung und Registrierung)
    pub fn disconnect(&self) {
        if let Some(user_agent) = self.user_agent.get() {
            tracing::info!("Stopping user agent");
            user_agent.stop();
        }
    }

    /// Übersetzt ein rohes Engine-Event
    ///
    /// `None` für Events ohne Bedeutung für den Provider.
    pub fn normalize(&self, event: EngineEvent) -> Option<SipEvent> {
        let event = match event {
            EngineEvent::Connecting => SipEvent::Connecting,
            EngineEvent::Connected => SipEvent::Connected,
            EngineEvent::Disconnected => SipEvent::Disconnected,
            EngineEvent::Registered => SipEvent::Registered,

            EngineEvent::Unregistered => SipEvent::Unregistered {
                transport_connected: self
                    .user_agent
                    .get()
                    .is_some_and(|user_agent| user_agent.is_connected()),
            },

            EngineEvent::RegistrationFailed(failure) => SipEvent::RegistrationFailed {
                message: failure
                    .cause
                    .filter(|cause| !cause.is_empty())
                    .or(failure.reason_phrase)
                    .unwrap_or_else(|| "Registration failed".to_string()),
            },

            EngineEvent::NewSession {
                originator,
                session,
                request,
            } => {
                let (direction, address) = match originator {
                    Originator::Local => (CallDirection::Outgoing, request.to),
                    Originator::Remote => (CallDirection::Incoming, request.from),
                    Originator::System => {
                        tracing::debug!("Ignoring system session {}", session.id());
                        return None;
                    }
                };

                let info = SessionInfo {
                    id: session.id(),
                    direction,
                    counterpart: normalize_counterpart(&address),
                    on_hold: session.is_on_hold().local,
                    microphone_muted: session.is_muted().audio,
                    started_at: Utc::now(),
                };
                SipEvent::NewSession { info, session }
            }

            EngineEvent::Session { id, event } => match event {
                SessionEvent::PeerConnection(peer_connection) => SipEvent::SessionMediaAttached {
                    id,
                    stream: peer_connection.remote_streams().into_iter().next(),
                    renegotiation: false,
                },
                SessionEvent::StreamAdded(stream) => SipEvent::SessionMediaAttached {
                    id,
                    stream: Some(stream),
                    renegotiation: true,
                },
                SessionEvent::Accepted => SipEvent::SessionAccepted { id, dtmf: None },
                SessionEvent::Failed { cause } => SipEvent::SessionFailed { id, cause },
                SessionEvent::Ended { cause } => SipEvent::SessionEnded { id, cause },
                // Nur lokales Halten zählt als "on hold"
                SessionEvent::Hold {
                    originator: Originator::Local,
                } => SipEvent::SessionHoldChanged { id, on_hold: true },
                SessionEvent::Unhold {
                    originator: Originator::Local,
                } => SipEvent::SessionHoldChanged { id, on_hold: false },
                SessionEvent::Hold { .. } | SessionEvent::Unhold { .. } => return None,
                SessionEvent::Muted => SipEvent::SessionMuteChanged { id, muted: true },
                SessionEvent::Unmuted => SipEvent::SessionMuteChanged { id, muted: false },
            },
        };

        Some(event)
    }
}

impl fmt::Debug for SignalingAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalingAdapter")
            .field("user_agent", &self.user_agent.get())
            .finish()
    }
}
