//! Provider-Konfiguration
//!
//! Kann direkt gebaut oder aus JSON geladen werden (die Feldnamen sind
//! camelCase, damit ein Web-Frontend dieselbe Struktur schicken kann).

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid WebSocket URL: {0}")]
    InvalidSocketUrl(String),

    #[error("Invalid configuration JSON: {0}")]
    Json(String),

    #[error("Signaling engine rejected configuration: {0}")]
    Engine(String),
}

// ============================================================================
// TYPES
// ============================================================================

/// Zusätzliche SIP-Header pro Methode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraHeaders {
    pub register: Vec<String>,
    pub invite: Vec<String>,
    pub hold: Vec<String>,
}

/// STUN/TURN-Server für die Media-Aushandlung
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// Einzelne URL oder Liste
    #[serde(deserialize_with = "one_or_many")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
    })
}

/// Vollständige Konfiguration eines Providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    pub host: String,
    pub port: u16,
    pub pathname: String,
    pub secure: bool,
    pub user: String,
    pub password: String,
    pub auto_register: bool,
    pub auto_answer: bool,
    pub ice_restart: bool,
    pub session_timers_expires: u32,
    pub extra_headers: ExtraHeaders,
    pub ice_servers: Vec<IceServer>,
    pub debug: bool,
    pub debug_namespaces: Option<String>,
    pub inbound_audio_device_id: String,
    pub outbound_audio_device_id: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            pathname: String::new(),
            secure: false,
            user: String::new(),
            password: String::new(),
            auto_register: true,
            auto_answer: false,
            ice_restart: false,
            session_timers_expires: 600,
            extra_headers: ExtraHeaders::default(),
            ice_servers: Vec::new(),
            debug: false,
            debug_namespaces: None,
            inbound_audio_device_id: String::new(),
            outbound_audio_device_id: String::new(),
        }
    }
}

impl ProviderConfig {
    /// Lädt die Konfiguration aus einem JSON-String
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Json(e.to_string()))
    }

    /// Prüft die Pflichtfelder
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.host.trim().is_empty() {
            return Err(ConfigurationError::Missing("host"));
        }
        if self.user.trim().is_empty() {
            return Err(ConfigurationError::Missing("user"));
        }
        if self.port == 0 {
            return Err(ConfigurationError::InvalidPort(self.port));
        }
        Ok(())
    }

    /// SIP-URI des lokalen Benutzers (`sip:user@host`)
    pub fn sip_uri(&self) -> String {
        format!("sip:{}@{}", self.user, self.host)
    }

    /// WebSocket-URL des SIP-Servers
    ///
    /// `wss://` bei `secure`, sonst `ws://`. Der Pfad wird unverändert
    /// angehängt.
    pub fn socket_url(&self) -> Result<Url, ConfigurationError> {
        let scheme = if self.secure { "wss" } else { "ws" };
        let raw = format!("{}://{}:{}{}", scheme, self.host, self.port, self.pathname);
        Url::parse(&raw).map_err(|e| ConfigurationError::InvalidSocketUrl(format!("{raw}: {e}")))
    }
}
