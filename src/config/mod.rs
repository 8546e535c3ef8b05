//! Config Module - Verbindungsparameter
//!
//! Statische Konfiguration des Providers:
//! - SIP-Server (Host, Port, Pfad, TLS)
//! - Zugangsdaten und Registrierungsverhalten
//! - ICE-Server, Extra-Header, Audio-Geräte
//!

mod provider_config;

pub use provider_config::{ConfigurationError, ExtraHeaders, IceServer, ProviderConfig};
