//! SIP Provider - SIP-Registrierung und Anrufzustand für das Frontend
//!
//! Integrationsschicht zwischen einer SIP/WebRTC Signaling-Engine und der UI:
//! - User Agent über WebSocket verbinden und registrieren
//! - Registrierungs- und Anrufzustand aus Engine-Events ableiten
//! - Remote-Audio an das gewählte Ausgabegerät binden
//! - Zustand reaktiv an das Frontend weitergeben

pub mod config;
pub mod engine;
pub mod media;
pub mod provider;
pub mod session;
pub mod signaling;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{ConfigurationError, ProviderConfig};
pub use media::media_device_exists;
pub use provider::{ProviderError, ProviderRegistry, SipProvider, SipProviderBuilder};
pub use session::{Command, CommandError};
pub use state::{ApplicationState, CallState, ConnectionState, SubscriptionId};

use tracing_subscriber::filter::{Directive, EnvFilter};

// ============================================================================
// LOGGING
// ============================================================================

/// Installiert den globalen tracing Subscriber
///
/// Basis ist `RUST_LOG`. `debug` hebt das Level des Crates auf `debug`,
/// `debug_namespaces` (kommagetrennte Targets) schaltet weitere Targets frei.
/// Ist bereits ein Subscriber gesetzt, passiert nichts.
pub fn init_logging(config: &ProviderConfig) {
    let filter = config_directives(config)
        .into_iter()
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging already initialized");
    }
}

fn config_directives(config: &ProviderConfig) -> Vec<Directive> {
    let level = if config.debug { "debug" } else { "info" };
    let mut directives = vec![format!("sip_provider={}", level)];

    if let Some(namespaces) = &config.debug_namespaces {
        directives.extend(
            namespaces
                .split(',')
                .map(str::trim)
                .filter(|namespace| !namespace.is_empty())
                .map(|namespace| format!("{}=debug", namespace)),
        );
    }

    // Ungültige Targets werden übersprungen
    directives
        .into_iter()
        .filter_map(|directive| directive.parse().ok())
        .collect()
}
