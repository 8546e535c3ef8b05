//! Signaling Module - Adapter zur SIP/WebRTC Engine
//!
//! Dieses Modul verwaltet:
//! - Erzeugen und Starten des (einzigen) User Agents
//! - Übersetzen der rohen Engine-Events in [`SipEvent`]s
//! - Normalisieren der Gegenstellen-Adresse
//!

mod adapter;
mod events;

pub use adapter::{normalize_counterpart, AdapterError, SignalingAdapter};
pub use events::SipEvent;
