//! Reiner Zustandsübergang `(state, event) -> state`
//!
//! Kein I/O, keine Uhr. Seiteneffekte (Busy-Ablehnung, Tracks stoppen,
//! Audio-Ausgabe) macht der Session-Controller vor dem Dispatch.

use super::model::{ApplicationState, CallState, ConnectionState, ErrorKind, Session};
use crate::signaling::SipEvent;

/// Berechnet den Folgezustand für ein normalisiertes Event
pub fn reduce(state: &ApplicationState, event: &SipEvent) -> ApplicationState {
    let mut next = state.clone();

    match event {
        SipEvent::Connecting => {
            next.connection = ConnectionState::Connecting;
            next.clear_error();
        }

        SipEvent::Connected => {
            next.connection = ConnectionState::Connected;
            next.clear_error();
        }

        SipEvent::Disconnected => {
            next.connection = ConnectionState::Disconnected;
            next.clear_error();
        }

        SipEvent::Registered => {
            next.connection = ConnectionState::Registered;
            next.clear_error();
            // Eine laufende Session überlebt eine erneute Registrierung
            if next.session.is_none() {
                next.call = CallState::Idle;
            }
        }

        SipEvent::Unregistered {
            transport_connected,
        } => {
            next.connection = if *transport_connected {
                ConnectionState::Connected
            } else {
                ConnectionState::Disconnected
            };
            next.clear_call();
        }

        SipEvent::RegistrationFailed { message } => {
            next.set_error(ErrorKind::Registration, message);
        }

        SipEvent::ConfigurationFailed { message } => {
            next.set_error(ErrorKind::Configuration, message);
        }

        SipEvent::NewSession { info, .. } => {
            // Erste Session gewinnt
            if next.session.is_none() {
                next.session = Some(Session::from(info.clone()));
                next.call = CallState::Starting;
            }
        }

        SipEvent::SessionAccepted { id, dtmf } => {
            if let Some(session) = next.session.as_mut().filter(|s| &s.id == id) {
                next.call = CallState::Active;
                if dtmf.is_some() {
                    session.dtmf = dtmf.clone();
                }
            }
        }

        SipEvent::SessionFailed { id, .. } | SipEvent::SessionEnded { id, .. } => {
            if next.session.as_ref().is_some_and(|s| &s.id == id) {
                next.clear_call();
            }
        }

        SipEvent::SessionHoldChanged { id, on_hold } => {
            if let Some(session) = next.session.as_mut().filter(|s| &s.id == id) {
                session.on_hold = *on_hold;
            }
        }

        SipEvent::SessionMuteChanged { id, muted } => {
            if let Some(session) = next.session.as_mut().filter(|s| &s.id == id) {
                session.microphone_muted = *muted;
            }
        }

        SipEvent::SessionMediaAttached { .. } => {}
    }

    next
}
