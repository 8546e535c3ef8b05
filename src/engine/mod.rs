//! Engine Module - Schnittstelle zur SIP/WebRTC Signaling-Engine
//!
//! Die eigentliche Engine (Transport, SDP, ICE) ist ein externer Kollaborateur.
//! Dieses Modul beschreibt nur, was der Provider von ihr braucht:
//! - User Agent erzeugen, starten, stoppen, registrieren
//! - Sessions steuern (annehmen, beenden, halten, stumm schalten)
//! - Rohe Events über einen [`EngineEventSink`] zurückmelden
//!

mod events;
mod traits;

pub use events::{
    EngineEvent, EngineEventSink, Originator, RegistrationFailure, SessionEvent, SipRequestInfo,
};
pub use traits::{
    AnswerOptions, CallOptions, DtmfSender, EngineError, HoldOptions, HoldState, MediaSender,
    MediaStream, MediaTrack, MuteState, PeerConnection, RtcSession, SessionId, TerminateOptions,
    UserAgent, UserAgentFactory, UserAgentParams,
};
