//! Session Module - Seiteneffekte der Anrufsteuerung
//!
//! Dieses Modul verwaltet:
//! - Ablehnen paralleler Sessions (486 Busy Here)
//! - Remote-Audio an die Ausgabe hängen
//! - Mikrofon-Tracks beim Anrufende freigeben
//! - DTMF-Fähigkeit und Auto-Answer
//! - Befehle aus dem Frontend (Anrufen, Annehmen, Halten, ...)
//!

mod commands;
mod controller;

pub use commands::{Command, CommandError};
pub use controller::SessionController;
