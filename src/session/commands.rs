//! Befehle aus dem Frontend

use crate::engine::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("User agent not started")]
    NotConnected,

    #[error("Not registered with SIP server")]
    NotRegistered,

    #[error("Already in a call")]
    AlreadyInCall,

    #[error("Invalid call target: {0:?}")]
    InvalidTarget(String),

    #[error("No incoming call to answer")]
    NoIncomingCall,

    #[error("No active call")]
    NoActiveCall,

    #[error("DTMF not available for this call")]
    DtmfUnavailable,

    #[error("Invalid DTMF digit: {0:?}")]
    InvalidDtmfDigit(char),

    #[error("Signaling engine error: {0}")]
    Engine(#[from] EngineError),
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Befehle, die das Frontend an den Provider schickt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    PlaceCall { target: String },
    Answer,
    Terminate,
    Hold,
    Unhold,
    Mute,
    Unmute,
    SendDtmf { digit: char },
    Register,
    Unregister,
    /// Remote-Audio auf ein anderes Ausgabegerät legen
    SetOutputDevice { device_id: String },
}

/// Normalisiert eine DTMF-Ziffer (`0-9`, `*`, `#`, `A-D`)
pub(crate) fn normalize_dtmf_digit(digit: char) -> Result<char, CommandError> {
    let digit = digit.to_ascii_uppercase();
    match digit {
        '0'..='9' | '*' | '#' | 'A'..='D' => Ok(digit),
        _ => Err(CommandError::InvalidDtmfDigit(digit)),
    }
}
