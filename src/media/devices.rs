//! Geräteabfrage

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geräte-ID der Plattform-Standardgeräte
pub const DEFAULT_DEVICE_ID: &str = "default";

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Failed to enumerate media devices: {0}")]
    Enumeration(String),

    #[error("Failed to bind audio output to {sink_id}: {message}")]
    SinkBinding { sink_id: String, message: String },
}

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    AudioOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    pub label: String,
}

/// Plattform-Abfrage der Mediengeräte
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, DeviceError>;
}

// ============================================================================
// HELPERS
// ============================================================================

/// Prüft, ob ein Gerät mit `device_id` und `kind` existiert
pub async fn media_device_exists(
    devices: &dyn MediaDevices,
    device_id: &str,
    kind: DeviceKind,
) -> Result<bool, DeviceError> {
    let found = devices
        .enumerate_devices()
        .await?
        .iter()
        .any(|device| device.kind == kind && device.device_id == device_id);
    Ok(found)
}

/// Liefert `desired`, wenn das Gerät existiert, sonst [`DEFAULT_DEVICE_ID`]
///
/// Fehler bei der Abfrage führen ebenfalls zum Standardgerät.
pub async fn resolve_device_id(devices: &dyn MediaDevices, desired: &str, kind: DeviceKind) -> String {
    if desired.is_empty() {
        return DEFAULT_DEVICE_ID.to_string();
    }

    match media_device_exists(devices, desired, kind).await {
        Ok(true) => desired.to_string(),
        Ok(false) => {
            tracing::debug!("Device {} ({:?}) not found, using default", desired, kind);
            DEFAULT_DEVICE_ID.to_string()
        }
        Err(e) => {
            tracing::warn!("{}, using default device", e);
            DEFAULT_DEVICE_ID.to_string()
        }
    }
}
