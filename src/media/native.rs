//! Native Geräteabfrage über cpal
//!
//! cpal kennt keine stabilen Geräte-IDs, daher dient der Gerätename als ID.
//! Die Standardgeräte erscheinen zusätzlich unter [`DEFAULT_DEVICE_ID`].

use super::devices::{DeviceError, DeviceKind, MediaDeviceInfo, MediaDevices, DEFAULT_DEVICE_ID};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait};

#[derive(Debug, Clone, Copy, Default)]
pub struct CpalDevices;

impl CpalDevices {
    fn enumerate() -> Result<Vec<MediaDeviceInfo>, DeviceError> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Some(name) = host.default_input_device().and_then(|d| d.name().ok()) {
            devices.push(MediaDeviceInfo {
                device_id: DEFAULT_DEVICE_ID.to_string(),
                kind: DeviceKind::AudioInput,
                label: name,
            });
        }
        if let Some(name) = host.default_output_device().and_then(|d| d.name().ok()) {
            devices.push(MediaDeviceInfo {
                device_id: DEFAULT_DEVICE_ID.to_string(),
                kind: DeviceKind::AudioOutput,
                label: name,
            });
        }

        let inputs = host
            .input_devices()
            .map_err(|e| DeviceError::Enumeration(e.to_string()))?;
        devices.extend(inputs.filter_map(|d| d.name().ok()).map(|name| MediaDeviceInfo {
            device_id: name.clone(),
            kind: DeviceKind::AudioInput,
            label: name,
        }));

        let outputs = host
            .output_devices()
            .map_err(|e| DeviceError::Enumeration(e.to_string()))?;
        devices.extend(outputs.filter_map(|d| d.name().ok()).map(|name| MediaDeviceInfo {
            device_id: name.clone(),
            kind: DeviceKind::AudioOutput,
            label: name,
        }));

        Ok(devices)
    }
}

#[async_trait]
impl MediaDevices for CpalDevices {
    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, DeviceError> {
        // cpal blockiert je nach Backend (ALSA, WASAPI)
        tokio::task::spawn_blocking(Self::enumerate)
            .await
            .map_err(|e| DeviceError::Enumeration(e.to_string()))?
    }
}
