//! Media Module - Audio-Geräte und Ausgabe
//!
//! Dieses Modul verwaltet:
//! - Abfrage der verfügbaren Ein-/Ausgabegeräte
//! - Die gemeinsame Remote-Audio-Ausgabe und ihre Geräte-Bindung
//!

mod devices;
mod sink;

#[cfg(feature = "native-audio")]
mod native;

pub use devices::{
    media_device_exists, resolve_device_id, DeviceError, DeviceKind, MediaDeviceInfo, MediaDevices,
    DEFAULT_DEVICE_ID,
};
pub use sink::{AudioOutput, AudioSinkBinding};

#[cfg(feature = "native-audio")]
pub use native::CpalDevices;
