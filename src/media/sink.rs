//! Remote-Audio-Ausgabe und Geräte-Bindung
//!
//! Es gibt genau eine Ausgabe pro Provider. Nur der Session-Controller
//! ändert Stream und Gerät.

use super::devices::{resolve_device_id, DeviceError, DeviceKind, MediaDevices};
use crate::engine::MediaStream;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Plattform-Ausgabe für das Remote-Audio (autoplay)
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Setzt die Quelle. `None` trennt den aktuellen Stream.
    fn attach(&self, stream: Option<Arc<dyn MediaStream>>);

    fn play(&self);

    async fn set_sink_id(&self, sink_id: &str) -> Result<(), DeviceError>;
}

// ============================================================================
// AUDIO SINK BINDING
// ============================================================================

/// Bindet die Ausgabe an ein Gerät, ohne doppelte Plattform-Aufrufe
pub struct AudioSinkBinding {
    output: Arc<dyn AudioOutput>,
    current_sink_id: Mutex<Option<String>>,
}

impl AudioSinkBinding {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            current_sink_id: Mutex::new(None),
        }
    }

    pub fn current_sink_id(&self) -> Option<String> {
        self.current_sink_id.lock().clone()
    }

    /// Bindet an `sink_id`. `Ok(false)`, wenn bereits gebunden.
    ///
    /// Das Ziel wird vor dem Plattform-Aufruf gemerkt, damit ein paralleler
    /// Aufruf mit demselben Ziel nichts tut. Schlägt die Bindung fehl, wird
    /// das vorherige Ziel wiederhergestellt.
    pub async fn bind(&self, sink_id: &str) -> Result<bool, DeviceError> {
        let previous = {
            let mut current = self.current_sink_id.lock();
            if current.as_deref() == Some(sink_id) {
                return Ok(false);
            }
            current.replace(sink_id.to_string())
        };

        if let Err(e) = self.output.set_sink_id(sink_id).await {
            let mut current = self.current_sink_id.lock();
            if current.as_deref() == Some(sink_id) {
                *current = previous;
            }
            return Err(e);
        }

        tracing::info!("Audio output bound to {}", sink_id);
        Ok(true)
    }

    /// Bindet an das gewünschte Gerät oder das Standardgerät
    ///
    /// Fehler werden nur geloggt, das Audio läuft dann über das bisherige
    /// Gerät weiter.
    pub async fn bind_preferred(&self, devices: &dyn MediaDevices, desired: &str) {
        let sink_id = resolve_device_id(devices, desired, DeviceKind::AudioOutput).await;
        if let Err(e) = self.bind(&sink_id).await {
            tracing::warn!("{}", e);
        }
    }

    /// Hängt einen Remote-Stream an; `play` startet die Wiedergabe explizit
    pub fn attach_stream(&self, stream: Option<Arc<dyn MediaStream>>, play: bool) {
        if let Some(stream) = &stream {
            tracing::debug!("Attaching remote stream {}", stream.id());
        }
        self.output.attach(stream);
        if play {
            self.output.play();
        }
    }

    pub fn detach(&self) {
        self.output.attach(None);
    }
}

impl fmt::Debug for AudioSinkBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSinkBinding")
            .field("current_sink_id", &*self.current_sink_id.lock())
            .finish()
    }
}
