//! SIP Provider - verbindet Engine, Session Controller und State Store
//!
//! Der Provider besitzt die einzige Event-Queue. Ein Task arbeitet sie in
//! Ankunftsreihenfolge ab: Adapter (normalisieren), Controller
//! (Seiteneffekte, Busy-Veto), dann Reducer und Benachrichtigung.
//! Pro Prozess darf nur ein Provider laufen.

use crate::config::ProviderConfig;
use crate::engine::{EngineEvent, EngineEventSink, UserAgentFactory};
use crate::media::{AudioOutput, AudioSinkBinding, MediaDevices};
use crate::session::{Command, CommandError, SessionController};
use crate::signaling::{SignalingAdapter, SipEvent};
use crate::state::{ApplicationState, StateStore, SubscriptionId};
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("A SIP provider is already running in this process")]
    DuplicateProvider,

    #[error("SIP provider must be started inside a tokio runtime")]
    NoRuntime,
}

// ============================================================================
// PROVIDER REGISTRY
// ============================================================================

/// Prozessweiter Singleton für die Registry
static GLOBAL_REGISTRY: Lazy<Arc<ProviderRegistry>> =
    Lazy::new(|| Arc::new(ProviderRegistry::new()));

/// Stellt sicher, dass höchstens ein Provider gleichzeitig läuft
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    claimed: AtomicBool,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Die prozessweite Registry
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    /// Belegt die Registry. Der Guard gibt sie beim Drop wieder frei.
    pub fn claim(self: &Arc<Self>) -> Result<ProviderGuard, ProviderError> {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ProviderError::DuplicateProvider)?;

        Ok(ProviderGuard {
            registry: Arc::clone(self),
        })
    }
}

#[derive(Debug)]
pub struct ProviderGuard {
    registry: Arc<ProviderRegistry>,
}

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        self.registry.claimed.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// PROVIDER
// ============================================================================

/// Gemeinsamer Zustand von Provider und Event-Task
struct ProviderInner {
    config: Arc<ProviderConfig>,
    adapter: SignalingAdapter,
    controller: SessionController,
    store: StateStore,
}

impl ProviderInner {
    /// Verarbeitet ein Engine-Event vollständig, bevor das nächste gelesen wird
    fn process(&self, event: EngineEvent) {
        let Some(event) = self.adapter.normalize(event) else {
            return;
        };
        tracing::debug!(session = ?event.session_id(), "SIP event: {:?}", event);

        if let Some(event) = self.controller.handle(event) {
            self.store.dispatch(&event);
        }
    }
}

pub struct SipProviderBuilder {
    config: ProviderConfig,
    factory: Arc<dyn UserAgentFactory>,
    devices: Arc<dyn MediaDevices>,
    output: Arc<dyn AudioOutput>,
    registry: Option<Arc<ProviderRegistry>>,
}

impl SipProviderBuilder {
    /// Eigene Registry statt der prozessweiten (z.B. für Tests)
    pub fn registry(mut self, registry: Arc<ProviderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Startet den Provider auf der aktuellen tokio Runtime
    ///
    /// Konfigurationsfehler beenden den Start nicht, sie landen als
    /// `ConnectionState::Error` im Zustand.
    pub fn start(self) -> Result<SipProvider, ProviderError> {
        let registry = self.registry.unwrap_or_else(ProviderRegistry::global);
        let guard = registry.claim()?;
        let runtime = Handle::try_current().map_err(|_| ProviderError::NoRuntime)?;

        tracing::info!("Starting SIP provider for {}", self.config.sip_uri());

        let config = Arc::new(self.config);
        let sink = Arc::new(AudioSinkBinding::new(self.output));
        let inner = Arc::new(ProviderInner {
            config: Arc::clone(&config),
            adapter: SignalingAdapter::new(self.factory),
            controller: SessionController::new(Arc::clone(&config), self.devices, sink),
            store: StateStore::new(),
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Err(e) = inner.adapter.connect(&config, EngineEventSink::new(tx)) {
            tracing::error!("Failed to create user agent: {}", e);
            inner.store.dispatch(&SipEvent::ConfigurationFailed {
                message: e.to_string(),
            });
        }

        // Initiale Bindung der Ausgabe, läuft neben der Event-Verarbeitung
        let binder = Arc::clone(&inner);
        runtime.spawn(async move {
            let device_id = binder.config.outbound_audio_device_id.clone();
            binder.controller.bind_output_device(&device_id).await;
        });

        let worker = Arc::clone(&inner);
        let task = runtime.spawn(async move {
            while let Some(event) = rx.recv().await {
                worker.process(event);
            }
            tracing::debug!("Engine event queue closed");
        });

        Ok(SipProvider {
            inner,
            task,
            stopped: AtomicBool::new(false),
            _guard: guard,
        })
    }
}

pub struct SipProvider {
    inner: Arc<ProviderInner>,
    task: JoinHandle<()>,
    stopped: AtomicBool,
    _guard: ProviderGuard,
}

impl SipProvider {
    pub fn builder(
        config: ProviderConfig,
        factory: Arc<dyn UserAgentFactory>,
        devices: Arc<dyn MediaDevices>,
        output: Arc<dyn AudioOutput>,
    ) -> SipProviderBuilder {
        SipProviderBuilder {
            config,
            factory,
            devices,
            output,
            registry: None,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.inner.config
    }

    /// Aktueller Zustand (Snapshot)
    pub fn state(&self) -> ApplicationState {
        self.inner.store.state()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ApplicationState) + Send + Sync + 'static,
    {
        self.inner.store.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.store.unsubscribe(id)
    }

    pub fn changes(&self) -> broadcast::Receiver<ApplicationState> {
        self.inner.store.changes()
    }

    /// Aktuell gebundenes Ausgabegerät
    pub fn output_device_id(&self) -> Option<String> {
        self.inner.controller.sink().current_sink_id()
    }

    /// Führt einen Befehl gegen den aktuellen Zustand aus
    pub async fn execute(&self, command: Command) -> Result<(), CommandError> {
        let state = self.state();
        let user_agent = self.inner.adapter.user_agent();
        self.inner
            .controller
            .execute(command, &state, user_agent)
            .await
    }

    /// Stoppt User Agent und Event-Verarbeitung. Mehrfache Aufrufe sind erlaubt.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!("Shutting down SIP provider");
        // Laufender Anruf: Mikrofon freigeben, bevor der User Agent stoppt
        self.inner.controller.terminate_active();
        self.inner.adapter.disconnect();
        self.task.abort();
    }
}

impl Drop for SipProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for SipProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SipProvider")
            .field("adapter", &self.inner.adapter)
            .field("controller", &self.inner.controller)
            .field("stopped", &self.stopped.load(Ordering::SeqCst))
            .finish()
    }
}
