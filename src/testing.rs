//! Test-Doubles für Engine, Geräte und Audio-Ausgabe

use crate::engine::{
    AnswerOptions, CallOptions, DtmfSender, EngineError, EngineEvent, EngineEventSink, HoldOptions,
    HoldState, MediaSender, MediaStream, MediaTrack, MuteState, PeerConnection, RtcSession,
    SessionId, TerminateOptions, UserAgent, UserAgentFactory, UserAgentParams,
};
use crate::media::{AudioOutput, DeviceError, DeviceKind, MediaDeviceInfo, MediaDevices};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// USER AGENT
// ============================================================================

#[derive(Debug, Default)]
pub struct FakeUserAgent {
    pub sink: Mutex<Option<EngineEventSink>>,
    pub connected: AtomicBool,
    pub calls: Mutex<Vec<(String, CallOptions)>>,
    pub registers: AtomicUsize,
    pub unregisters: AtomicUsize,
    pub stops: AtomicUsize,
}

impl FakeUserAgent {
    /// Spielt ein Engine-Event ein, als käme es vom Transport
    pub fn emit(&self, event: EngineEvent) -> bool {
        let sink = self.sink.lock().clone();
        sink.is_some_and(|sink| sink.emit(event))
    }
}

impl UserAgent for FakeUserAgent {
    fn start(&self, events: EngineEventSink) {
        *self.sink.lock() = Some(events);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn register(&self) -> Result<(), EngineError> {
        self.registers.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unregister(&self) -> Result<(), EngineError> {
        self.unregisters.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn call(&self, target: &str, options: CallOptions) -> Result<(), EngineError> {
        self.calls.lock().push((target.to_string(), options));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeUserAgentFactory {
    pub params: Mutex<Option<UserAgentParams>>,
    pub created: AtomicUsize,
    pub agent: Arc<FakeUserAgent>,
    error: Option<EngineError>,
}

impl FakeUserAgentFactory {
    pub fn failing(error: EngineError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

impl UserAgentFactory for FakeUserAgentFactory {
    fn create(&self, params: UserAgentParams) -> Result<Arc<dyn UserAgent>, EngineError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        *self.params.lock() = Some(params);
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.agent.clone())
    }
}

// ============================================================================
// SESSION & MEDIA
// ============================================================================

#[derive(Debug, Default)]
pub struct FakeTrack {
    pub stops: AtomicUsize,
}

impl MediaTrack for FakeTrack {
    fn kind(&self) -> String {
        "audio".to_string()
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct FakeDtmf {
    pub tones: Mutex<Vec<String>>,
}

impl DtmfSender for FakeDtmf {
    fn insert_dtmf(&self, tones: &str) -> Result<(), EngineError> {
        self.tones.lock().push(tones.to_string());
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeSender {
    track: Arc<FakeTrack>,
    dtmf: Arc<FakeDtmf>,
}

impl MediaSender for FakeSender {
    fn track(&self) -> Option<Arc<dyn MediaTrack>> {
        Some(self.track.clone())
    }

    fn dtmf(&self) -> Option<Arc<dyn DtmfSender>> {
        Some(self.dtmf.clone())
    }
}

/// Session mit genau einem Audio-Sender
#[derive(Debug)]
pub struct FakeSession {
    id: SessionId,
    hold: HoldState,
    mute: MuteState,
    pub track: Arc<FakeTrack>,
    pub dtmf: Arc<FakeDtmf>,
    pub answers: Mutex<Vec<AnswerOptions>>,
    pub terminations: Mutex<Vec<TerminateOptions>>,
    pub holds: Mutex<Vec<Vec<String>>>,
    pub unholds: Mutex<Vec<Vec<String>>>,
    pub mutes: AtomicUsize,
    pub unmutes: AtomicUsize,
}

impl FakeSession {
    pub fn new(id: &str) -> Arc<Self> {
        Self::with_state(id, HoldState::default(), MuteState::default())
    }

    pub fn with_state(id: &str, hold: HoldState, mute: MuteState) -> Arc<Self> {
        Arc::new(Self {
            id: SessionId::from(id),
            hold,
            mute,
            track: Arc::new(FakeTrack::default()),
            dtmf: Arc::new(FakeDtmf::default()),
            answers: Mutex::new(Vec::new()),
            terminations: Mutex::new(Vec::new()),
            holds: Mutex::new(Vec::new()),
            unholds: Mutex::new(Vec::new()),
            mutes: AtomicUsize::new(0),
            unmutes: AtomicUsize::new(0),
        })
    }
}

impl RtcSession for FakeSession {
    fn id(&self) -> SessionId {
        self.id.clone()
    }

    fn is_on_hold(&self) -> HoldState {
        self.hold
    }

    fn is_muted(&self) -> MuteState {
        self.mute
    }

    fn senders(&self) -> Vec<Arc<dyn MediaSender>> {
        vec![Arc::new(FakeSender {
            track: self.track.clone(),
            dtmf: self.dtmf.clone(),
        })]
    }

    fn answer(&self, options: AnswerOptions) -> Result<(), EngineError> {
        self.answers.lock().push(options);
        Ok(())
    }

    fn terminate(&self, options: TerminateOptions) -> Result<(), EngineError> {
        self.terminations.lock().push(options);
        Ok(())
    }

    fn hold(&self, options: HoldOptions) -> Result<(), EngineError> {
        self.holds.lock().push(options.extra_headers);
        Ok(())
    }

    fn unhold(&self, options: HoldOptions) -> Result<(), EngineError> {
        self.unholds.lock().push(options.extra_headers);
        Ok(())
    }

    fn mute(&self) {
        self.mutes.fetch_add(1, Ordering::SeqCst);
    }

    fn unmute(&self) {
        self.unmutes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct FakeStream {
    id: String,
}

impl FakeStream {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl MediaStream for FakeStream {
    fn id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Default)]
pub struct FakePeerConnection {
    streams: Vec<Arc<dyn MediaStream>>,
}

impl FakePeerConnection {
    pub fn with_stream(id: &str) -> Self {
        Self {
            streams: vec![Arc::new(FakeStream::new(id))],
        }
    }
}

impl PeerConnection for FakePeerConnection {
    fn remote_streams(&self) -> Vec<Arc<dyn MediaStream>> {
        self.streams.clone()
    }
}

// ============================================================================
// DEVICES & OUTPUT
// ============================================================================

#[derive(Debug, Default)]
pub struct FakeDevices {
    devices: Vec<MediaDeviceInfo>,
    fail: bool,
}

impl FakeDevices {
    pub fn with_devices(devices: &[(&str, DeviceKind)]) -> Self {
        Self {
            devices: devices
                .iter()
                .map(|(id, kind)| MediaDeviceInfo {
                    device_id: id.to_string(),
                    kind: *kind,
                    label: id.to_string(),
                })
                .collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            devices: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl MediaDevices for FakeDevices {
    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, DeviceError> {
        // Wie die Plattform: die Abfrage gibt den Executor kurz frei
        tokio::task::yield_now().await;
        if self.fail {
            return Err(DeviceError::Enumeration("permission denied".to_string()));
        }
        Ok(self.devices.clone())
    }
}

#[derive(Debug, Default)]
pub struct FakeOutput {
    pub sink_ids: Mutex<Vec<String>>,
    /// Stream-IDs in Reihenfolge, `None` für Trennen
    pub attached: Mutex<Vec<Option<String>>>,
    pub plays: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl AudioOutput for FakeOutput {
    fn attach(&self, stream: Option<Arc<dyn MediaStream>>) {
        self.attached.lock().push(stream.map(|s| s.id()));
    }

    fn play(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }

    async fn set_sink_id(&self, sink_id: &str) -> Result<(), DeviceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeviceError::SinkBinding {
                sink_id: sink_id.to_string(),
                message: "device busy".to_string(),
            });
        }
        self.sink_ids.lock().push(sink_id.to_string());
        Ok(())
    }
}
