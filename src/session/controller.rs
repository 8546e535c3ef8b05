//! Session Controller
//!
//! Läuft für jedes Event vor dem Reducer. Führt die Seiteneffekte aus und
//! entscheidet, ob das Event den Zustand überhaupt erreicht (eine zweite
//! Session wird hier abgewiesen).

use super::commands::{normalize_dtmf_digit, Command, CommandError};
use crate::config::ProviderConfig;
use crate::engine::{
    AnswerOptions, CallOptions, DtmfSender, HoldOptions, RtcSession, SessionId, TerminateOptions,
    UserAgent,
};
use crate::media::{media_device_exists, AudioSinkBinding, DeviceKind, MediaDevices};
use crate::signaling::SipEvent;
use crate::state::{ApplicationState, CallDirection, CallState, DtmfHandle};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Die Session, die der Controller gerade besitzt
struct ActiveSession {
    handle: Arc<dyn RtcSession>,
    direction: CallDirection,
    dtmf: Option<Arc<dyn DtmfSender>>,
}

impl ActiveSession {
    fn id(&self) -> SessionId {
        self.handle.id()
    }
}

pub struct SessionController {
    config: Arc<ProviderConfig>,
    devices: Arc<dyn MediaDevices>,
    sink: Arc<AudioSinkBinding>,
    active: Mutex<Option<ActiveSession>>,
    /// Ein `PlaceCall` wartet gerade auf die Geräteabfrage
    placing: AtomicBool,
}

/// Hält das `placing` Flag bis zum Ende eines `PlaceCall`
struct PlacingCall<'a>(&'a AtomicBool);

impl<'a> PlacingCall<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PlacingCall<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionController {
    pub fn new(
        config: Arc<ProviderConfig>,
        devices: Arc<dyn MediaDevices>,
        sink: Arc<AudioSinkBinding>,
    ) -> Self {
        Self {
            config,
            devices,
            sink,
            active: Mutex::new(None),
            placing: AtomicBool::new(false),
        }
    }

    pub fn sink(&self) -> &Arc<AudioSinkBinding> {
        &self.sink
    }

    /// ID der Session, die der Controller gerade hält
    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active.lock().as_ref().map(ActiveSession::id)
    }

    /// Führt die Seiteneffekte eines Events aus
    ///
    /// Gibt das Event (ggf. angereichert) für den Reducer zurück, oder
    /// `None`, wenn es den Zustand nicht erreichen darf.
    pub fn handle(&self, event: SipEvent) -> Option<SipEvent> {
        match event {
            SipEvent::NewSession { info, session } => {
                {
                    let mut active = self.active.lock();
                    if let Some(current) = active.as_ref() {
                        tracing::info!(
                            "Rejecting session {} from {}: busy with {}",
                            info.id,
                            info.counterpart,
                            current.id()
                        );
                        if let Err(e) = session.terminate(TerminateOptions::busy()) {
                            tracing::warn!("Failed to reject session {}: {}", info.id, e);
                        }
                        return None;
                    }

                    tracing::info!(
                        "New {:?} session {} with {}",
                        info.direction,
                        info.id,
                        info.counterpart
                    );
                    *active = Some(ActiveSession {
                        handle: Arc::clone(&session),
                        direction: info.direction,
                        dtmf: None,
                    });
                }

                if info.direction == CallDirection::Incoming && self.config.auto_answer {
                    self.spawn_auto_answer(Arc::clone(&session));
                }

                Some(SipEvent::NewSession { info, session })
            }

            SipEvent::SessionMediaAttached {
                id,
                stream,
                renegotiation,
            } => {
                if self.is_active(&id) {
                    self.sink.attach_stream(stream.clone(), renegotiation);
                }
                Some(SipEvent::SessionMediaAttached {
                    id,
                    stream,
                    renegotiation,
                })
            }

            SipEvent::SessionAccepted { id, dtmf } => {
                let mut active = self.active.lock();
                match active.as_mut().filter(|session| session.id() == id) {
                    Some(session) => {
                        let sender = session
                            .handle
                            .senders()
                            .into_iter()
                            .find_map(|sender| sender.dtmf());
                        session.dtmf = sender.clone();
                        tracing::info!(
                            "Session {} accepted (dtmf: {})",
                            id,
                            sender.is_some()
                        );
                        Some(SipEvent::SessionAccepted {
                            id,
                            dtmf: sender.map(DtmfHandle::new).or(dtmf),
                        })
                    }
                    None => Some(SipEvent::SessionAccepted { id, dtmf }),
                }
            }

            SipEvent::SessionFailed { id, cause } => {
                tracing::info!("Session {} failed: {:?}", id, cause);
                self.finish(&id);
                Some(SipEvent::SessionFailed { id, cause })
            }

            SipEvent::SessionEnded { id, cause } => {
                tracing::info!("Session {} ended: {:?}", id, cause);
                self.finish(&id);
                Some(SipEvent::SessionEnded { id, cause })
            }

            SipEvent::Unregistered {
                transport_connected,
            } => {
                // Der Zustand verwirft die Session, die Engine muss sie also auch beenden
                self.terminate_active();
                Some(SipEvent::Unregistered {
                    transport_connected,
                })
            }

            other => Some(other),
        }
    }

    /// Bindet die Remote-Ausgabe an das gewünschte Gerät (Fehler werden geschluckt)
    pub async fn bind_output_device(&self, device_id: &str) {
        self.sink
            .bind_preferred(self.devices.as_ref(), device_id)
            .await;
    }

    /// Führt einen Frontend-Befehl aus
    pub async fn execute(
        &self,
        command: Command,
        state: &ApplicationState,
        user_agent: Option<Arc<dyn UserAgent>>,
    ) -> Result<(), CommandError> {
        tracing::debug!("Executing command {:?}", command);

        match command {
            Command::PlaceCall { target } => {
                let user_agent = user_agent.ok_or(CommandError::NotConnected)?;
                if !state.is_registered() {
                    return Err(CommandError::NotRegistered);
                }
                if state.has_call() || self.active.lock().is_some() {
                    return Err(CommandError::AlreadyInCall);
                }
                let _placing =
                    PlacingCall::claim(&self.placing).ok_or(CommandError::AlreadyInCall)?;
                let target = target.trim();
                if target.is_empty() {
                    return Err(CommandError::InvalidTarget(target.to_string()));
                }

                let options = self.call_options().await;
                tracing::info!("Calling {}", target);
                user_agent.call(target, options)?;
            }

            Command::Answer => {
                if state.call != CallState::Starting {
                    return Err(CommandError::NoIncomingCall);
                }
                let session = self
                    .active_handle(Some(CallDirection::Incoming))
                    .ok_or(CommandError::NoIncomingCall)?;

                let options = answer_options(&self.config, self.devices.as_ref()).await;
                session.answer(options)?;
            }

            Command::Terminate => {
                self.require_session()?.terminate(TerminateOptions::default())?;
            }

            Command::Hold => {
                self.require_session()?.hold(self.hold_options())?;
            }

            Command::Unhold => {
                self.require_session()?.unhold(self.hold_options())?;
            }

            Command::Mute => self.require_session()?.mute(),

            Command::Unmute => self.require_session()?.unmute(),

            Command::SendDtmf { digit } => {
                let digit = normalize_dtmf_digit(digit)?;
                let dtmf = {
                    let active = self.active.lock();
                    let session = active.as_ref().ok_or(CommandError::NoActiveCall)?;
                    session.dtmf.clone().ok_or(CommandError::DtmfUnavailable)?
                };
                dtmf.insert_dtmf(&digit.to_string())?;
            }

            Command::Register => {
                user_agent.ok_or(CommandError::NotConnected)?.register()?;
            }

            Command::Unregister => {
                user_agent.ok_or(CommandError::NotConnected)?.unregister()?;
            }

            Command::SetOutputDevice { device_id } => {
                self.bind_output_device(&device_id).await;
            }
        }

        Ok(())
    }

    // ========================================================================
    // PRIVATE METHODS
    // ========================================================================

    fn is_active(&self, id: &SessionId) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|session| &session.id() == id)
    }

    fn active_handle(&self, direction: Option<CallDirection>) -> Option<Arc<dyn RtcSession>> {
        self.active
            .lock()
            .as_ref()
            .filter(|session| direction.map_or(true, |d| d == session.direction))
            .map(|session| Arc::clone(&session.handle))
    }

    fn require_session(&self) -> Result<Arc<dyn RtcSession>, CommandError> {
        self.active_handle(None).ok_or(CommandError::NoActiveCall)
    }

    /// Beendet die Session `id`, falls sie die aktive ist
    ///
    /// Läuft pro Session höchstens einmal, da die Session dabei entnommen wird.
    fn finish(&self, id: &SessionId) {
        let released = {
            let mut active = self.active.lock();
            if active.as_ref().is_some_and(|session| &session.id() == id) {
                active.take()
            } else {
                None
            }
        };

        if let Some(session) = released {
            self.release(session);
        }
    }

    /// Beendet die aktive Session in der Engine und gibt sie frei
    ///
    /// Für Abmelden und Shutdown, wo kein `ended` Event mehr verarbeitet wird.
    pub fn terminate_active(&self) {
        let released = self.active.lock().take();
        if let Some(session) = released {
            tracing::info!("Terminating session {}", session.id());
            if let Err(e) = session.handle.terminate(TerminateOptions::default()) {
                tracing::warn!("Failed to terminate session {}: {}", session.id(), e);
            }
            self.release(session);
        }
    }

    /// Gibt Mikrofon und Ausgabe einer Session frei
    fn release(&self, session: ActiveSession) {
        // Offene Sender halten das Mikrofon (und Headsets im Headset-Modus)
        let mut stopped = 0;
        for sender in session.handle.senders() {
            if let Some(track) = sender.track() {
                tracing::debug!("Stopping {} track of session {}", track.kind(), session.id());
                track.stop();
                stopped += 1;
            }
        }
        self.sink.detach();
        tracing::debug!("Released session {} ({} tracks stopped)", session.id(), stopped);
    }

    fn hold_options(&self) -> HoldOptions {
        HoldOptions {
            extra_headers: self.config.extra_headers.hold.clone(),
        }
    }

    async fn call_options(&self) -> CallOptions {
        CallOptions {
            extra_headers: self.config.extra_headers.invite.clone(),
            ice_servers: self.config.ice_servers.clone(),
            ice_restart: self.config.ice_restart,
            session_timers_expires: self.config.session_timers_expires,
            audio_input_device: input_device(&self.config, self.devices.as_ref()).await,
        }
    }

    fn spawn_auto_answer(&self, session: Arc<dyn RtcSession>) {
        let config = Arc::clone(&self.config);
        let devices = Arc::clone(&self.devices);

        tokio::spawn(async move {
            let options = answer_options(&config, devices.as_ref()).await;
            tracing::info!("Auto-answering session {}", session.id());
            if let Err(e) = session.answer(options) {
                tracing::error!("Auto-answer failed: {}", e);
            }
        });
    }
}

/// Konfiguriertes Mikrofon, falls es existiert
async fn input_device(config: &ProviderConfig, devices: &dyn MediaDevices) -> Option<String> {
    let desired = &config.inbound_audio_device_id;
    if desired.is_empty() {
        return None;
    }

    match media_device_exists(devices, desired, DeviceKind::AudioInput).await {
        Ok(true) => Some(desired.clone()),
        Ok(false) => {
            tracing::debug!("Input device {} not found, using default", desired);
            None
        }
        Err(e) => {
            tracing::warn!("{}, using default input", e);
            None
        }
    }
}

async fn answer_options(config: &ProviderConfig, devices: &dyn MediaDevices) -> AnswerOptions {
    AnswerOptions {
        ice_servers: config.ice_servers.clone(),
        ice_restart: config.ice_restart,
        session_timers_expires: config.session_timers_expires,
        audio_input_device: input_device(config, devices).await,
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("active_session", &self.active_session_id())
            .field("sink", &self.sink)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MediaStream, RtcSession};
    use crate::state::SessionInfo;
    use crate::testing::{FakeDevices, FakeOutput, FakeSession, FakeStream, FakeUserAgent};
    use chrono::Utc;
    use std::sync::atomic::Ordering;

    struct Fixture {
        controller: SessionController,
        output: Arc<FakeOutput>,
    }

    fn fixture(config: ProviderConfig) -> Fixture {
        let output = Arc::new(FakeOutput::default());
        let devices = Arc::new(FakeDevices::with_devices(&[
            ("usb-mic", DeviceKind::AudioInput),
            ("speaker", DeviceKind::AudioOutput),
        ]));
        let sink = Arc::new(AudioSinkBinding::new(output.clone()));
        Fixture {
            controller: SessionController::new(Arc::new(config), devices, sink),
            output,
        }
    }

    fn new_session(session: &Arc<FakeSession>, direction: CallDirection) -> SipEvent {
        let handle: Arc<dyn RtcSession> = session.clone();
        SipEvent::NewSession {
            info: SessionInfo {
                id: handle.id(),
                direction,
                counterpart: "sip:bob@example.com".to_string(),
                on_hold: false,
                microphone_muted: false,
                started_at: Utc::now(),
            },
            session: handle,
        }
    }

    fn registered_state() -> ApplicationState {
        ApplicationState {
            connection: crate::state::ConnectionState::Registered,
            ..Default::default()
        }
    }

    #[test]
    fn test_second_session_is_rejected_busy() {
        let f = fixture(ProviderConfig::default());
        let first = FakeSession::new("first");
        let second = FakeSession::new("second");

        assert!(f
            .controller
            .handle(new_session(&first, CallDirection::Outgoing))
            .is_some());
        assert!(f
            .controller
            .handle(new_session(&second, CallDirection::Incoming))
            .is_none());

        assert_eq!(*second.terminations.lock(), vec![TerminateOptions::busy()]);
        assert!(first.terminations.lock().is_empty());
        assert_eq!(
            f.controller.active_session_id(),
            Some(SessionId::from("first"))
        );
    }

    #[test]
    fn test_cleanup_runs_once() {
        let f = fixture(ProviderConfig::default());
        let session = FakeSession::new("s");
        f.controller
            .handle(new_session(&session, CallDirection::Incoming));

        let id = SessionId::from("s");
        f.controller.handle(SipEvent::SessionFailed {
            id: id.clone(),
            cause: None,
        });
        f.controller.handle(SipEvent::SessionEnded { id, cause: None });

        assert_eq!(session.track.stops.load(Ordering::SeqCst), 1);
        assert_eq!(f.controller.active_session_id(), None);
        assert_eq!(*f.output.attached.lock(), vec![None]);
    }

    #[test]
    fn test_rejected_session_end_does_not_touch_active() {
        let f = fixture(ProviderConfig::default());
        let first = FakeSession::new("first");
        let second = FakeSession::new("second");
        f.controller
            .handle(new_session(&first, CallDirection::Outgoing));
        f.controller
            .handle(new_session(&second, CallDirection::Incoming));

        f.controller.handle(SipEvent::SessionFailed {
            id: SessionId::from("second"),
            cause: Some("Busy".to_string()),
        });

        assert_eq!(first.track.stops.load(Ordering::SeqCst), 0);
        assert_eq!(
            f.controller.active_session_id(),
            Some(SessionId::from("first"))
        );
    }

    #[test]
    fn test_accepted_captures_dtmf() {
        let f = fixture(ProviderConfig::default());
        let session = FakeSession::new("s");
        f.controller
            .handle(new_session(&session, CallDirection::Outgoing));

        let event = f.controller.handle(SipEvent::SessionAccepted {
            id: SessionId::from("s"),
            dtmf: None,
        });
        match event {
            Some(SipEvent::SessionAccepted { dtmf: Some(handle), .. }) => {
                let expected: Arc<dyn DtmfSender> = session.dtmf.clone();
                assert!(Arc::ptr_eq(handle.sender(), &expected));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_media_attached_binds_stream() {
        let f = fixture(ProviderConfig::default());
        let session = FakeSession::new("s");
        f.controller
            .handle(new_session(&session, CallDirection::Outgoing));

        let id = SessionId::from("s");
        let first: Arc<dyn MediaStream> = Arc::new(FakeStream::new("r1"));
        let second: Arc<dyn MediaStream> = Arc::new(FakeStream::new("r2"));
        f.controller.handle(SipEvent::SessionMediaAttached {
            id: id.clone(),
            stream: Some(first),
            renegotiation: false,
        });
        f.controller.handle(SipEvent::SessionMediaAttached {
            id: id.clone(),
            stream: Some(second),
            renegotiation: true,
        });
        // Fremde Session: ignoriert
        f.controller.handle(SipEvent::SessionMediaAttached {
            id: SessionId::from("other"),
            stream: Some(Arc::new(FakeStream::new("x"))),
            renegotiation: true,
        });

        assert_eq!(
            *f.output.attached.lock(),
            vec![Some("r1".to_string()), Some("r2".to_string())]
        );
        assert_eq!(f.output.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auto_answer_incoming() {
        let f = fixture(ProviderConfig {
            auto_answer: true,
            inbound_audio_device_id: "usb-mic".to_string(),
            ..Default::default()
        });
        let session = FakeSession::new("s");
        f.controller
            .handle(new_session(&session, CallDirection::Incoming));

        for _ in 0..50 {
            if !session.answers.lock().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let answers = session.answers.lock();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].audio_input_device.as_deref(), Some("usb-mic"));
    }

    #[tokio::test]
    async fn test_place_call_preconditions() {
        let f = fixture(ProviderConfig {
            extra_headers: crate::config::ExtraHeaders {
                invite: vec!["X-App: test".to_string()],
                ..Default::default()
            },
            inbound_audio_device_id: "missing-mic".to_string(),
            ..Default::default()
        });
        let agent = Arc::new(FakeUserAgent::default());
        let ua: Arc<dyn UserAgent> = agent.clone();
        let place = |target: &str| Command::PlaceCall {
            target: target.to_string(),
        };

        assert_eq!(
            f.controller
                .execute(place("sip:bob@x"), &registered_state(), None)
                .await,
            Err(CommandError::NotConnected)
        );
        assert_eq!(
            f.controller
                .execute(place("sip:bob@x"), &ApplicationState::default(), Some(ua.clone()))
                .await,
            Err(CommandError::NotRegistered)
        );
        assert!(matches!(
            f.controller
                .execute(place("  "), &registered_state(), Some(ua.clone()))
                .await,
            Err(CommandError::InvalidTarget(_))
        ));

        f.controller
            .execute(place("sip:bob@x"), &registered_state(), Some(ua.clone()))
            .await
            .unwrap();
        let calls = agent.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "sip:bob@x");
        assert_eq!(calls[0].1.extra_headers, vec!["X-App: test".to_string()]);
        assert_eq!(calls[0].1.audio_input_device, None);
    }

    #[tokio::test]
    async fn test_unregistered_terminates_active_session() {
        let f = fixture(ProviderConfig::default());
        let live = FakeSession::new("live");
        f.controller
            .handle(new_session(&live, CallDirection::Outgoing));

        assert!(f
            .controller
            .handle(SipEvent::Unregistered {
                transport_connected: true
            })
            .is_some());

        assert_eq!(*live.terminations.lock(), vec![TerminateOptions::default()]);
        assert_eq!(live.track.stops.load(Ordering::SeqCst), 1);
        assert_eq!(f.controller.active_session_id(), None);

        // Das spätere `ended` der Engine räumt nicht ein zweites Mal auf
        f.controller.handle(SipEvent::SessionEnded {
            id: SessionId::from("live"),
            cause: None,
        });
        assert_eq!(live.track.stops.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.controller
                .execute(Command::Terminate, &registered_state(), None)
                .await,
            Err(CommandError::NoActiveCall)
        );
        assert_eq!(live.terminations.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_place_call() {
        let f = fixture(ProviderConfig {
            inbound_audio_device_id: "usb-mic".to_string(),
            ..Default::default()
        });
        let agent = Arc::new(FakeUserAgent::default());
        let ua: Arc<dyn UserAgent> = agent.clone();
        let state = registered_state();
        let place = |target: &str| Command::PlaceCall {
            target: target.to_string(),
        };

        let (first, second) = tokio::join!(
            f.controller
                .execute(place("sip:bob@x"), &state, Some(ua.clone())),
            f.controller
                .execute(place("sip:carol@x"), &state, Some(ua.clone())),
        );

        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(CommandError::AlreadyInCall));
        assert_eq!(agent.calls.lock().len(), 1);

        // Nach dem Aufruf ist das Flag wieder frei
        f.controller
            .execute(place("sip:dave@x"), &state, Some(ua))
            .await
            .unwrap();
        assert_eq!(agent.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_place_call_while_busy() {
        let f = fixture(ProviderConfig::default());
        let session = FakeSession::new("s");
        f.controller
            .handle(new_session(&session, CallDirection::Outgoing));
        let ua: Arc<dyn UserAgent> = Arc::new(FakeUserAgent::default());

        assert_eq!(
            f.controller
                .execute(
                    Command::PlaceCall {
                        target: "sip:carol@x".to_string()
                    },
                    &registered_state(),
                    Some(ua)
                )
                .await,
            Err(CommandError::AlreadyInCall)
        );
    }

    #[tokio::test]
    async fn test_answer_only_incoming() {
        let f = fixture(ProviderConfig::default());
        let outgoing = FakeSession::new("out");
        f.controller
            .handle(new_session(&outgoing, CallDirection::Outgoing));
        let starting = ApplicationState {
            call: CallState::Starting,
            ..registered_state()
        };

        assert_eq!(
            f.controller.execute(Command::Answer, &starting, None).await,
            Err(CommandError::NoIncomingCall)
        );
        assert!(outgoing.answers.lock().is_empty());

        let f = fixture(ProviderConfig::default());
        let incoming = FakeSession::new("in");
        f.controller
            .handle(new_session(&incoming, CallDirection::Incoming));
        f.controller
            .execute(Command::Answer, &starting, None)
            .await
            .unwrap();
        assert_eq!(incoming.answers.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_session_commands() {
        let f = fixture(ProviderConfig {
            extra_headers: crate::config::ExtraHeaders {
                hold: vec!["X-Hold: 1".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        let state = registered_state();

        assert_eq!(
            f.controller.execute(Command::Hold, &state, None).await,
            Err(CommandError::NoActiveCall)
        );

        let session = FakeSession::new("s");
        f.controller
            .handle(new_session(&session, CallDirection::Outgoing));

        for command in [
            Command::Hold,
            Command::Unhold,
            Command::Mute,
            Command::Unmute,
            Command::Terminate,
        ] {
            f.controller.execute(command, &state, None).await.unwrap();
        }

        assert_eq!(*session.holds.lock(), vec![vec!["X-Hold: 1".to_string()]]);
        assert_eq!(*session.unholds.lock(), vec![vec!["X-Hold: 1".to_string()]]);
        assert_eq!(session.mutes.load(Ordering::SeqCst), 1);
        assert_eq!(session.unmutes.load(Ordering::SeqCst), 1);
        assert_eq!(
            *session.terminations.lock(),
            vec![TerminateOptions::default()]
        );
    }

    #[tokio::test]
    async fn test_send_dtmf() {
        let f = fixture(ProviderConfig::default());
        let state = registered_state();
        let session = FakeSession::new("s");
        f.controller
            .handle(new_session(&session, CallDirection::Outgoing));

        assert_eq!(
            f.controller
                .execute(Command::SendDtmf { digit: '1' }, &state, None)
                .await,
            Err(CommandError::DtmfUnavailable)
        );

        f.controller.handle(SipEvent::SessionAccepted {
            id: SessionId::from("s"),
            dtmf: None,
        });
        f.controller
            .execute(Command::SendDtmf { digit: '#' }, &state, None)
            .await
            .unwrap();
        assert_eq!(
            f.controller
                .execute(Command::SendDtmf { digit: 'z' }, &state, None)
                .await,
            Err(CommandError::InvalidDtmfDigit('Z'))
        );

        assert_eq!(*session.dtmf.tones.lock(), vec!["#".to_string()]);
    }

    #[tokio::test]
    async fn test_register_requires_user_agent() {
        let f = fixture(ProviderConfig::default());
        let state = ApplicationState::default();
        assert_eq!(
            f.controller.execute(Command::Register, &state, None).await,
            Err(CommandError::NotConnected)
        );

        let agent = Arc::new(FakeUserAgent::default());
        f.controller
            .execute(Command::Unregister, &state, Some(agent.clone()))
            .await
            .unwrap();
        assert_eq!(agent.unregisters.load(Ordering::SeqCst), 1);
    }
}
