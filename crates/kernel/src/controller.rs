//! The Run Controller: owns the single active Run,
//! drives one loop turn end-to-end against every perception/decision/action
//! crate, and fans out the operator event stream.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, info_span, warn, Instrument};

use action_primitives::{plan_scroll, Point};
use agent_core::{DecideContext, DecisionEngine, PageContext};
use cdp_adapter::{BrowserDriver, CdpConfig, PageId};
#[cfg(feature = "chromiumoxide")]
use cdp_adapter::ChromiumDriver;
use cdp_adapter::{DriverPoint, MockDriver, ViewportSize};
use l6_timeline::{RunMetadata, SaveToggles, Timeline};
use speech_gate::{await_outcome, watchdog_for, SpeechGate};
use wayfarer_event_bus::{AgentEvent, AgentEventBus, EventBus};
use wayfarer_scheduler::{
    CancelToken, LoopBody, StopReason, SuspensionPoint, TurnOutcome, ERROR_BACKOFF, HYDRATION_WAIT,
    NAVIGATION_CEILING,
};
use wayfarer_state_center::{FailedTargetLedger, HistoryLedger};
use wayfarer_core_types::{
    slugify_persona, ActionKind, AgentError, ContextOptions, ErrorRecord, Persona, Run, RunId,
    RunOptions, RunStatus, ScreenshotRecord, StepRecord, ThoughtRecord, TraceStep, TraceStepKind,
    VoiceConfig, HISTORY_RETAIN,
};

use crate::artifacts::{ensure_run_dir, save_step_screenshot};
use crate::config::Config;
use crate::drivers::PageDrivers;
use crate::errors::KernelError;
use crate::llm::DynLlmProvider;
use crate::tts::{NullTtsSynthesizer, TtsSynthesizer};

/// Explicit `wait` action duration: a fixed 2000 ms pause.
const WAIT_ACTION: Duration = Duration::from_millis(2_000);

/// Inbound request for `RunController::begin` (`POST /start`).
#[derive(Clone, Debug)]
pub struct StartRequest {
    pub target_url: String,
    pub persona_name: String,
    pub mission: String,
    pub debug_marks: bool,
    pub model_id: String,
    pub voice_tts: bool,
    pub headless: bool,
    pub save_trace: bool,
    pub save_thoughts: bool,
    pub save_screenshots: bool,
    pub monkey_mode: bool,
    pub bare_mode: bool,
}

/// What `begin` hands back once a Run is underway.
#[derive(Clone, Debug)]
pub struct RunHandle {
    pub run_id: String,
}

struct ActiveRun {
    run_id: String,
    cancel: CancelToken,
    speech_gate: Arc<SpeechGate>,
    voice_enabled: Arc<AtomicBool>,
}

/// Point-in-time view of [`RunHealth`] for the `/health`, `/livez`,
/// `/readyz` trio.
pub struct HealthSnapshot {
    pub live: bool,
    pub ready: bool,
    pub active: bool,
    pub last_ready_check: Option<u64>,
    pub last_error: Option<String>,
}

/// Tracks process liveness and Run-controller readiness: `ready` goes
/// false when a fatal error leaves the controller unable to safely accept
/// `/start`, and comes back once a Run begins or finishes cleanly.
#[derive(Default)]
struct RunHealth {
    live: AtomicBool,
    ready: AtomicBool,
    last_ready_check: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl RunHealth {
    fn mark_live(&self) {
        self.live.store(true, Ordering::SeqCst);
    }

    fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.update_last_check();
        *self.last_error.lock() = None;
    }

    fn mark_unready(&self, error: impl Into<String>) {
        self.ready.store(false, Ordering::SeqCst);
        self.update_last_check();
        *self.last_error.lock() = Some(error.into());
    }

    fn update_last_check(&self) {
        if let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) {
            self.last_ready_check.store(duration.as_secs(), Ordering::SeqCst);
        }
    }

    fn last_ready_check(&self) -> Option<u64> {
        match self.last_ready_check.load(Ordering::SeqCst) {
            0 => None,
            value => Some(value),
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

/// Owns the single in-flight Run and wires every subsystem into one
/// [`wayfarer_scheduler::LoopBody`].
pub struct RunController {
    config: Config,
    bus: Arc<AgentEventBus>,
    llm: DynLlmProvider,
    tts: Arc<dyn TtsSynthesizer>,
    active: Arc<Mutex<Option<ActiveRun>>>,
    health: Arc<RunHealth>,
}

impl RunController {
    pub fn new(config: Config, bus: Arc<AgentEventBus>) -> Self {
        Self::with_providers(config, bus, DynLlmProvider::mock(), Arc::new(NullTtsSynthesizer))
    }

    pub fn with_providers(
        config: Config,
        bus: Arc<AgentEventBus>,
        llm: DynLlmProvider,
        tts: Arc<dyn TtsSynthesizer>,
    ) -> Self {
        let health = Arc::new(RunHealth::default());
        health.mark_live();
        health.mark_ready();
        Self {
            config,
            bus,
            llm,
            tts,
            active: Arc::new(Mutex::new(None)),
            health,
        }
    }

    pub fn bus(&self) -> Arc<AgentEventBus> {
        self.bus.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Snapshot for the `/health`, `/livez`, `/readyz` handlers.
    pub fn health_snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            live: self.health.live.load(Ordering::SeqCst),
            ready: self.health.ready.load(Ordering::SeqCst),
            active: self.is_active(),
            last_ready_check: self.health.last_ready_check(),
            last_error: self.health.last_error(),
        }
    }

    /// Resolve the outstanding speech request, if any (inbound `tts_done`).
    pub fn ack_speech(&self, request_id: &str) -> bool {
        match self.active.lock().as_ref() {
            Some(active) => active.speech_gate.ack(request_id),
            None => false,
        }
    }

    /// Toggle voice for the active Run (inbound `tts_toggle`).
    pub fn tts_toggle(&self, enabled: bool) {
        if let Some(active) = self.active.lock().as_ref() {
            active.voice_enabled.store(enabled, Ordering::Relaxed);
            if !enabled {
                active.speech_gate.stop();
            }
        }
    }

    /// Request the active Run to stop at its next suspension-point check.
    pub fn stop(&self) -> Result<(), KernelError> {
        match self.active.lock().as_ref() {
            Some(active) => {
                active.cancel.request_stop();
                active.speech_gate.stop();
                Ok(())
            }
            None => Err(KernelError::NotActive),
        }
    }

    pub async fn begin(&self, request: StartRequest) -> Result<RunHandle, KernelError> {
        if request.target_url.trim().is_empty() {
            return Err(KernelError::MissingUrl);
        }
        {
            let guard = self.active.lock();
            if guard.is_some() {
                return Err(KernelError::AlreadyActive);
            }
        }

        let persona = Persona {
            name: request.persona_name.clone(),
            base_prompt: format!(
                "You are {}, a careful web visitor completing a real task.",
                request.persona_name
            ),
            context: ContextOptions::default(),
            voice: request.voice_tts.then(VoiceConfig::default),
        };
        let options = RunOptions {
            debug_marks: request.debug_marks,
            voice_tts: request.voice_tts,
            headless: request.headless,
            save_trace: request.save_trace,
            save_thoughts: request.save_thoughts,
            save_screenshots: request.save_screenshots,
            model_id: request.model_id.clone(),
            monkey_mode: request.monkey_mode,
            bare_mode: request.bare_mode,
        };
        let run_id = RunId::new(Utc::now().format("%Y-%m-%dT%H-%M-%S"), &slugify_persona(&persona.name));
        let run = Run {
            id: run_id.clone(),
            target_url: request.target_url.clone(),
            persona,
            mission: request.mission.clone(),
            options,
            status: RunStatus::Starting,
            started_at: Utc::now(),
        };

        let artifact_dir = ensure_run_dir(&self.config.artifact_root, &run.id.0).map_err(|err| {
            self.health.mark_unready(err.to_string());
            KernelError::Artifacts(err)
        })?;

        let cdp_config = CdpConfig {
            headless: run.options.headless,
            executable: None,
            user_data_dir: None,
            viewport_width: run.persona.context.viewport_width,
            viewport_height: run.persona.context.viewport_height,
            device_scale_factor: run.persona.context.device_scale_factor,
            locale: run.persona.context.locale.clone(),
            timezone: run.persona.context.timezone.clone(),
            reduced_motion: run.persona.context.reduced_motion,
            navigation_timeout: NAVIGATION_CEILING,
        };

        let driver: Arc<dyn BrowserDriver> = self.launch_driver(cdp_config).await.map_err(|err| {
            self.health.mark_unready(err.to_string());
            err
        })?;
        let page = driver.new_page().await.map_err(|err| {
            self.health.mark_unready(err.to_string());
            KernelError::BrowserLaunch(err)
        })?;
        let timeline = Arc::new(Timeline::new());
        let navigation = driver
            .navigate(page, &run.target_url, NAVIGATION_CEILING)
            .instrument(info_span!("suspension", point = SuspensionPoint::Navigation.label()))
            .await;
        if let Err(err) = navigation {
            warn!(error = %err, url = %run.target_url, "initial navigation failed, continuing as a warning");
        } else {
            timeline.record_trace_step(TraceStep {
                id: 0,
                timestamp: Utc::now(),
                url: run.target_url.clone(),
                kind: TraceStepKind::Goto,
                selector: None,
                coordinates: None,
                value: None,
                wait_ms: None,
                note: None,
            });
        }
        tokio::time::sleep(HYDRATION_WAIT).await;

        let drivers = PageDrivers::new(driver, page).with_event_bus(self.bus.clone(), run.id.0.clone());
        let viewport_center = Point::new(
            run.persona.context.viewport_width as f64 / 2.0,
            run.persona.context.viewport_height as f64 / 2.0,
        );

        let cancel = CancelToken::new();
        let speech_gate = Arc::new(SpeechGate::new());
        let voice_enabled = Arc::new(AtomicBool::new(run.options.voice_tts));

        let loop_body = RunLoop {
            run_id: run.id.0.clone(),
            mission: run.mission.clone(),
            persona: run.persona.clone(),
            run_options: run.options.clone(),
            drivers,
            engine: DecisionEngine::new(self.llm.clone()),
            history: HistoryLedger::shared(),
            failed_targets: FailedTargetLedger::shared(),
            stagnation: agent_core::StagnationDetector::new(),
            timeline,
            bus: self.bus.clone(),
            speech_gate: speech_gate.clone(),
            voice_enabled: voice_enabled.clone(),
            tts: self.tts.clone(),
            artifact_dir: artifact_dir.clone(),
            rng: StdRng::from_entropy(),
            known_pages: vec![page],
            auto_followed: false,
            cursor: viewport_center,
            last_url: Arc::new(Mutex::new(run.target_url.clone())),
        };

        let active_slot = self.active.clone();
        let bus_for_task = self.bus.clone();
        let run_id_for_task = run.id.0.clone();
        let start_url = run.target_url.clone();
        let objective = run.mission.clone();
        let persona_name = run.persona.name.clone();
        let model_name = run.options.model_id.clone();
        let save_toggles = SaveToggles::from(&run.options);
        let artifact_dir_for_finish = artifact_dir;

        let _ = bus_for_task
            .publish(AgentEvent::Status {
                run_id: run_id_for_task.clone(),
                status: RunStatus::Starting,
            })
            .await;

        let cancel_for_task = cancel.clone();
        let last_url_handle = loop_body.last_url.clone();
        let timeline = loop_body.timeline.clone();
        let health_for_task = self.health.clone();
        tokio::spawn(async move {
            let reason = wayfarer_scheduler::run(loop_body, cancel_for_task).await;
            info!(run_id = %run_id_for_task, reason = reason.label(), "run loop exited");
            match &reason {
                StopReason::Fatal(message) => health_for_task.mark_unready(message.clone()),
                _ => health_for_task.mark_ready(),
            }

            let meta = RunMetadata {
                run_id: run_id_for_task.clone(),
                start_url,
                final_url: last_url_handle.lock().clone(),
                objective,
                persona: persona_name,
                model_name,
            };
            match timeline.finish(&artifact_dir_for_finish, &meta, save_toggles) {
                Ok(bundle) => {
                    if let Some(trace) = &bundle.trace_json {
                        let _ = bus_for_task
                            .publish(AgentEvent::TraceSaved {
                                run_id: run_id_for_task.clone(),
                                path: trace.relative_path.display().to_string(),
                                download_url: trace.download_url.clone(),
                            })
                            .await;
                    }
                    if let Some(report) = &bundle.report_json {
                        let _ = bus_for_task
                            .publish(AgentEvent::ReportReady {
                                run_id: run_id_for_task.clone(),
                                path: report.relative_path.display().to_string(),
                                download_url: report.download_url.clone(),
                            })
                            .await;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "artifact finish failed");
                }
            }

            let _ = bus_for_task
                .publish(AgentEvent::Status {
                    run_id: run_id_for_task.clone(),
                    status: RunStatus::Stopped,
                })
                .await;
            *active_slot.lock() = None;
        });

        *self.active.lock() = Some(ActiveRun {
            run_id: run.id.0.clone(),
            cancel,
            speech_gate,
            voice_enabled,
        });
        self.health.mark_ready();

        Ok(RunHandle { run_id: run.id.0 })
    }

    async fn launch_driver(&self, cdp_config: CdpConfig) -> Result<Arc<dyn BrowserDriver>, KernelError> {
        #[cfg(feature = "chromiumoxide")]
        {
            let driver = ChromiumDriver::launch(cdp_config).await.map_err(KernelError::BrowserLaunch)?;
            Ok(Arc::new(driver))
        }
        #[cfg(not(feature = "chromiumoxide"))]
        {
            Ok(Arc::new(MockDriver::new(ViewportSize {
                width: cdp_config.viewport_width,
                height: cdp_config.viewport_height,
            })))
        }
    }
}

/// The [`LoopBody`] implementation driving one Run.
struct RunLoop {
    run_id: String,
    mission: String,
    persona: Persona,
    run_options: RunOptions,
    drivers: PageDrivers,
    engine: DecisionEngine<DynLlmProvider>,
    history: Arc<HistoryLedger>,
    failed_targets: Arc<FailedTargetLedger>,
    stagnation: agent_core::StagnationDetector,
    timeline: Arc<Timeline>,
    bus: Arc<AgentEventBus>,
    speech_gate: Arc<SpeechGate>,
    voice_enabled: Arc<AtomicBool>,
    tts: Arc<dyn TtsSynthesizer>,
    artifact_dir: PathBuf,
    rng: StdRng,
    known_pages: Vec<PageId>,
    auto_followed: bool,
    cursor: Point,
    /// Shared with the outer task so the final trace/report metadata can
    /// read the last-known url after `wayfarer_scheduler::run` consumes this body.
    last_url: Arc<Mutex<String>>,
}

impl RunLoop {
    async fn run_turn(&mut self, turn_index: u64) -> Result<TurnOutcome, AgentError> {
        // 1. Cookie pass.
        if let Some(evidence) = cookie_gate::dismiss(&self.drivers).await {
            let message = format!("Dismissed a cookie banner ({}).", evidence.note);
            self.emit_thought(&message).await;
        }

        // 2. Perception, 5s ceiling handled internally.
        let (url, title) = self
            .drivers
            .page_info()
            .await
            .map_err(|err| AgentError::Navigation(err.to_string()))?;
        *self.last_url.lock() = url.clone();
        let som = perceiver_hub::perceive(&self.drivers).await;
        if som.is_none() {
            self.emit_thought("Perception timed out; continuing from the raw screenshot.").await;
        }

        // 3. Capture.
        self.drivers
            .set_overlay_visible(true)
            .await
            .map_err(|err| AgentError::Perception(err.to_string()))?;
        let page = self.drivers.active_page();
        let marked_png = self
            .drivers
            .browser_driver()
            .screenshot(page)
            .await
            .map_err(|err| AgentError::Perception(err.to_string()))?;
        let ui_png = if !self.run_options.debug_marks {
            self.drivers
                .set_overlay_visible(false)
                .await
                .map_err(|err| AgentError::Perception(err.to_string()))?;
            let clean = self
                .drivers
                .browser_driver()
                .screenshot(page)
                .await
                .map_err(|err| AgentError::Perception(err.to_string()))?;
            self.drivers
                .set_overlay_visible(true)
                .await
                .map_err(|err| AgentError::Perception(err.to_string()))?;
            clean
        } else {
            marked_png.clone()
        };

        if self.run_options.save_screenshots {
            let relative = save_step_screenshot(&self.artifact_dir, turn_index, &ui_png)
                .map_err(|err| AgentError::Navigation(err.to_string()))?;
            self.timeline.record_screenshot(ScreenshotRecord {
                timestamp: Utc::now(),
                path: relative.display().to_string(),
                url: url.clone(),
            });
        }
        let data_url = format!("data:image/png;base64,{}", BASE64.encode(&ui_png));
        let _ = self
            .bus
            .publish(AgentEvent::Screenshot {
                run_id: self.run_id.clone(),
                data_url,
            })
            .await;

        // 4. Decision.
        let history = self.history.last(HISTORY_RETAIN);
        let failed = self.failed_targets.snapshot();
        let page_context = PageContext {
            url: &url,
            title: &title,
            som: som.as_ref(),
        };
        let ctx = DecideContext {
            persona: &self.persona,
            mission: &self.mission,
            page: page_context,
            history: &history,
            failed_targets: &failed,
            bare_mode: self.run_options.bare_mode,
            monkey_mode: self.run_options.monkey_mode,
            marked_screenshot: &marked_png,
        };
        let decision = self
            .engine
            .decide(ctx, &mut self.rng)
            .instrument(info_span!("suspension", point = SuspensionPoint::LlmCall.label()))
            .await;

        // 5. History & stagnation.
        self.history.push_decision(decision.clone());
        let window = self.history.last(agent_core::STAGNATION_WINDOW);
        if self.stagnation.observe(&window) {
            self.emit_thought("Stagnation detected: the last several turns converged on the same few actions. Stopping.").await;
            return Ok(TurnOutcome::Stop(StopReason::Stagnation));
        }

        // 6. Emit: thought, optional blocking speech, step.
        self.emit_thought(&decision.thought).await;
        self.timeline.record_thought(ThoughtRecord {
            timestamp: Utc::now(),
            message: decision.thought.clone(),
            url: url.clone(),
        });

        if self.voice_enabled.load(Ordering::Relaxed) {
            if let Some(voice) = self.persona.voice.clone() {
                if !decision.thought.is_empty() {
                    if let Ok(audio) = self.tts.synthesize(&decision.thought, &voice).await {
                        let request = wayfarer_core_types::SpeechRequest::new(
                            decision.thought.clone(),
                            audio.audio_base64.clone(),
                            audio.mime.clone(),
                        );
                        let rx = self.speech_gate.begin(request.id.clone());
                        let _ = self
                            .bus
                            .publish(AgentEvent::Tts {
                                run_id: self.run_id.clone(),
                                id: request.id.clone(),
                                text: request.thought_text.clone(),
                                mime: request.mime.clone(),
                                audio_base64: request.audio_base64.clone(),
                            })
                            .await;
                        let deadline = watchdog_for(decision.thought.len());
                        let _ = await_outcome(&self.speech_gate, &request.id, rx, deadline)
                            .instrument(info_span!("suspension", point = SuspensionPoint::SpeechGate.label()))
                            .await;
                    }
                }
            }
        }

        let _ = self
            .bus
            .publish(AgentEvent::Step {
                run_id: self.run_id.clone(),
                id: turn_index,
                action: decision.action.as_str().to_string(),
                target_id: decision.target_id.clone(),
                value: decision.value.clone(),
                thought: decision.thought.clone(),
            })
            .await;
        self.timeline.record_step(StepRecord {
            id: turn_index,
            timestamp: Utc::now(),
            action: decision.action,
            target_id: decision.target_id.clone(),
            value: decision.value.clone(),
            thought: decision.thought.clone(),
            url: url.clone(),
        });

        // 7. Termination check.
        if decision.action == ActionKind::Done {
            return Ok(TurnOutcome::Stop(StopReason::DecisionDone));
        }

        // 8. Execution.
        self.execute(&decision, turn_index, &url).await?;

        // 9. Tab-follow reconciliation. Polls `list_pages()` once per turn
        // rather than reacting to a push-based lifecycle event, since this
        // already runs at the same cadence as every other per-turn check
        // and needs no extra subscription plumbing through `BrowserDriver`.
        if let Some(outcome) = self.reconcile_tabs(turn_index, &url).await? {
            return Ok(outcome);
        }

        Ok(TurnOutcome::Continue)
    }

    async fn emit_thought(&self, message: &str) {
        let _ = self
            .bus
            .publish(AgentEvent::Thought {
                run_id: self.run_id.clone(),
                message: message.to_string(),
            })
            .await;
    }

    async fn execute(
        &mut self,
        decision: &wayfarer_core_types::Decision,
        turn_index: u64,
        url: &str,
    ) -> Result<(), AgentError> {
        match decision.action {
            ActionKind::Click => {
                let mark_id = parse_mark_id(decision.target_id.as_deref())?;
                match tool_click::click(&self.drivers, mark_id, self.cursor, &mut self.rng)
                    .instrument(info_span!("suspension", point = SuspensionPoint::MouseStep.label()))
                    .await
                {
                    Ok(outcome) => {
                        self.cursor = outcome.point;
                        self.failed_targets.record_success(mark_id);
                        self.timeline.record_trace_step(TraceStep {
                            id: turn_index,
                            timestamp: Utc::now(),
                            url: url.to_string(),
                            kind: TraceStepKind::Click,
                            selector: Some(outcome.selector),
                            coordinates: Some((outcome.point.x, outcome.point.y)),
                            value: None,
                            wait_ms: None,
                            note: None,
                        });
                        Ok(())
                    }
                    Err(err) => Err(AgentError::Action {
                        mark_id: Some(mark_id),
                        message: err.to_string(),
                    }),
                }
            }
            ActionKind::Type => {
                let mark_id = parse_mark_id(decision.target_id.as_deref())?;
                let value = decision.value.clone().unwrap_or_default();
                match tool_type_text::type_text(&self.drivers, mark_id, &value, self.cursor, &mut self.rng)
                    .instrument(info_span!("suspension", point = SuspensionPoint::TypedChar.label()))
                    .await
                {
                    Ok(outcome) => {
                        self.cursor = outcome.point;
                        self.failed_targets.record_success(mark_id);
                        self.timeline.record_trace_step(TraceStep {
                            id: turn_index,
                            timestamp: Utc::now(),
                            url: url.to_string(),
                            kind: TraceStepKind::Type,
                            selector: Some(outcome.selector),
                            coordinates: Some((outcome.point.x, outcome.point.y)),
                            value: Some(outcome.value),
                            wait_ms: None,
                            note: outcome.used_fallback.then(|| "fallback field".to_string()),
                        });
                        Ok(())
                    }
                    Err(err) => Err(AgentError::Action {
                        mark_id: Some(mark_id),
                        message: err.to_string(),
                    }),
                }
            }
            ActionKind::Scroll => {
                let plan = plan_scroll(&mut self.rng);
                let jiggled = Point::new(self.cursor.x + plan.jiggle_dx, self.cursor.y + plan.jiggle_dy);
                let page = self.drivers.active_page();
                self.drivers
                    .browser_driver()
                    .mouse_move(page, DriverPoint { x: jiggled.x, y: jiggled.y })
                    .await
                    .map_err(|err| AgentError::Action { mark_id: None, message: err.to_string() })?;
                self.cursor = jiggled;
                self.drivers
                    .browser_driver()
                    .wheel_scroll(page, plan.delta_y)
                    .await
                    .map_err(|err| AgentError::Action { mark_id: None, message: err.to_string() })?;
                self.timeline.record_trace_step(TraceStep {
                    id: turn_index,
                    timestamp: Utc::now(),
                    url: url.to_string(),
                    kind: TraceStepKind::Scroll,
                    selector: None,
                    coordinates: None,
                    value: Some(plan.delta_y.to_string()),
                    wait_ms: None,
                    note: None,
                });
                Ok(())
            }
            ActionKind::Wait => {
                tokio::time::sleep(WAIT_ACTION)
                    .instrument(info_span!("suspension", point = SuspensionPoint::ExplicitWait.label()))
                    .await;
                self.timeline.record_trace_step(TraceStep {
                    id: turn_index,
                    timestamp: Utc::now(),
                    url: url.to_string(),
                    kind: TraceStepKind::Wait,
                    selector: None,
                    coordinates: None,
                    value: None,
                    wait_ms: Some(WAIT_ACTION.as_millis() as u64),
                    note: None,
                });
                Ok(())
            }
            ActionKind::Done => Ok(()),
        }
    }

    async fn reconcile_tabs(&mut self, turn_index: u64, url: &str) -> Result<Option<TurnOutcome>, AgentError> {
        let pages = self
            .drivers
            .browser_driver()
            .list_pages()
            .await
            .map_err(|err| AgentError::TabLoss(err.to_string()))?;
        if pages.is_empty() {
            return Ok(Some(TurnOutcome::Stop(StopReason::PageLost)));
        }

        let active = self.drivers.active_page();
        let active_survives = pages.contains(&active);
        let new_pages: Vec<PageId> = pages.iter().copied().filter(|p| !self.known_pages.contains(p)).collect();

        let target = if !active_survives {
            pages.last().copied()
        } else if !self.auto_followed && !new_pages.is_empty() {
            new_pages.last().copied()
        } else {
            None
        };

        self.known_pages = pages;

        if let Some(next) = target {
            if next != active {
                self.drivers.set_active_page(next);
                let _ = self.drivers.browser_driver().activate_page(next).await;
                self.cursor = Point::new(
                    self.persona.context.viewport_width as f64 / 2.0,
                    self.persona.context.viewport_height as f64 / 2.0,
                );
                self.auto_followed = true;
                self.timeline.record_trace_step(TraceStep {
                    id: turn_index,
                    timestamp: Utc::now(),
                    url: url.to_string(),
                    kind: TraceStepKind::TabSwitch,
                    selector: None,
                    coordinates: None,
                    value: None,
                    wait_ms: None,
                    note: Some(format!("switched to {next}")),
                });
                self.emit_thought("Followed the browser to a new tab.").await;
            }
        }

        Ok(None)
    }
}

fn parse_mark_id(target_id: Option<&str>) -> Result<u32, AgentError> {
    target_id
        .and_then(|id| id.parse::<u32>().ok())
        .ok_or_else(|| AgentError::Action {
            mark_id: None,
            message: "decision targeted a non-numeric or missing mark id".to_string(),
        })
}

#[async_trait]
impl LoopBody for RunLoop {
    async fn turn(&mut self, turn_index: u64, _cancel: &CancelToken) -> TurnOutcome {
        match self.run_turn(turn_index).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "loop turn failed");
                self.emit_thought(&format!("Something went wrong: {err}")).await;
                self.timeline.record_error(ErrorRecord {
                    timestamp: Utc::now(),
                    message: err.to_string(),
                    url: self.last_url.lock().clone(),
                });
                let _ = self
                    .bus
                    .publish(AgentEvent::Error {
                        run_id: self.run_id.clone(),
                        message: err.to_string(),
                    })
                    .await;
                if let Some(mark_id) = err.charged_mark() {
                    self.failed_targets.charge(mark_id);
                }
                tokio::time::sleep(ERROR_BACKOFF).await;
                TurnOutcome::Continue
            }
        }
    }
}
