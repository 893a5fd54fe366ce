use anyhow::{bail, Result};
use tracing::info;
use wayfarer_core_types::RunStatus;
use wayfarer_event_bus::{AgentEvent, EventBus};
use wayfarer_kernel::{Config, RunController, StartRequest};

use super::args::RunArgs;

/// Drive a single Run to completion in the foreground, printing each
/// emitted event as a log line until the run stops.
pub async fn cmd_run(args: RunArgs, config: Config) -> Result<()> {
    let bus = wayfarer_event_bus::AgentEventBus::new(256);
    let controller = RunController::new(config, bus.clone());

    let mut events = bus.subscribe();
    let handle = controller
        .begin(StartRequest {
            target_url: args.url,
            persona_name: args.persona,
            mission: args.mission,
            debug_marks: args.debug_marks,
            model_id: args.model,
            voice_tts: args.voice,
            headless: args.headless,
            save_trace: args.save_trace,
            save_thoughts: args.save_thoughts,
            save_screenshots: args.save_screenshots,
            monkey_mode: args.monkey_mode,
            bare_mode: args.bare_mode,
        })
        .await?;
    info!(run_id = %handle.run_id, "run started");

    loop {
        match events.recv().await {
            Ok(AgentEvent::Thought { message, .. }) => info!("thought: {message}"),
            Ok(AgentEvent::Step { action, target_id, .. }) => {
                info!("step: {action} target={target_id:?}")
            }
            Ok(AgentEvent::Error { message, .. }) => tracing::warn!("error: {message}"),
            Ok(AgentEvent::TraceSaved { path, .. }) => info!("trace saved: {path}"),
            Ok(AgentEvent::ReportReady { path, .. }) => info!("report ready: {path}"),
            Ok(AgentEvent::Status { status, .. }) => {
                info!("status: {}", status.label());
                if status == RunStatus::Stopped {
                    break;
                }
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                bail!("event bus closed before the run reported stopped")
            }
        }
    }

    Ok(())
}
