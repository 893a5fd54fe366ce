#![allow(dead_code)]
//! Typed event fan-out.
//!
//! The run loop publishes a fixed enumeration of event kinds; the operator
//! UI (out of scope) and the HTTP event stream both subscribe to the same
//! broadcast channel.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use wayfarer_core_types::{AgentError, RunStatus};

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), AgentError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Simple in-memory bus suitable for unit tests and early integration.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), AgentError> {
        // A send error only means there are currently no subscribers, which
        // is not a failure for a fire-and-forget observability stream.
        let _ = self.sender.send(event);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

/// Helper to materialise an mpsc receiver from the bus subscription
/// so callers can await events without handling broadcast semantics directly.
pub fn to_mpsc<E>(bus: Arc<InMemoryBus<E>>, capacity: usize) -> mpsc::Receiver<E>
where
    E: Event,
{
    let mut rx = bus.subscribe();
    let (tx, out_rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        while let Ok(ev) = rx.recv().await {
            if tx.send(ev).await.is_err() {
                break;
            }
        }
    });
    out_rx
}

/// The fixed enumeration of event kinds published during a Run.
#[derive(Clone, Debug)]
pub enum AgentEvent {
    Status {
        run_id: String,
        status: RunStatus,
    },
    Thought {
        run_id: String,
        message: String,
    },
    Step {
        run_id: String,
        id: u64,
        action: String,
        target_id: Option<String>,
        value: Option<String>,
        thought: String,
    },
    Screenshot {
        run_id: String,
        data_url: String,
    },
    Cursor {
        run_id: String,
        x: f64,
        y: f64,
        viewport_width: u32,
        viewport_height: u32,
    },
    Tts {
        run_id: String,
        id: String,
        text: String,
        mime: String,
        audio_base64: String,
    },
    TraceSaved {
        run_id: String,
        path: String,
        download_url: String,
    },
    ReportReady {
        run_id: String,
        path: String,
        download_url: String,
    },
    Error {
        run_id: String,
        message: String,
    },
}

pub type AgentEventBus = InMemoryBus<AgentEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_does_not_error() {
        let bus = AgentEventBus::new(8);
        let result = bus
            .publish(AgentEvent::Thought {
                run_id: "r1".into(),
                message: "hello".into(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = AgentEventBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(AgentEvent::Status {
            run_id: "r1".into(),
            status: RunStatus::Scanning,
        })
        .await
        .unwrap();
        let event = rx.recv().await.unwrap();
        match event {
            AgentEvent::Status { run_id, status } => {
                assert_eq!(run_id, "r1");
                assert_eq!(status, RunStatus::Scanning);
            }
            _ => panic!("wrong event kind"),
        }
    }
}
