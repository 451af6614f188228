//! Account lifecycle notifications.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::KeyringError;

/// Lifecycle events delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyringEvent {
    #[serde(rename = "notify:accountCreated")]
    AccountCreated,
    #[serde(rename = "notify:accountDeleted")]
    AccountDeleted,
    #[serde(rename = "notify:requestApproved")]
    RequestApproved,
    #[serde(rename = "notify:requestRejected")]
    RequestRejected,
}

impl KeyringEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyringEvent::AccountCreated => "notify:accountCreated",
            KeyringEvent::AccountDeleted => "notify:accountDeleted",
            KeyringEvent::RequestApproved => "notify:requestApproved",
            KeyringEvent::RequestRejected => "notify:requestRejected",
        }
    }
}

/// Receives lifecycle events. An error aborts the operation that emitted it.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: KeyringEvent, data: Map<String, Value>) -> Result<(), KeyringError>;
}

/// Logs every event at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: KeyringEvent, data: Map<String, Value>) -> Result<(), KeyringError> {
        let data = Value::Object(data);
        info!(event = event.as_str(), data = %data, "keyring event");
        Ok(())
    }
}

/// An event as delivered through [`ChannelEventSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub event: KeyringEvent,
    pub data: Map<String, Value>,
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<EmittedEvent>,
}

impl ChannelEventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EmittedEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: KeyringEvent, data: Map<String, Value>) -> Result<(), KeyringError> {
        self.sender
            .send(EmittedEvent { event, data })
            .map_err(|_| KeyringError::Event(format!("{} receiver dropped", event.as_str())))
    }
}
