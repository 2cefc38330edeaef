// src/notify/mod.rs
//! Notification transports behind one async trait.
//!
//! Addressing lives inside the implementation: the dispatcher decides what
//! goes out and with which subject, the notifier decides where it lands.

pub mod email;
pub mod file;

use anyhow::Result;
use async_trait::async_trait;

use crate::render::MessageBody;

pub use email::EmailNotifier;
pub use file::FileNotifier;

/// One outbound notification, transport-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub subject: String,
    pub body: MessageBody,
}

/// Capability to deliver one message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}

// --- Test helper ---

/// In-memory notifier: records every message and can be scripted to fail
/// for subjects containing a given needle.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<OutboundMessage>>,
    fail_on: std::sync::Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send whose subject contains `needle` fail.
    pub fn fail_when_subject_contains(&self, needle: impl Into<String>) {
        self.fail_on.lock().unwrap().push(needle.into());
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let scripted = self
            .fail_on
            .lock()
            .unwrap()
            .iter()
            .any(|needle| message.subject.contains(needle.as_str()));
        if scripted {
            anyhow::bail!("scripted delivery failure for '{}'", message.subject);
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
