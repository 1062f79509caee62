//! Event types for the WSW event system
//!
//! The submission workflow reports progress and non-blocking notices through an [`EventBus`];
//! the HTTP layer forwards them to connected clients over SSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational only; the workflow carried on
    Info,
    /// The attempted step failed and must be retried by the user
    Error,
}

/// WSW event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WswEvent {
    /// Submission workflow moved to a new state
    SubmissionStateChanged {
        old_state: String,
        new_state: String,
        timestamp: DateTime<Utc>,
    },

    /// Message for the person filling in the report
    Notice {
        level: NoticeLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A report was persisted
    ReportSubmitted {
        report_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl WswEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            WswEvent::SubmissionStateChanged { .. } => "SubmissionStateChanged",
            WswEvent::Notice { .. } => "Notice",
            WswEvent::ReportSubmitted { .. } => "ReportSubmitted",
        }
    }

    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        WswEvent::Notice {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast channel shared by the workflow and the SSE endpoint
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WswEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WswEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WswEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
