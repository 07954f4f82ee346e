//! Notification capability for surfacing operation outcomes.
//!
//! Core logic returns structured results; a `NotificationSink` is the one
//! place those results get turned into operator-visible alerts. The default
//! sink writes to the tracing subscriber.

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// An operator-visible alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Short headline
    pub message: String,
    /// Detail text
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Capability for delivering notifications to the operator.
pub trait NotificationSink: Send + Sync + Debug {
    fn notify(&self, notification: Notification);
}

/// Default sink: forwards notifications to the tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                info!(message = %notification.message, "{}", notification.description)
            }
            NotificationLevel::Error => {
                error!(message = %notification.message, "{}", notification.description)
            }
        }
    }
}
