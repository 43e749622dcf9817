//! Notification payloads, trigger specifications, and the entities the OS
//! scheduler and listener layer hand back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arbitrary structured payload attached to a notification, surfaced again
/// when the user acts on it (deep links, entity ids, and the like).
pub type DataMap = serde_json::Map<String, serde_json::Value>;

/// Content of a single notification. Immutable once submitted to the
/// scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataMap>,
    /// Whether delivery plays the notification sound. Defaults to `true`.
    #[serde(default = "default_sound")]
    pub sound: bool,
    /// Badge value applied to the application icon on delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    /// Delivery channel this notification routes through, on platforms that
    /// model channels. Ignored elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

fn default_sound() -> bool {
    true
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: None,
            sound: true,
            badge: None,
            channel_id: None,
        }
    }

    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }

    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn silent(mut self) -> Self {
        self.sound = false;
        self
    }

    /// Whether the request carries any presentable content. Whitespace-only
    /// titles and bodies count as empty.
    pub(crate) fn has_content(&self) -> bool {
        !self.title.trim().is_empty() || !self.body.trim().is_empty()
    }
}

/// Timing rule governing when a scheduled notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Deliver as soon as the scheduler accepts the request.
    Immediate,
    /// Deliver at an absolute instant.
    AtDate { date: DateTime<Utc> },
    /// Deliver after a relative delay. Must be positive.
    AfterInterval { seconds: i64 },
}

impl Trigger {
    /// Resolves the trigger against the current clock. An absolute date that
    /// has already elapsed fires immediately instead of being dropped by the
    /// OS scheduler.
    pub fn effective(self, now: DateTime<Utc>) -> Trigger {
        match self {
            Trigger::AtDate { date } if date <= now => Trigger::Immediate,
            other => other,
        }
    }
}

/// A delivery tracked by the OS scheduler.
///
/// The `id` is assigned by the scheduling engine, is unique among active
/// schedules, and is the handle for cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub id: String,
    pub request: NotificationRequest,
    pub trigger: Trigger,
    pub created_at: DateTime<Utc>,
}

/// A notification the OS has presented, as observed by a received-listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredNotification {
    pub id: String,
    pub request: NotificationRequest,
    pub delivered_at: DateTime<Utc>,
}

/// A user interaction with a presented notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub notification: DeliveredNotification,
    /// Identifier of the action the user chose, when the platform reports
    /// one. A plain tap carries `None`.
    pub action_id: Option<String>,
}

impl NotificationResponse {
    /// Payload attached at scheduling time, for deep-link routing.
    pub fn data(&self) -> Option<&DataMap> {
        self.notification.request.data.as_ref()
    }
}
