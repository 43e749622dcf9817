//! Delivery channels and their registration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backends::ChannelApi;
use crate::error::NotifyResult;

/// Importance tier for a delivery channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelImportance {
    #[default]
    Default,
    High,
}

/// A named delivery category on platforms that classify notifications this
/// way. Re-registering an id overwrites the existing definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub importance: ChannelImportance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration_pattern: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_color: Option<String>,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            importance: ChannelImportance::Default,
            vibration_pattern: None,
            light_color: None,
        }
    }

    pub fn with_importance(mut self, importance: ChannelImportance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_vibration_pattern(mut self, pattern: Vec<u32>) -> Self {
        self.vibration_pattern = Some(pattern);
        self
    }

    pub fn with_light_color(mut self, color: impl Into<String>) -> Self {
        self.light_color = Some(color.into());
        self
    }
}

/// Declares delivery channels against the platform's channel API.
///
/// The strategy is chosen once at construction: platforms without a channel
/// model get [`NoopChannelApi`](crate::backends::noop::NoopChannelApi), which
/// accepts every registration without side effects, so callers never branch
/// on platform at the call site.
pub struct ChannelRegistrar {
    api: Arc<dyn ChannelApi>,
}

impl ChannelRegistrar {
    pub fn new(api: Arc<dyn ChannelApi>) -> Self {
        Self { api }
    }

    /// Registers (or redefines) a channel. Must complete before anything
    /// referencing the channel is scheduled, so it exists at delivery time.
    ///
    /// On platforms without a channel model this returns without touching the
    /// API at all.
    pub async fn register(&self, channel: &Channel) -> NotifyResult<()> {
        if !self.api.supports_channels() {
            tracing::debug!(channel = %channel.id, "platform has no channel model; registration skipped");
            return Ok(());
        }
        self.api.register_channel(channel).await?;
        tracing::debug!(channel = %channel.id, "delivery channel registered");
        Ok(())
    }
}
