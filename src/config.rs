//! Service configuration.

use serde::{Deserialize, Serialize};

use crate::components::channel::{Channel, ChannelImportance};

/// Static configuration threaded into the service at construction time.
///
/// This carries only what the core itself consumes: the cloud project
/// identity used for push-token provisioning and the delivery channels the
/// application intends to reference. Whether notifications are wanted at all
/// is a caller concern, not modelled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Project identity exchanged for a push-routing token. `None` disables
    /// push provisioning without affecting local scheduling.
    pub project_id: Option<String>,

    /// Channels registered during initialization, before anything referencing
    /// them can be scheduled.
    pub channels: Vec<Channel>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            channels: default_channels(),
        }
    }
}

impl ServiceConfig {
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }
}

/// The stock channel set: a default-importance channel plus a high-priority
/// tier for urgent content.
pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel::new("default", "Default")
            .with_vibration_pattern(vec![0, 250, 250, 250])
            .with_light_color("#FF231F7C"),
        Channel::new("high-priority", "High Priority")
            .with_importance(ChannelImportance::High)
            .with_vibration_pattern(vec![0, 250, 250, 250])
            .with_light_color("#FF231F7C"),
    ]
}
