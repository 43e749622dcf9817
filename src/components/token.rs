//! Push-routing token provisioning.

use std::sync::Arc;

use crate::backends::PushGateway;
use crate::error::TokenError;

/// Exchanges a project identity for an opaque push-routing token.
///
/// Push is an optional capability, never a hard dependency: every failure
/// mode resolves to `None`, distinguished only by log severity. Missing
/// configuration and an unconfigured backend are expected; anything else is
/// logged as unexpected so it can be chased without breaking initialization.
pub struct TokenProvisioner {
    gateway: Arc<dyn PushGateway>,
}

impl TokenProvisioner {
    pub fn new(gateway: Arc<dyn PushGateway>) -> Self {
        Self { gateway }
    }

    pub async fn acquire(&self, project_id: Option<&str>) -> Option<String> {
        let Some(project_id) = project_id else {
            tracing::warn!("no project id configured; push routing disabled");
            return None;
        };

        match self.gateway.issue_token(project_id).await {
            Ok(token) => {
                tracing::debug!("push token provisioned");
                Some(token)
            },
            Err(TokenError::NotConfigured) => {
                tracing::warn!("push backend not configured; local notifications unaffected");
                None
            },
            Err(TokenError::Transport(message)) => {
                tracing::error!(error = %message, "unexpected failure acquiring push token");
                None
            },
        }
    }
}
