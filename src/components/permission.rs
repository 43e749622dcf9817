//! OS notification-permission negotiation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backends::{DeviceProfile, PermissionApi};
use crate::error::NotifyResult;

/// The OS's recorded decision about presenting notifications, plus the
/// `Unsupported` classification for hosts where the concept cannot be
/// satisfied at all (simulators, emulators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    Undetermined,
    Granted,
    Denied,
    Unsupported,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Negotiates notification permission with the host OS.
///
/// Idempotent: once a decision exists, repeated calls read it back without
/// re-prompting the user.
pub struct PermissionNegotiator {
    device: Arc<dyn DeviceProfile>,
    api: Arc<dyn PermissionApi>,
}

impl PermissionNegotiator {
    pub fn new(device: Arc<dyn DeviceProfile>, api: Arc<dyn PermissionApi>) -> Self {
        Self { device, api }
    }

    /// Classifies the device, reads the existing grant, and prompts the user
    /// only when the state is still [`PermissionState::Undetermined`].
    ///
    /// Non-physical hosts short-circuit to `Unsupported` without touching any
    /// OS API. Only unexpected platform faults surface as `Err`.
    pub async fn request(&self) -> NotifyResult<PermissionState> {
        if !self.device.is_physical_device() {
            tracing::warn!("notifications require a physical device; skipping permission prompt");
            return Ok(PermissionState::Unsupported);
        }

        let current = self.api.current_status().await?;
        if current != PermissionState::Undetermined {
            tracing::debug!(state = ?current, "notification permission already decided");
            return Ok(current);
        }

        let decided = self.api.request_permission().await?;
        if !decided.is_granted() {
            tracing::warn!(state = ?decided, "notification permission not granted");
        }
        Ok(decided)
    }
}
