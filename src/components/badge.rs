//! Application badge counter synchronization.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backends::BadgeApi;
use crate::error::NotifyResult;

/// Reads and writes the application's badge counter, keeping a local mirror
/// that agrees with the OS value after every successful write.
pub struct BadgeSynchronizer {
    api: Arc<dyn BadgeApi>,
    mirror: Mutex<Option<u32>>,
}

impl BadgeSynchronizer {
    pub fn new(api: Arc<dyn BadgeApi>) -> Self {
        Self {
            api,
            mirror: Mutex::new(None),
        }
    }

    /// Writes the badge counter. Negative input clamps to 0; the counter is
    /// always non-negative.
    pub async fn set(&self, count: i64) -> NotifyResult<()> {
        let clamped = count.max(0) as u32;
        if i64::from(clamped) != count {
            tracing::debug!(requested = count, "badge count clamped to 0");
        }
        self.api.set_badge(clamped).await?;
        *self.mirror.lock() = Some(clamped);
        Ok(())
    }

    /// Reads the current OS badge value.
    pub async fn get(&self) -> NotifyResult<u32> {
        self.api.get_badge().await
    }

    /// Last value written through this synchronizer, if any. Cheap read for
    /// presentation layers that mirror the counter.
    pub fn mirrored(&self) -> Option<u32> {
        *self.mirror.lock()
    }
}
