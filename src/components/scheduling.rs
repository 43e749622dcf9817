//! Trigger-based notification scheduling against the OS scheduler.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::backends::SchedulerApi;
use crate::components::request::{NotificationRequest, ScheduledNotification, Trigger};
use crate::error::{NotifyResult, SchedulingError};

/// Turns a payload plus a trigger into a delivery tracked by a unique id.
///
/// Validation failures ([`SchedulingError`]) are caller defects and reject
/// the call; cancellation is always an idempotent no-op for ids that are not
/// active.
pub struct SchedulingEngine {
    scheduler: Arc<dyn SchedulerApi>,
}

impl SchedulingEngine {
    pub fn new(scheduler: Arc<dyn SchedulerApi>) -> Self {
        Self { scheduler }
    }

    /// Schedules `request` under `trigger`, returning the fresh id.
    ///
    /// Rejects with [`SchedulingError::EmptyContent`] when both title and
    /// body are empty, and with [`SchedulingError::NonPositiveInterval`] for
    /// an `AfterInterval` trigger of zero or negative seconds, whichever path
    /// the trigger arrives through. An `AtDate` trigger already in the past
    /// is submitted as `Immediate`.
    pub async fn schedule(
        &self,
        request: NotificationRequest,
        trigger: Trigger,
    ) -> NotifyResult<String> {
        if !request.has_content() {
            return Err(SchedulingError::EmptyContent.into());
        }
        if let Trigger::AfterInterval { seconds } = trigger
            && seconds <= 0
        {
            return Err(SchedulingError::NonPositiveInterval(seconds).into());
        }

        let now = Utc::now();
        let scheduled = ScheduledNotification {
            id: Uuid::new_v4().to_string(),
            request,
            trigger: trigger.effective(now),
            created_at: now,
        };

        self.scheduler.submit(&scheduled).await?;
        tracing::debug!(id = %scheduled.id, trigger = ?scheduled.trigger, "notification scheduled");
        Ok(scheduled.id)
    }

    /// Sugar for an absolute-date trigger.
    pub async fn schedule_at(
        &self,
        request: NotificationRequest,
        date: chrono::DateTime<Utc>,
    ) -> NotifyResult<String> {
        self.schedule(request, Trigger::AtDate { date }).await
    }

    /// Sugar for a relative-interval trigger. `seconds` must be positive.
    pub async fn schedule_after(
        &self,
        request: NotificationRequest,
        seconds: i64,
    ) -> NotifyResult<String> {
        if seconds <= 0 {
            return Err(SchedulingError::NonPositiveInterval(seconds).into());
        }
        self.schedule(request, Trigger::AfterInterval { seconds }).await
    }

    /// Cancels one schedule. Unknown or already-cancelled ids are a no-op.
    pub async fn cancel(&self, id: &str) -> NotifyResult<()> {
        self.scheduler.cancel(id).await?;
        tracing::debug!(id = %id, "notification cancelled");
        Ok(())
    }

    /// Clears every active schedule.
    pub async fn cancel_all(&self) -> NotifyResult<()> {
        self.scheduler.cancel_all().await?;
        tracing::debug!("all scheduled notifications cancelled");
        Ok(())
    }

    /// Enumerates active schedules. Ordering is OS-determined and carries no
    /// meaning.
    pub async fn list_scheduled(&self) -> NotifyResult<Vec<ScheduledNotification>> {
        self.scheduler.list().await
    }
}
