//! Local/push notification scheduling and delivery core.
//!
//! This crate negotiates notification permission with the host OS, registers
//! delivery channels where the platform models them, provisions a
//! push-routing token as a best-effort optional capability, schedules and
//! cancels notifications under immediate/date/interval triggers, synchronizes
//! the application badge counter, and manages the single received/responded
//! listener pair per process.
//!
//! The entry point is [`NotificationServiceBuilder`] (or
//! [`create_notification_service`] when the collaborators are already
//! assembled): it produces an explicit [`NotificationService`] instance to
//! thread through the application, rather than an ambient singleton.
//!
//! ```no_run
//! use notify_core::{NotificationRequest, NotificationServiceBuilder};
//!
//! # async fn demo() -> Result<(), notify_core::NotifyError> {
//! let service = NotificationServiceBuilder::new()
//!     .with_project_id("my-project")
//!     .build();
//!
//! let capabilities = service.initialize().await?;
//! if capabilities.local_scheduling_available {
//!     let id = service
//!         .schedule_after(NotificationRequest::new("Reminder", "Event starts soon"), 300)
//!         .await?;
//!     service.cancel(&id).await?;
//! }
//! service.cleanup();
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod components;
pub mod config;
pub mod error;
pub mod service;

pub use backends::{
    BadgeApi, BoxFuture, ChannelApi, DeviceProfile, HttpPushGateway, ListenerApi, ListenerToken,
    MemoryBackend, MemoryPushGateway, NoopChannelApi, NullPushGateway, PermissionApi,
    PlatformSuite, PushGateway, SchedulerApi,
};
pub use components::{
    BadgeSynchronizer, Channel, ChannelImportance, ChannelRegistrar, DataMap,
    DeliveredNotification, ListenerGuard, ListenerHub, NotificationRequest, NotificationResponse,
    PermissionNegotiator, PermissionState, ReceivedHandler, ResponseHandler,
    ScheduledNotification, SchedulingEngine, TokenProvisioner, Trigger,
};
pub use config::{ServiceConfig, default_channels};
pub use error::{NotifyError, NotifyResult, SchedulingError, TokenError};
pub use service::{Capabilities, NotificationService, ServicePhase};

use std::sync::Arc;

/// Builder for a [`NotificationService`] with fluent configuration.
pub struct NotificationServiceBuilder {
    config: ServiceConfig,
    suite: Option<PlatformSuite>,
    on_received: Option<ReceivedHandler>,
    on_responded: Option<ResponseHandler>,
}

impl NotificationServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
            suite: None,
            on_received: None,
            on_responded: None,
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.project_id = Some(project_id.into());
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.config.channels.push(channel);
        self
    }

    /// Platform collaborators to run against. Defaults to the in-process
    /// backend with push unconfigured.
    pub fn with_suite(mut self, suite: PlatformSuite) -> Self {
        self.suite = Some(suite);
        self
    }

    /// Handler for notifications presented while the process runs.
    pub fn on_received(
        mut self,
        handler: impl Fn(DeliveredNotification) + Send + Sync + 'static,
    ) -> Self {
        self.on_received = Some(Arc::new(handler));
        self
    }

    /// Handler for user interactions with presented notifications.
    pub fn on_responded(
        mut self,
        handler: impl Fn(NotificationResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_responded = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> NotificationService {
        let suite = self.suite.unwrap_or_else(|| PlatformSuite::in_memory().0);
        let on_received = self.on_received.unwrap_or_else(default_received_handler);
        let on_responded = self.on_responded.unwrap_or_else(default_response_handler);
        NotificationService::new(self.config, suite, on_received, on_responded)
    }
}

impl Default for NotificationServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Constructs a service from pre-assembled configuration and collaborators,
/// with the default logging handlers.
pub fn create_notification_service(
    config: ServiceConfig,
    suite: PlatformSuite,
) -> NotificationService {
    NotificationServiceBuilder::new()
        .with_config(config)
        .with_suite(suite)
        .build()
}

fn default_received_handler() -> ReceivedHandler {
    Arc::new(|notification: DeliveredNotification| {
        tracing::debug!(id = %notification.id, title = %notification.request.title, "notification received");
    })
}

fn default_response_handler() -> ResponseHandler {
    Arc::new(|response: NotificationResponse| {
        // Deep-link routing hook: surface the target screen when the payload
        // names one.
        if let Some(screen) = response
            .data()
            .and_then(|data| data.get("screen"))
            .and_then(|value| value.as_str())
        {
            tracing::info!(screen = %screen, "notification response requested navigation");
        } else {
            tracing::debug!(id = %response.notification.id, action = ?response.action_id, "notification response received");
        }
    })
}
