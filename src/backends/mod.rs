//! Platform collaborator seams.
//!
//! Every OS-facing concern the core consumes (permission prompts, the
//! notification scheduler, channel declarations, listener registration, the
//! badge store, the push-token backend, and the physical-device query) is a
//! trait here. Strategy selection happens once, when a [`PlatformSuite`] is
//! assembled, never inline at call sites.

pub mod http_push;
pub mod memory;
pub mod noop;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::components::channel::Channel;
use crate::components::listeners::{ReceivedHandler, ResponseHandler};
use crate::components::permission::PermissionState;
use crate::components::request::ScheduledNotification;
use crate::error::{NotifyResult, TokenError};

pub use http_push::{HttpPushGateway, NullPushGateway};
pub use memory::{MemoryBackend, MemoryPushGateway};
pub use noop::NoopChannelApi;

/// Boxed future returned by backend trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Distinguishes physical hardware from simulated/emulated hosts, where the
/// permission concept cannot be satisfied.
pub trait DeviceProfile: Send + Sync {
    fn is_physical_device(&self) -> bool;
}

/// The OS permission-query/prompt API.
pub trait PermissionApi: Send + Sync {
    /// Current grant without prompting.
    fn current_status(&self) -> BoxFuture<'_, NotifyResult<PermissionState>>;

    /// Presents the OS permission dialog and waits on the user's decision.
    fn request_permission(&self) -> BoxFuture<'_, NotifyResult<PermissionState>>;
}

/// The OS notification scheduler.
///
/// `cancel` with an id the scheduler does not track must be a no-op; the OS
/// serializes these operations itself, so no locking is layered on top.
pub trait SchedulerApi: Send + Sync {
    fn submit<'a>(&'a self, scheduled: &'a ScheduledNotification) -> BoxFuture<'a, NotifyResult<()>>;
    fn cancel<'a>(&'a self, id: &'a str) -> BoxFuture<'a, NotifyResult<()>>;
    fn cancel_all(&self) -> BoxFuture<'_, NotifyResult<()>>;
    fn list(&self) -> BoxFuture<'_, NotifyResult<Vec<ScheduledNotification>>>;
}

/// The OS channel/importance API, absent as a concept on some platforms.
/// Registering an existing id overwrites its definition.
pub trait ChannelApi: Send + Sync {
    fn supports_channels(&self) -> bool;
    fn register_channel<'a>(&'a self, channel: &'a Channel) -> BoxFuture<'a, NotifyResult<()>>;
}

/// Opaque handle to one OS-level listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub(crate) u64);

/// OS-level notification event listeners. Registration is synchronous; the
/// events themselves arrive on the platform's callback thread.
pub trait ListenerApi: Send + Sync {
    fn add_received_listener(&self, handler: ReceivedHandler) -> ListenerToken;
    fn add_response_listener(&self, handler: ResponseHandler) -> ListenerToken;
    fn remove_listener(&self, token: ListenerToken);

    /// Number of currently registered listeners. Teardown must drive this
    /// back to zero.
    fn active_listeners(&self) -> usize;
}

/// The OS badge-count store.
pub trait BadgeApi: Send + Sync {
    fn set_badge(&self, count: u32) -> BoxFuture<'_, NotifyResult<()>>;
    fn get_badge(&self) -> BoxFuture<'_, NotifyResult<u32>>;
}

/// The cloud messaging backend that issues push-routing tokens.
pub trait PushGateway: Send + Sync {
    fn issue_token<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, Result<String, TokenError>>;
}

/// The full set of platform collaborators, assembled once at construction
/// time and threaded into the service.
#[derive(Clone)]
pub struct PlatformSuite {
    pub device: Arc<dyn DeviceProfile>,
    pub permissions: Arc<dyn PermissionApi>,
    pub scheduler: Arc<dyn SchedulerApi>,
    pub channels: Arc<dyn ChannelApi>,
    pub listeners: Arc<dyn ListenerApi>,
    pub badge: Arc<dyn BadgeApi>,
    pub push: Arc<dyn PushGateway>,
}

impl PlatformSuite {
    /// Wires the in-process backend for every collaborator, with push
    /// unconfigured. Returns the backend handle alongside the suite so tests
    /// and embedded hosts can inject events and inspect state.
    pub fn in_memory() -> (Self, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let suite = Self {
            device: backend.clone(),
            permissions: backend.clone(),
            scheduler: backend.clone(),
            channels: backend.clone(),
            listeners: backend.clone(),
            badge: backend.clone(),
            push: Arc::new(NullPushGateway),
        };
        (suite, backend)
    }

    pub fn with_push(mut self, push: Arc<dyn PushGateway>) -> Self {
        self.push = push;
        self
    }

    /// Swaps in the verified no-op channel strategy for platforms without a
    /// channel model.
    pub fn without_channels(mut self) -> Self {
        self.channels = Arc::new(NoopChannelApi);
        self
    }
}
