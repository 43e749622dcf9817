//! In-process backend.
//!
//! A deterministic stand-in for the OS collaborators, used by the test suite
//! and by embedded hosts that run without a platform notification stack.
//! Permission behavior, device classification, and failure injection are all
//! configurable, and delivery/response events are driven explicitly through
//! [`MemoryBackend::deliver`] and [`MemoryBackend::respond`].

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::backends::{
    BadgeApi, BoxFuture, ChannelApi, DeviceProfile, ListenerApi, ListenerToken, PermissionApi,
    PushGateway, SchedulerApi,
};
use crate::components::channel::Channel;
use crate::components::listeners::{ReceivedHandler, ResponseHandler};
use crate::components::permission::PermissionState;
use crate::components::request::{
    DeliveredNotification, NotificationResponse, ScheduledNotification,
};
use crate::error::{NotifyError, NotifyResult, TokenError};

enum ListenerEntry {
    Received(ReceivedHandler),
    Responded(ResponseHandler),
}

pub struct MemoryBackend {
    physical: AtomicBool,
    permission: Mutex<PermissionState>,
    grant_on_prompt: AtomicBool,
    prompt_count: AtomicUsize,
    prompt_delay: Mutex<Option<std::time::Duration>>,
    permission_fault: Mutex<Option<String>>,
    schedules: DashMap<String, ScheduledNotification>,
    channels: DashMap<String, Channel>,
    badge: AtomicU32,
    listeners: DashMap<u64, ListenerEntry>,
    next_listener: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            physical: AtomicBool::new(true),
            permission: Mutex::new(PermissionState::Undetermined),
            grant_on_prompt: AtomicBool::new(true),
            prompt_count: AtomicUsize::new(0),
            prompt_delay: Mutex::new(None),
            permission_fault: Mutex::new(None),
            schedules: DashMap::new(),
            channels: DashMap::new(),
            badge: AtomicU32::new(0),
            listeners: DashMap::new(),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Classify the host as physical hardware or a simulator.
    pub fn set_physical_device(&self, physical: bool) {
        self.physical.store(physical, Ordering::Relaxed);
    }

    /// Seed the recorded permission decision.
    pub fn set_permission(&self, state: PermissionState) {
        *self.permission.lock() = state;
    }

    /// Whether the simulated user accepts the prompt.
    pub fn set_grant_on_prompt(&self, grant: bool) {
        self.grant_on_prompt.store(grant, Ordering::Relaxed);
    }

    /// Hold the permission prompt open for `delay`, so tests can overlap
    /// concurrent initializations at a real suspension point.
    pub fn set_prompt_delay(&self, delay: std::time::Duration) {
        *self.prompt_delay.lock() = Some(delay);
    }

    /// Make the next permission queries fail with a platform fault.
    pub fn fail_permission_with(&self, message: impl Into<String>) {
        *self.permission_fault.lock() = Some(message.into());
    }

    /// Restore fault-free permission queries.
    pub fn clear_permission_fault(&self) {
        *self.permission_fault.lock() = None;
    }

    /// How many times the user has been prompted.
    pub fn prompt_count(&self) -> usize {
        self.prompt_count.load(Ordering::Relaxed)
    }

    pub fn channel(&self, id: &str) -> Option<Channel> {
        self.channels.get(id).map(|entry| entry.value().clone())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Fires a pending schedule: removes it from the active set and invokes
    /// every received-listener. Returns `None` when the id is not pending.
    pub fn deliver(&self, id: &str) -> Option<DeliveredNotification> {
        let (_, scheduled) = self.schedules.remove(id)?;
        let delivered = DeliveredNotification {
            id: scheduled.id,
            request: scheduled.request,
            delivered_at: Utc::now(),
        };

        for handler in self.received_handlers() {
            handler(delivered.clone());
        }
        Some(delivered)
    }

    /// Simulates the user acting on a delivered notification.
    pub fn respond(&self, delivered: &DeliveredNotification, action_id: Option<&str>) {
        let response = NotificationResponse {
            notification: delivered.clone(),
            action_id: action_id.map(Into::into),
        };
        for handler in self.response_handlers() {
            handler(response.clone());
        }
    }

    // Handlers are collected before invocation so a callback that touches the
    // backend cannot deadlock the listener table.
    fn received_handlers(&self) -> Vec<ReceivedHandler> {
        self.listeners
            .iter()
            .filter_map(|entry| match entry.value() {
                ListenerEntry::Received(handler) => Some(handler.clone()),
                ListenerEntry::Responded(_) => None,
            })
            .collect()
    }

    fn response_handlers(&self) -> Vec<ResponseHandler> {
        self.listeners
            .iter()
            .filter_map(|entry| match entry.value() {
                ListenerEntry::Responded(handler) => Some(handler.clone()),
                ListenerEntry::Received(_) => None,
            })
            .collect()
    }

    fn check_permission_fault(&self) -> NotifyResult<()> {
        match self.permission_fault.lock().as_ref() {
            Some(message) => Err(NotifyError::Platform(message.clone())),
            None => Ok(()),
        }
    }
}

impl DeviceProfile for MemoryBackend {
    fn is_physical_device(&self) -> bool {
        self.physical.load(Ordering::Relaxed)
    }
}

impl PermissionApi for MemoryBackend {
    fn current_status(&self) -> BoxFuture<'_, NotifyResult<PermissionState>> {
        Box::pin(async move {
            self.check_permission_fault()?;
            Ok(*self.permission.lock())
        })
    }

    fn request_permission(&self) -> BoxFuture<'_, NotifyResult<PermissionState>> {
        Box::pin(async move {
            self.check_permission_fault()?;
            let delay = *self.prompt_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.prompt_count.fetch_add(1, Ordering::Relaxed);
            let decided = if self.grant_on_prompt.load(Ordering::Relaxed) {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
            *self.permission.lock() = decided;
            Ok(decided)
        })
    }
}

impl SchedulerApi for MemoryBackend {
    fn submit<'a>(&'a self, scheduled: &'a ScheduledNotification) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            self.schedules.insert(scheduled.id.clone(), scheduled.clone());
            Ok(())
        })
    }

    fn cancel<'a>(&'a self, id: &'a str) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            self.schedules.remove(id);
            Ok(())
        })
    }

    fn cancel_all(&self) -> BoxFuture<'_, NotifyResult<()>> {
        Box::pin(async move {
            self.schedules.clear();
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, NotifyResult<Vec<ScheduledNotification>>> {
        Box::pin(async move {
            Ok(self
                .schedules
                .iter()
                .map(|entry| entry.value().clone())
                .collect())
        })
    }
}

impl ChannelApi for MemoryBackend {
    fn supports_channels(&self) -> bool {
        true
    }

    fn register_channel<'a>(&'a self, channel: &'a Channel) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            self.channels.insert(channel.id.clone(), channel.clone());
            Ok(())
        })
    }
}

impl ListenerApi for MemoryBackend {
    fn add_received_listener(&self, handler: ReceivedHandler) -> ListenerToken {
        let token = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(token, ListenerEntry::Received(handler));
        ListenerToken(token)
    }

    fn add_response_listener(&self, handler: ResponseHandler) -> ListenerToken {
        let token = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(token, ListenerEntry::Responded(handler));
        ListenerToken(token)
    }

    fn remove_listener(&self, token: ListenerToken) {
        self.listeners.remove(&token.0);
    }

    fn active_listeners(&self) -> usize {
        self.listeners.len()
    }
}

impl BadgeApi for MemoryBackend {
    fn set_badge(&self, count: u32) -> BoxFuture<'_, NotifyResult<()>> {
        Box::pin(async move {
            self.badge.store(count, Ordering::Relaxed);
            Ok(())
        })
    }

    fn get_badge(&self) -> BoxFuture<'_, NotifyResult<u32>> {
        Box::pin(async move { Ok(self.badge.load(Ordering::Relaxed)) })
    }
}

/// Push gateway with a scripted outcome, for exercising the provisioner's
/// failure classification.
pub struct MemoryPushGateway {
    outcome: Mutex<Result<String, TokenError>>,
    issued: AtomicUsize,
}

impl MemoryPushGateway {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            outcome: Mutex::new(Ok(token.into())),
            issued: AtomicUsize::new(0),
        }
    }

    pub fn not_configured() -> Self {
        Self {
            outcome: Mutex::new(Err(TokenError::NotConfigured)),
            issued: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Mutex::new(Err(TokenError::Transport(message.into()))),
            issued: AtomicUsize::new(0),
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.load(Ordering::Relaxed)
    }
}

impl PushGateway for MemoryPushGateway {
    fn issue_token<'a>(&'a self, _project_id: &'a str) -> BoxFuture<'a, Result<String, TokenError>> {
        Box::pin(async move {
            self.issued.fetch_add(1, Ordering::Relaxed);
            self.outcome.lock().clone()
        })
    }
}
