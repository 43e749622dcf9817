//! The `NotificationService` facade.
//!
//! A finite-state instance (no ambient singleton) that sequences permission
//! negotiation, channel registration, listener subscription, and push-token
//! provisioning during `initialize()`, then forwards scheduling, cancellation,
//! and badge calls to the components once ready.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::backends::PlatformSuite;
use crate::components::badge::BadgeSynchronizer;
use crate::components::channel::ChannelRegistrar;
use crate::components::listeners::{ListenerGuard, ListenerHub, ReceivedHandler, ResponseHandler};
use crate::components::permission::{PermissionNegotiator, PermissionState};
use crate::components::request::{NotificationRequest, ScheduledNotification, Trigger};
use crate::components::scheduling::SchedulingEngine;
use crate::components::token::TokenProvisioner;
use crate::config::ServiceConfig;
use crate::error::{NotifyError, NotifyResult};

/// What is actually usable in the current environment, as negotiated during
/// initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Local scheduling is treated as permission-gated: denied permission
    /// disables it uniformly across platforms.
    pub local_scheduling_available: bool,
    /// A push-routing token was provisioned.
    pub push_available: bool,
}

/// Externally observable lifecycle phase of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePhase {
    Uninitialized,
    Initializing,
    Ready,
    /// Initialized, but some requested capability is unusable.
    Degraded,
}

#[derive(Clone)]
struct InitOutcome {
    capabilities: Capabilities,
    permission: PermissionState,
    push_token: Option<String>,
}

type InitSignal = Option<NotifyResult<Capabilities>>;

enum Phase {
    Uninitialized,
    Initializing(watch::Receiver<InitSignal>),
    Initialized(InitOutcome),
}

struct ServiceInner {
    config: ServiceConfig,
    negotiator: PermissionNegotiator,
    registrar: ChannelRegistrar,
    provisioner: TokenProvisioner,
    engine: SchedulingEngine,
    hub: ListenerHub,
    badge: BadgeSynchronizer,
    on_received: ReceivedHandler,
    on_responded: ResponseHandler,
    phase: Mutex<Phase>,
    guard: Mutex<Option<ListenerGuard>>,
    /// Bumped by every `cleanup()`, so an initialization that was torn down
    /// mid-flight does not commit its outcome.
    epoch: AtomicU64,
}

/// Facade over the notification core. Cheap to clone; all clones share the
/// same state machine and listener subscription.
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<ServiceInner>,
}

impl NotificationService {
    pub(crate) fn new(
        config: ServiceConfig,
        suite: PlatformSuite,
        on_received: ReceivedHandler,
        on_responded: ResponseHandler,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                negotiator: PermissionNegotiator::new(suite.device, suite.permissions),
                registrar: ChannelRegistrar::new(suite.channels),
                provisioner: TokenProvisioner::new(suite.push),
                engine: SchedulingEngine::new(suite.scheduler),
                hub: ListenerHub::new(suite.listeners),
                badge: BadgeSynchronizer::new(suite.badge),
                config,
                on_received,
                on_responded,
                phase: Mutex::new(Phase::Uninitialized),
                guard: Mutex::new(None),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Runs the initialization sequence, or joins the one already in flight.
    ///
    /// Concurrent callers observe a single execution and a single listener
    /// subscription; all of them resolve to the same [`Capabilities`].
    /// Expected failures (denied permission, unsupported device, missing or
    /// failing push configuration) degrade capabilities instead of erroring;
    /// only unexpected platform faults reject, after which the service is
    /// back in `Uninitialized` and may be retried.
    pub async fn initialize(&self) -> NotifyResult<Capabilities> {
        enum Entry {
            Done(Capabilities),
            Waiter(watch::Receiver<InitSignal>),
            Owner(watch::Sender<InitSignal>, u64),
        }

        let entry = {
            let mut phase = self.inner.phase.lock();
            match &*phase {
                Phase::Initialized(outcome) => Entry::Done(outcome.capabilities),
                Phase::Initializing(rx) => Entry::Waiter(rx.clone()),
                Phase::Uninitialized => {
                    let (tx, rx) = watch::channel(None);
                    *phase = Phase::Initializing(rx);
                    Entry::Owner(tx, self.inner.epoch.load(Ordering::Acquire))
                },
            }
        };

        match entry {
            Entry::Done(capabilities) => Ok(capabilities),
            Entry::Waiter(rx) => Self::await_in_flight(rx).await,
            Entry::Owner(tx, epoch) => {
                let result = match self.run_initialize().await {
                    Ok((outcome, guard)) => {
                        let capabilities = outcome.capabilities;
                        let mut phase = self.inner.phase.lock();
                        if self.inner.epoch.load(Ordering::Acquire) == epoch {
                            *phase = Phase::Initialized(outcome);
                            *self.inner.guard.lock() = Some(guard);
                        } else {
                            // Torn down mid-flight; the teardown wins and the
                            // fresh listeners are released rather than leaked.
                            drop(phase);
                            tracing::debug!("teardown raced initialization; releasing listeners");
                            guard.dispose();
                        }
                        Ok(capabilities)
                    },
                    Err(err) => {
                        let mut phase = self.inner.phase.lock();
                        // Reset only our own in-flight marker; a teardown (or
                        // a later initialization) may already own the phase.
                        let ours = matches!(
                            &*phase,
                            Phase::Initializing(rx) if rx.same_channel(&tx.subscribe())
                        );
                        if ours {
                            *phase = Phase::Uninitialized;
                        }
                        drop(phase);
                        Err(err)
                    },
                };
                let _ = tx.send(Some(result.clone()));
                result
            },
        }
    }

    async fn await_in_flight(mut rx: watch::Receiver<InitSignal>) -> NotifyResult<Capabilities> {
        loop {
            if let Some(result) = rx.borrow_and_update().clone() {
                return result;
            }
            if rx.changed().await.is_err() {
                return Err(NotifyError::Platform(
                    "initialization aborted before completing".into(),
                ));
            }
        }
    }

    async fn run_initialize(&self) -> NotifyResult<(InitOutcome, ListenerGuard)> {
        let inner = &self.inner;

        // The permission step is the only one allowed to reject, and only for
        // faults outside the expected categories. It runs before any listener
        // is registered, so an error here leaves nothing to release.
        let permission = inner.negotiator.request().await?;

        for channel in &inner.config.channels {
            if let Err(err) = inner.registrar.register(channel).await {
                tracing::warn!(channel = %channel.id, error = %err, "channel registration failed; continuing");
            }
        }

        // The guard stays local until the caller commits the outcome, so a
        // teardown that lands mid-flight cannot leave it stranded.
        let guard = inner
            .hub
            .subscribe(inner.on_received.clone(), inner.on_responded.clone());

        // Best-effort: a token is only worth chasing once the user has
        // granted presentation on real hardware.
        let push_token = if permission.is_granted() {
            inner
                .provisioner
                .acquire(inner.config.project_id.as_deref())
                .await
        } else {
            tracing::debug!(state = ?permission, "skipping push token acquisition");
            None
        };

        let capabilities = Capabilities {
            local_scheduling_available: permission != PermissionState::Denied,
            push_available: push_token.is_some(),
        };
        tracing::info!(
            local = capabilities.local_scheduling_available,
            push = capabilities.push_available,
            state = ?permission,
            "notification service initialized"
        );

        Ok((
            InitOutcome {
                capabilities,
                permission,
                push_token,
            },
            guard,
        ))
    }

    /// Current lifecycle phase. `Degraded` means initialized with local
    /// scheduling unavailable, or push requested (a project id is configured)
    /// but unprovisioned.
    pub fn status(&self) -> ServicePhase {
        let phase = self.inner.phase.lock();
        match &*phase {
            Phase::Uninitialized => ServicePhase::Uninitialized,
            Phase::Initializing(_) => ServicePhase::Initializing,
            Phase::Initialized(outcome) => {
                let push_missing =
                    self.inner.config.project_id.is_some() && !outcome.capabilities.push_available;
                if !outcome.capabilities.local_scheduling_available || push_missing {
                    ServicePhase::Degraded
                } else {
                    ServicePhase::Ready
                }
            },
        }
    }

    /// Capability summary from the last completed initialization.
    pub fn capabilities(&self) -> Option<Capabilities> {
        match &*self.inner.phase.lock() {
            Phase::Initialized(outcome) => Some(outcome.capabilities),
            _ => None,
        }
    }

    /// Permission state negotiated by the last completed initialization.
    pub fn permission_state(&self) -> Option<PermissionState> {
        match &*self.inner.phase.lock() {
            Phase::Initialized(outcome) => Some(outcome.permission),
            _ => None,
        }
    }

    /// The provisioned push-routing token, if any.
    pub fn push_token(&self) -> Option<String> {
        match &*self.inner.phase.lock() {
            Phase::Initialized(outcome) => outcome.push_token.clone(),
            _ => None,
        }
    }

    // Delegated operations queue behind any in-flight initialization; on a
    // service that was never initialized they start one.
    async fn ensure_initialized(&self) -> NotifyResult<()> {
        self.initialize().await.map(|_| ())
    }

    pub async fn schedule_notification(
        &self,
        request: NotificationRequest,
        trigger: Trigger,
    ) -> NotifyResult<String> {
        self.ensure_initialized().await?;
        self.inner.engine.schedule(request, trigger).await
    }

    pub async fn schedule_at(
        &self,
        request: NotificationRequest,
        date: chrono::DateTime<chrono::Utc>,
    ) -> NotifyResult<String> {
        self.ensure_initialized().await?;
        self.inner.engine.schedule_at(request, date).await
    }

    pub async fn schedule_after(
        &self,
        request: NotificationRequest,
        seconds: i64,
    ) -> NotifyResult<String> {
        self.ensure_initialized().await?;
        self.inner.engine.schedule_after(request, seconds).await
    }

    pub async fn cancel(&self, id: &str) -> NotifyResult<()> {
        self.ensure_initialized().await?;
        self.inner.engine.cancel(id).await
    }

    pub async fn cancel_all(&self) -> NotifyResult<()> {
        self.ensure_initialized().await?;
        self.inner.engine.cancel_all().await
    }

    pub async fn list_scheduled(&self) -> NotifyResult<Vec<ScheduledNotification>> {
        self.ensure_initialized().await?;
        self.inner.engine.list_scheduled().await
    }

    pub async fn set_badge_count(&self, count: i64) -> NotifyResult<()> {
        self.ensure_initialized().await?;
        self.inner.badge.set(count).await
    }

    pub async fn get_badge_count(&self) -> NotifyResult<u32> {
        self.ensure_initialized().await?;
        self.inner.badge.get().await
    }

    /// Releases the listener subscription and resets to `Uninitialized`.
    /// Idempotent: a second call finds nothing to release. A teardown that
    /// lands while an initialization is in flight wins: the initialization
    /// finishes but discards its outcome and releases its listeners. A later
    /// `initialize()` re-runs the full sequence.
    pub fn cleanup(&self) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        let guard = {
            let mut phase = self.inner.phase.lock();
            *phase = Phase::Uninitialized;
            self.inner.guard.lock().take()
        };
        if let Some(guard) = guard {
            guard.dispose();
        }
        tracing::debug!("notification service torn down");
    }
}
