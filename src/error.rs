//! Error taxonomy for the notification core.
//!
//! Expected environment degradations (denied permission, non-physical device,
//! missing push configuration, transport failures while fetching a push token)
//! never surface as errors; they are folded into [`Capabilities`] by the
//! facade. Only caller defects on the scheduling surface and genuinely
//! unexpected platform faults reach callers as `Err`.
//!
//! [`Capabilities`]: crate::service::Capabilities

use thiserror::Error;

/// Caller/input defects detected before a request reaches the OS scheduler.
///
/// These are propagated as rejections so the bug is visible at the call site,
/// unlike environment degradations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulingError {
    /// Both `title` and `body` were empty (or whitespace-only).
    #[error("notification request requires a non-empty title or body")]
    EmptyContent,

    /// An interval trigger was given a zero or negative duration.
    #[error("interval trigger requires a positive number of seconds, got {0}")]
    NonPositiveInterval(i64),
}

/// Push-token acquisition failures. These never escape the
/// [`TokenProvisioner`](crate::components::token::TokenProvisioner); they only
/// select which log level and capability downgrade applies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The cloud messaging backend is not configured for this build.
    #[error("push backend is not configured for this build")]
    NotConfigured,

    /// Network failure, non-success status, or malformed response.
    #[error("push token request failed: {0}")]
    Transport(String),
}

/// Top-level error for the notification core.
///
/// `Clone` so the memoized in-flight initialization can broadcast its result
/// to every concurrent `initialize()` caller.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    /// An OS-level fault outside the expected failure categories.
    #[error("platform error: {0}")]
    Platform(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
