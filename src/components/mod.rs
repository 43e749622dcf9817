//! Core components of the notification subsystem, leaves first: permission
//! negotiation, channel registration, token provisioning, scheduling,
//! listener lifecycle, and badge synchronization. The
//! [`NotificationService`](crate::service::NotificationService) facade
//! sequences them.

pub mod badge;
pub mod channel;
pub mod listeners;
pub mod permission;
pub mod request;
pub mod scheduling;
pub mod token;

pub use badge::BadgeSynchronizer;
pub use channel::{Channel, ChannelImportance, ChannelRegistrar};
pub use listeners::{ListenerGuard, ListenerHub, ReceivedHandler, ResponseHandler};
pub use permission::{PermissionNegotiator, PermissionState};
pub use request::{
    DataMap, DeliveredNotification, NotificationRequest, NotificationResponse,
    ScheduledNotification, Trigger,
};
pub use scheduling::SchedulingEngine;
pub use token::TokenProvisioner;
