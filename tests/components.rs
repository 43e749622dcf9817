//! Leaf components exercised directly: badge, token, channels, permission.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use notify_core::{
    BadgeSynchronizer, BoxFuture, Channel, ChannelApi, ChannelImportance, ChannelRegistrar,
    MemoryBackend, MemoryPushGateway, NoopChannelApi, NotificationServiceBuilder, NotifyResult,
    PermissionNegotiator, PermissionState, PlatformSuite, TokenProvisioner, Trigger,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn badge_set_then_get_round_trips() {
    let (suite, _backend) = PlatformSuite::in_memory();
    let service = NotificationServiceBuilder::new().with_suite(suite).build();

    service.set_badge_count(5).await.expect("set");
    assert_eq!(service.get_badge_count().await.expect("get"), 5);
}

#[tokio::test]
async fn negative_badge_clamps_to_zero() {
    let (suite, _backend) = PlatformSuite::in_memory();
    let service = NotificationServiceBuilder::new().with_suite(suite).build();

    service.set_badge_count(7).await.expect("set");
    service.set_badge_count(-3).await.expect("set negative");
    assert_eq!(service.get_badge_count().await.expect("get"), 0);
}

#[tokio::test]
async fn badge_mirror_agrees_with_os_value() -> anyhow::Result<()> {
    init_tracing();
    let backend = Arc::new(MemoryBackend::new());
    let badge = BadgeSynchronizer::new(backend.clone());

    assert_eq!(badge.mirrored(), None);
    badge.set(4).await?;
    assert_eq!(badge.mirrored(), Some(4));
    assert_eq!(badge.get().await?, 4);

    badge.set(-10).await?;
    assert_eq!(badge.mirrored(), Some(0));
    assert_eq!(badge.get().await?, 0);
    Ok(())
}

#[tokio::test]
async fn token_provisioner_classifies_outcomes() {
    let issuing = Arc::new(MemoryPushGateway::with_token("token-9"));
    let provisioner = TokenProvisioner::new(issuing.clone());
    assert_eq!(provisioner.acquire(Some("project")).await.as_deref(), Some("token-9"));

    // Missing configuration never reaches the gateway.
    assert_eq!(provisioner.acquire(None).await, None);
    assert_eq!(issuing.issued_count(), 1);

    let unconfigured = TokenProvisioner::new(Arc::new(MemoryPushGateway::not_configured()));
    assert_eq!(unconfigured.acquire(Some("project")).await, None);

    let failing = TokenProvisioner::new(Arc::new(MemoryPushGateway::failing("timeout")));
    assert_eq!(failing.acquire(Some("project")).await, None);
}

#[tokio::test]
async fn channel_re_registration_overwrites() {
    let backend = Arc::new(MemoryBackend::new());
    let registrar = ChannelRegistrar::new(backend.clone());

    registrar
        .register(&Channel::new("default", "Default"))
        .await
        .expect("register");
    registrar
        .register(
            &Channel::new("default", "General")
                .with_importance(ChannelImportance::High)
                .with_vibration_pattern(vec![0, 100]),
        )
        .await
        .expect("re-register");

    assert_eq!(backend.channel_count(), 1);
    let channel = backend.channel("default").expect("channel exists");
    assert_eq!(channel.name, "General");
    assert_eq!(channel.importance, ChannelImportance::High);
}

#[test]
fn noop_channel_strategy_accepts_everything() {
    let api = NoopChannelApi;
    assert!(!api.supports_channels());
    tokio_test::block_on(api.register_channel(&Channel::new("default", "Default")))
        .expect("no-op registration never errors");
}

/// A channel API whose platform reports no channel model; calling into it is
/// a contract violation.
struct ChannellessApi;

impl ChannelApi for ChannellessApi {
    fn supports_channels(&self) -> bool {
        false
    }

    fn register_channel<'a>(&'a self, _channel: &'a Channel) -> BoxFuture<'a, NotifyResult<()>> {
        unreachable!("channelless platforms must never be asked to register")
    }
}

#[tokio::test]
async fn registrar_consults_support_before_registering() {
    init_tracing();
    let registrar = ChannelRegistrar::new(Arc::new(ChannellessApi));

    registrar
        .register(&Channel::new("default", "Default"))
        .await
        .expect("registration short-circuits on channelless platforms");
}

#[tokio::test]
async fn default_channels_register_during_initialization() {
    let (suite, backend) = PlatformSuite::in_memory();
    let service = NotificationServiceBuilder::new().with_suite(suite).build();

    service.initialize().await.expect("initialize");

    assert!(backend.channel("default").is_some());
    assert!(backend.channel("high-priority").is_some());
}

#[tokio::test]
async fn permission_prompt_is_shown_at_most_once() {
    let backend = Arc::new(MemoryBackend::new());
    let negotiator = PermissionNegotiator::new(backend.clone(), backend.clone());

    assert_eq!(negotiator.request().await.expect("request"), PermissionState::Granted);
    assert_eq!(negotiator.request().await.expect("repeat"), PermissionState::Granted);
    assert_eq!(backend.prompt_count(), 1);
}

#[tokio::test]
async fn declined_prompt_reports_denied() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_grant_on_prompt(false);
    let negotiator = PermissionNegotiator::new(backend.clone(), backend.clone());

    assert_eq!(negotiator.request().await.expect("request"), PermissionState::Denied);
    // A recorded denial is read back, never re-prompted.
    assert_eq!(negotiator.request().await.expect("repeat"), PermissionState::Denied);
    assert_eq!(backend.prompt_count(), 1);
}

#[tokio::test]
async fn non_physical_host_never_touches_the_prompt() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_physical_device(false);
    let negotiator = PermissionNegotiator::new(backend.clone(), backend.clone());

    assert_eq!(
        negotiator.request().await.expect("request"),
        PermissionState::Unsupported
    );
    assert_eq!(backend.prompt_count(), 0);
}

#[test]
fn elapsed_date_triggers_resolve_to_immediate() {
    let now = Utc::now();

    let past = Trigger::AtDate {
        date: now - ChronoDuration::seconds(1),
    };
    assert_eq!(past.effective(now), Trigger::Immediate);

    let future_date = now + ChronoDuration::seconds(30);
    let future = Trigger::AtDate { date: future_date };
    assert_eq!(future.effective(now), Trigger::AtDate { date: future_date });

    let interval = Trigger::AfterInterval { seconds: 10 };
    assert_eq!(interval.effective(now), interval);
}
