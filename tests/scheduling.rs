//! Scheduling, cancellation, and enumeration semantics.

use std::collections::HashSet;

use chrono::{Duration as ChronoDuration, Utc};
use notify_core::{
    NotificationRequest, NotificationService, NotificationServiceBuilder, NotifyError,
    PlatformSuite, SchedulingError, Trigger,
};

fn service() -> NotificationService {
    let (suite, _backend) = PlatformSuite::in_memory();
    NotificationServiceBuilder::new().with_suite(suite).build()
}

fn request(label: &str) -> NotificationRequest {
    NotificationRequest::new(label, format!("{label} body"))
}

#[tokio::test]
async fn issued_ids_are_pairwise_distinct() {
    let service = service();

    let mut ids = HashSet::new();
    for n in 0..5 {
        let id = service
            .schedule_after(request(&format!("n{n}")), 60)
            .await
            .expect("schedule");
        ids.insert(id);
    }
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn empty_title_and_body_reject() {
    let service = service();

    for (title, body) in [("", ""), ("   ", "\t")] {
        let err = service
            .schedule_notification(NotificationRequest::new(title, body), Trigger::Immediate)
            .await
            .expect_err("empty content is a caller defect");
        assert!(matches!(
            err,
            NotifyError::Scheduling(SchedulingError::EmptyContent)
        ));
    }

    // One non-empty field is enough.
    service
        .schedule_notification(NotificationRequest::new("", "body only"), Trigger::Immediate)
        .await
        .expect("body-only request is valid");
}

#[tokio::test]
async fn non_positive_intervals_reject() {
    let service = service();

    for seconds in [0, -1] {
        let err = service
            .schedule_after(request("interval"), seconds)
            .await
            .expect_err("non-positive interval");
        assert!(matches!(
            err,
            NotifyError::Scheduling(SchedulingError::NonPositiveInterval(s)) if s == seconds
        ));
    }

    let id = service
        .schedule_after(request("interval"), 5)
        .await
        .expect("positive interval");
    assert!(!id.is_empty());
}

#[tokio::test]
async fn raw_interval_triggers_are_validated_too() {
    let service = service();

    // The generic entry point enforces the same contract as the sugar.
    for seconds in [0, -5] {
        let err = service
            .schedule_notification(request("raw"), Trigger::AfterInterval { seconds })
            .await
            .expect_err("non-positive interval via raw trigger");
        assert!(matches!(
            err,
            NotifyError::Scheduling(SchedulingError::NonPositiveInterval(s)) if s == seconds
        ));
    }

    let listed = service.list_scheduled().await.expect("list");
    assert!(listed.is_empty());

    service
        .schedule_notification(request("raw"), Trigger::AfterInterval { seconds: 5 })
        .await
        .expect("positive interval via raw trigger");
}

#[tokio::test]
async fn cancel_removes_id_from_enumeration() {
    let service = service();

    let id = service.schedule_after(request("a"), 60).await.expect("schedule");
    service.cancel(&id).await.expect("cancel");

    let listed = service.list_scheduled().await.expect("list");
    assert!(listed.iter().all(|scheduled| scheduled.id != id));
}

#[tokio::test]
async fn cancel_is_idempotent_for_any_id() {
    let service = service();

    let id = service.schedule_after(request("a"), 60).await.expect("schedule");
    service.cancel(&id).await.expect("first cancel");
    service.cancel(&id).await.expect("second cancel is a no-op");
    service
        .cancel("never-issued-id")
        .await
        .expect("unknown id is a no-op");
}

#[tokio::test]
async fn cancel_all_empties_the_schedule_set() {
    let service = service();

    for n in 0..4 {
        service
            .schedule_after(request(&format!("n{n}")), 60)
            .await
            .expect("schedule");
    }
    service.cancel_all().await.expect("cancel all");

    let listed = service.list_scheduled().await.expect("list");
    assert!(listed.is_empty());

    // Repeating on an empty set stays a no-op.
    service.cancel_all().await.expect("cancel all again");
}

#[tokio::test]
async fn cancelling_one_of_three_leaves_the_other_two() {
    let service = service();

    let first = service.schedule_after(request("first"), 5).await.expect("first");
    let second = service.schedule_after(request("second"), 10).await.expect("second");
    let third = service
        .schedule_notification(request("third"), Trigger::Immediate)
        .await
        .expect("third");

    service.cancel(&second).await.expect("cancel second");

    // Enumeration order is OS-determined; compare as a set.
    let listed: HashSet<String> = service
        .list_scheduled()
        .await
        .expect("list")
        .into_iter()
        .map(|scheduled| scheduled.id)
        .collect();
    let expected: HashSet<String> = [first, third].into_iter().collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn past_date_trigger_fires_immediately() {
    let service = service();

    let id = service
        .schedule_at(request("elapsed"), Utc::now() - ChronoDuration::minutes(5))
        .await
        .expect("schedule");

    let listed = service.list_scheduled().await.expect("list");
    let scheduled = listed
        .iter()
        .find(|scheduled| scheduled.id == id)
        .expect("still enumerated");
    assert_eq!(scheduled.trigger, Trigger::Immediate);
}

#[tokio::test]
async fn future_date_trigger_is_preserved() {
    let service = service();
    let date = Utc::now() + ChronoDuration::hours(2);

    let id = service.schedule_at(request("later"), date).await.expect("schedule");

    let listed = service.list_scheduled().await.expect("list");
    let scheduled = listed
        .iter()
        .find(|scheduled| scheduled.id == id)
        .expect("enumerated");
    assert_eq!(scheduled.trigger, Trigger::AtDate { date });
}
