#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;

use apcups_core::{CoreError, PollConfig, PollStatus, UpsCoordinator};
use apcups_snmp::{OidKey, UpsValue, oid::apc};

use common::{auth_error, client, connection_error, poll_outcome};

const CONFIG: PollConfig = PollConfig {
    interval: Duration::from_secs(60),
};

fn capacity(coordinator: &UpsCoordinator<common::ScriptedSession>) -> UpsValue {
    coordinator
        .current_snapshot()
        .unwrap()
        .value(&OidKey::new(apc::BATTERY_CAPACITY))
}

#[tokio::test(start_paused = true)]
async fn first_refresh_publishes_a_fresh_snapshot() {
    let coordinator = UpsCoordinator::new(client(vec![Ok(poll_outcome(100))]), CONFIG);

    coordinator.first_refresh().await.unwrap();

    assert_eq!(coordinator.status(), PollStatus::Fresh);
    assert_eq!(capacity(&coordinator), UpsValue::Int(100));
    coordinator.close().await;
}

#[tokio::test(start_paused = true)]
async fn first_refresh_failure_comes_back_to_the_caller() {
    let coordinator = UpsCoordinator::new(client(vec![Err(connection_error())]), CONFIG);

    let err = coordinator.first_refresh().await.unwrap_err();

    assert!(matches!(err, CoreError::NotReady { .. }));
    assert_eq!(coordinator.status(), PollStatus::Pending);
    assert!(coordinator.current_snapshot().is_none());

    // No background task was started.
    let mut rx = coordinator.subscribe();
    let waited = tokio::time::timeout(Duration::from_secs(300), rx.changed()).await;
    assert!(waited.is_err());
}

#[tokio::test(start_paused = true)]
async fn failed_cycle_keeps_the_last_snapshot_and_marks_it_stale() {
    let coordinator = UpsCoordinator::new(
        client(vec![Ok(poll_outcome(100)), Err(connection_error())]),
        CONFIG,
    );
    coordinator.first_refresh().await.unwrap();

    let mut rx = coordinator.subscribe();
    rx.changed().await.unwrap();

    assert_eq!(coordinator.status(), PollStatus::Stale);
    assert_eq!(capacity(&coordinator), UpsValue::Int(100));
    coordinator.close().await;
}

#[tokio::test(start_paused = true)]
async fn recovery_after_a_stale_cycle_goes_back_to_fresh() {
    let coordinator = UpsCoordinator::new(
        client(vec![
            Ok(poll_outcome(100)),
            Err(connection_error()),
            Ok(poll_outcome(97)),
        ]),
        CONFIG,
    );
    coordinator.first_refresh().await.unwrap();

    let mut rx = coordinator.subscribe();
    rx.changed().await.unwrap();
    assert_eq!(coordinator.status(), PollStatus::Stale);

    rx.changed().await.unwrap();
    assert_eq!(coordinator.status(), PollStatus::Fresh);
    assert_eq!(capacity(&coordinator), UpsValue::Int(97));
    coordinator.close().await;
}

#[tokio::test(start_paused = true)]
async fn auth_failure_suspends_polling() {
    let coordinator = UpsCoordinator::new(
        client(vec![Ok(poll_outcome(100)), Err(auth_error())]),
        CONFIG,
    );
    coordinator.first_refresh().await.unwrap();

    let mut rx = coordinator.subscribe();
    rx.changed().await.unwrap();
    assert_eq!(coordinator.status(), PollStatus::AuthRequired);

    // The poll task has stopped; nothing further is published.
    let waited = tokio::time::timeout(Duration::from_secs(300), rx.changed()).await;
    assert!(waited.is_err());
    coordinator.close().await;
}

#[tokio::test(start_paused = true)]
async fn reauthenticate_swaps_the_client_and_resumes() {
    let coordinator = UpsCoordinator::new(client(vec![Err(auth_error())]), CONFIG);

    let err = coordinator.first_refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthRequired { .. }));
    assert_eq!(coordinator.status(), PollStatus::AuthRequired);

    coordinator
        .reauthenticate(client(vec![Ok(poll_outcome(95)), Ok(poll_outcome(94))]))
        .await
        .unwrap();
    assert_eq!(coordinator.status(), PollStatus::Fresh);
    assert_eq!(capacity(&coordinator), UpsValue::Int(95));

    // Periodic polling runs against the new client.
    let mut rx = coordinator.subscribe();
    rx.changed().await.unwrap();
    assert_eq!(capacity(&coordinator), UpsValue::Int(94));
    coordinator.close().await;
}

#[tokio::test(start_paused = true)]
async fn subscribers_are_notified_even_when_values_repeat() {
    let coordinator = UpsCoordinator::new(
        client(vec![
            Ok(poll_outcome(100)),
            Ok(poll_outcome(100)),
            Ok(poll_outcome(100)),
        ]),
        CONFIG,
    );
    coordinator.first_refresh().await.unwrap();

    let mut rx = coordinator.subscribe();
    rx.changed().await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(coordinator.status(), PollStatus::Fresh);
    coordinator.close().await;
}

#[tokio::test(start_paused = true)]
async fn close_stops_the_poll_task() {
    let coordinator = UpsCoordinator::new(
        client(vec![Ok(poll_outcome(100)), Ok(poll_outcome(99))]),
        CONFIG,
    );
    coordinator.first_refresh().await.unwrap();
    coordinator.close().await;

    let mut rx = coordinator.subscribe();
    let waited = tokio::time::timeout(Duration::from_secs(300), rx.changed()).await;
    assert!(waited.is_err());
    assert_eq!(capacity(&coordinator), UpsValue::Int(100));
}
