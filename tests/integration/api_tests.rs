//! API integration tests
//!
//! Exercised against a live LMS server. Run with:
//! `LMS_API_BASE_URL=... LMS_API_TOKEN=... cargo test -- --ignored`

use std::env;

use uuid::Uuid;

use circulation_desk::{
    config::{ApiConfig, AuthConfig},
    models::Policy,
    remote::{HttpClient, RemoteApi},
    services::Services,
};

fn remote() -> RemoteApi {
    let api = ApiConfig {
        base_url: env::var("LMS_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080/lms/api/v1".to_string()),
        ..ApiConfig::default()
    };
    let auth = AuthConfig {
        token: env::var("LMS_API_TOKEN").ok(),
    };
    let http = HttpClient::new(&api, &auth).expect("Failed to build HTTP client");
    RemoteApi::new(http)
}

fn library_id() -> Uuid {
    env::var("LMS_LIBRARY_ID")
        .expect("LMS_LIBRARY_ID must be set")
        .parse()
        .expect("LMS_LIBRARY_ID must be a UUID")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_list_reservations() {
    let remote = remote();

    let reservations = remote
        .reservations
        .list()
        .await
        .expect("Failed to list reservations");

    // Only active, unexpired reservations come back
    for reservation in &reservations {
        assert!(!reservation.status.is_terminal());
    }
}

#[tokio::test]
#[ignore]
async fn test_list_borrows() {
    let remote = remote();

    let borrows = remote.borrows.list().await.expect("Failed to list borrows");

    for borrow in &borrows {
        if let Some(due) = borrow.return_date {
            assert!(due > borrow.borrow_date);
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_queues_refresh_twice_yields_identical_lists() {
    let mut queues = Services::new(remote()).queues();

    queues.refresh().await.expect("Failed to refresh queues");
    let first: Vec<_> = queues.check_out_queue().to_vec();

    queues.refresh().await.expect("Failed to refresh queues");
    assert_eq!(queues.check_out_queue(), first.as_slice());
}

#[tokio::test]
#[ignore]
async fn test_get_library() {
    let remote = remote();

    let library = remote
        .libraries
        .get(library_id())
        .await
        .expect("Failed to fetch library");

    assert!(!library.name.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_policy_round_trip() {
    let services = Services::new(remote());
    let library_id = library_id();

    let draft = Policy {
        policy_id: services
            .policies
            .load(library_id)
            .await
            .expect("Failed to load policy")
            .and_then(|p| p.policy_id),
        library_id,
        max_borrow_days: 14,
        fine_per_day: "12.50".parse().unwrap(),
        max_books_per_user: 5,
        reservation_expiry_days: 3,
    };

    let saved = services
        .policies
        .save(&draft)
        .await
        .expect("Failed to save policy");
    assert!(saved.policy_id.is_some());

    let reloaded = services
        .policies
        .load(library_id)
        .await
        .expect("Failed to reload policy")
        .expect("Policy should exist after save");

    assert_eq!(reloaded.fine_per_day, draft.fine_per_day);
    assert_eq!(reloaded.max_borrow_days, 14);
    assert_eq!(reloaded.max_books_per_user, 5);
    assert_eq!(reloaded.reservation_expiry_days, 3);
}
