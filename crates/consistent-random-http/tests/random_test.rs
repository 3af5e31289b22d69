//! Integration tests for request-scoped random values.

mod common;

use axum::http::StatusCode;
use consistent_random_core::{ConsistentRandom, DeterministicRng, scope};

#[tokio::test]
async fn test_same_seed_header_reproduces_values() {
    let (status, first) =
        common::get_json(common::build_test_app(), "/random/foo?size=32", Some("abc")).await;
    let (_, second) =
        common::get_json(common::build_test_app(), "/random/foo?size=32", Some("abc")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["scope_seed"], "abc");
    assert_eq!(first["hex_bytes"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_server_values_match_client_scope() {
    let (_, json) = common::get_json(common::build_test_app(), "/random/foo", Some("123")).await;

    let (seed, rand) = scope(123, || {
        let generator = ConsistentRandom::new("foo");
        (generator.seed(), generator.rand())
    });
    assert_eq!(json["seed"].as_u64(), Some(seed));
    assert!((json["rand"].as_f64().unwrap() - rand).abs() < 1e-12);
}

#[tokio::test]
async fn test_requests_without_seed_are_independent() {
    let (_, first) = common::get_json(common::build_test_app(), "/random/foo", None).await;
    let (_, second) = common::get_json(common::build_test_app(), "/random/foo", None).await;

    assert!(first["scope_seed"].is_string());
    assert_ne!(first["scope_seed"], second["scope_seed"]);
    assert_ne!(first["seed"], second["seed"]);
}

#[tokio::test]
async fn test_ranged_value_is_within_bounds() {
    let (status, json) =
        common::get_json(common::build_test_app(), "/random/die?min=1&max=6", None).await;

    assert_eq!(status, StatusCode::OK);
    let ranged = json["ranged"].as_i64().unwrap();
    assert!((1..=6).contains(&ranged));
}

#[tokio::test]
async fn test_half_open_range_returns_400() {
    let (status, json) =
        common::get_json(common::build_test_app(), "/random/die?min=1", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_range");
}

#[tokio::test]
async fn test_rolls_follow_the_names_seeded_stream() {
    let (status, json) = common::get_json(
        common::build_test_app(),
        "/random/dice?rolls=5&sides=20",
        Some("table-1"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let expected = scope("table-1", || ConsistentRandom::new("dice").rng().rolls(5, 20));
    let rolls: Vec<u32> = serde_json::from_value(json["rolls"].clone()).unwrap();
    assert_eq!(rolls, expected);
    assert!(rolls.iter().all(|roll| (1..=20).contains(roll)));
}

#[tokio::test]
async fn test_rolls_default_to_none() {
    let (_, json) = common::get_json(common::build_test_app(), "/random/dice", None).await;
    assert_eq!(json["rolls"], serde_json::json!([]));
}
