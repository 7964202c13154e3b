//! Integration tests for 429 retry behavior
//!
//! Verify that Retry-After is honoured, that the retry ceiling is enforced
//! and that other failures are returned without retrying.

use std::sync::Arc;
use std::time::Duration;
use tft_ingest::client::LeagueList;
use tft_ingest::fetcher::{FetchError, TransportResponse};

use crate::support::{fetcher, ladder_json, ScriptedTransport};

const URL: &str = "http://stub/na1/tft/league/v1/challenger";

#[tokio::test(start_paused = true)]
async fn test_retry_after_delays_retry_and_returns_payload() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(TransportResponse::too_many_requests(Some("2"))),
        Ok(TransportResponse::ok(ladder_json("CHALLENGER", &["p1", "p2"]))),
    ]));
    let fetcher = fetcher(transport.clone(), 5);

    let list: LeagueList = fetcher.get_json(URL).await.unwrap();
    assert_eq!(list.entries.len(), 2);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, requests[1].0);
    assert!(requests[1].1 - requests[0].1 >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_missing_retry_after_waits_default() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(TransportResponse::too_many_requests(None)),
        Ok(TransportResponse::ok("[]")),
    ]));
    let fetcher = fetcher(transport.clone(), 5);

    let ids: Vec<String> = fetcher.get_json(URL).await.unwrap();
    assert!(ids.is_empty());

    let requests = transport.requests();
    assert!(requests[1].1 - requests[0].1 >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_grows_when_retry_after_is_short() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(TransportResponse::too_many_requests(Some("1"))),
        Ok(TransportResponse::too_many_requests(Some("1"))),
        Ok(TransportResponse::too_many_requests(Some("1"))),
        Ok(TransportResponse::ok("[]")),
    ]));
    let fetcher = fetcher(transport.clone(), 5);

    let _: Vec<String> = fetcher.get_json(URL).await.unwrap();

    let times: Vec<_> = transport.requests().into_iter().map(|(_, t)| t).collect();
    assert_eq!(times.len(), 4);
    assert!(times[1] - times[0] >= Duration::from_secs(1));
    assert!(times[2] - times[1] >= Duration::from_secs(2));
    assert!(times[3] - times[2] >= Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_retry_ceiling_returns_rate_limit_exhausted() {
    let responses = (0..10)
        .map(|_| Ok(TransportResponse::too_many_requests(Some("1"))))
        .collect();
    let transport = Arc::new(ScriptedTransport::new(responses));
    let fetcher = fetcher(transport.clone(), 2);

    let err = fetcher.get_json::<LeagueList>(URL).await.unwrap_err();
    match err {
        FetchError::RateLimitExhausted { attempts, ref url } => {
            assert_eq!(attempts, 3);
            assert_eq!(url, URL);
        }
        other => panic!("expected RateLimitExhausted, got {other:?}"),
    }
    assert_eq!(err.status(), Some(429));
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(TransportResponse::status(500)),
        Ok(TransportResponse::ok("[]")),
    ]));
    let fetcher = fetcher(transport.clone(), 5);

    let err = fetcher.get_json::<Vec<String>>(URL).await.unwrap_err();
    assert!(matches!(err, FetchError::Http { status: 500, .. }));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Err(FetchError::Transport("connection reset".to_string())),
        Ok(TransportResponse::ok("[]")),
    ]));
    let fetcher = fetcher(transport.clone(), 5);

    let err = fetcher.get_json::<Vec<String>>(URL).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    assert_eq!(err.status(), None);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_body_is_decode_error() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(TransportResponse::ok(
        "{\"entries\": [",
    ))]));
    let fetcher = fetcher(transport, 5);

    let err = fetcher.get_json::<LeagueList>(URL).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_fetcher_reports_configured_ceiling() {
    let fetcher = fetcher(Arc::new(ScriptedTransport::default()), 7);
    assert_eq!(fetcher.max_retries(), 7);
}
