//! Unit tests for API client URL construction

use std::sync::Arc;
use tft_ingest::client::{Region, DEFAULT_HOST_TEMPLATE};
use tft_ingest::fetcher::TransportResponse;
use tft_ingest::{ApiClient, Tier};

use crate::support::{fetcher, ladder_json, ScriptedTransport};

fn default_client() -> ApiClient {
    ApiClient::new(fetcher(Arc::new(ScriptedTransport::default()), 1))
}

#[test]
fn test_ladder_urls_use_platform_host() {
    let client = default_client();
    assert_eq!(
        client.ladder_url(Tier::Challenger, "na1"),
        "https://na1.api.riotgames.com/tft/league/v1/challenger"
    );
    assert_eq!(
        client.ladder_url(Tier::Grandmaster, "euw1"),
        "https://euw1.api.riotgames.com/tft/league/v1/grandmaster"
    );
    assert_eq!(
        client.ladder_url(Tier::Master, "kr"),
        "https://kr.api.riotgames.com/tft/league/v1/master"
    );
}

#[test]
fn test_match_urls_use_region_host() {
    let client = default_client();
    assert_eq!(
        client.match_ids_url(Region::Europe, "abc-123", 20, 0),
        "https://europe.api.riotgames.com/tft/match/v1/matches/by-puuid/abc-123/ids?count=20&start=0"
    );
    assert_eq!(
        client.match_url(Region::Asia, "KR_42"),
        "https://asia.api.riotgames.com/tft/match/v1/matches/KR_42"
    );
}

#[test]
fn test_path_segments_are_percent_encoded() {
    let client = default_client();
    let url = client.match_ids_url(Region::Americas, "a/b c", 5, 10);
    assert!(url.contains("/by-puuid/a%2Fb%20c/ids?count=5&start=10"));
}

#[test]
fn test_host_template_override() {
    let client = default_client().with_host_template("http://127.0.0.1:8080/{route}");
    assert_eq!(
        client.ladder_url(Tier::Master, "br1"),
        "http://127.0.0.1:8080/br1/tft/league/v1/master"
    );
    assert!(DEFAULT_HOST_TEMPLATE.contains("{route}"));
}

#[tokio::test]
async fn test_get_ladder_requests_built_url() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(TransportResponse::ok(
        ladder_json("MASTER", &["p1"]),
    ))]));
    let client = ApiClient::new(fetcher(transport.clone(), 1));

    let list = client.get_ladder(Tier::Master, "jp1").await.unwrap();
    assert_eq!(list.entries[0].puuid, "p1");
    assert_eq!(
        transport.requests()[0].0,
        "https://jp1.api.riotgames.com/tft/league/v1/master"
    );
}
