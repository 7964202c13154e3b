//! Integration tests for phase sequencing

use std::sync::Arc;
use tft_ingest::client::{Region, Routing};
use tft_ingest::ingest::{IngestError, MatchLimits};
use tft_ingest::orchestrator::{Orchestrator, Phase};
use tft_ingest::store::{Store, Table};

use crate::support::{client, ladder_json, match_ids_json, match_json, memory_store, RoutedTransport};

fn full_transport() -> RoutedTransport {
    RoutedTransport::new()
        .json("/na1/tft/league/v1/challenger", ladder_json("CHALLENGER", &["p1", "p2"]))
        .json("/na1/tft/league/v1/grandmaster", ladder_json("GRANDMASTER", &[]))
        .json("/na1/tft/league/v1/master", ladder_json("MASTER", &[]))
        .json(
            "/americas/tft/match/v1/matches/by-puuid/p1/ids",
            match_ids_json(&["NA1_1"]),
        )
        .json(
            "/americas/tft/match/v1/matches/by-puuid/p2/ids",
            match_ids_json(&["NA1_1", "NA1_2"]),
        )
        .json(
            "/americas/tft/match/v1/matches/NA1_1",
            match_json("NA1_1", &["p1", "p2"], 1),
        )
        .json(
            "/americas/tft/match/v1/matches/NA1_2",
            match_json("NA1_2", &["p2"], 1),
        )
}

fn orchestrator(transport: Arc<RoutedTransport>, store: Store) -> Orchestrator {
    Orchestrator::new(client(transport), store, MatchLimits::default())
        .with_routing(Routing::only(Region::Americas, &["na1"]))
}

#[tokio::test]
async fn test_full_run_loads_ladder_then_matches() {
    let store = memory_store().await;
    let transport = Arc::new(full_transport());

    let report = orchestrator(transport, store.clone())
        .run(Phase::All)
        .await
        .unwrap();

    let ladder = report.ladder.clone().unwrap();
    assert_eq!(ladder.batches_committed, 3);
    assert_eq!(ladder.entries_upserted, 2);

    let matches = report.matches.clone().unwrap();
    assert_eq!(matches.players_processed, 2);
    assert_eq!(matches.inserted, 2);
    assert_eq!(matches.skipped_existing, 1);
    assert_eq!(store.count_rows(Table::Matches).await.unwrap(), 2);

    let rendered = report.to_string();
    assert!(rendered.contains("ladder: 2 entries upserted"));
    assert!(rendered.contains("matches: 2 inserted"));
}

#[tokio::test]
async fn test_ladder_only_skips_match_endpoints() {
    let store = memory_store().await;
    let transport = Arc::new(full_transport());

    let report = orchestrator(transport.clone(), store.clone())
        .run(Phase::LadderOnly)
        .await
        .unwrap();

    assert!(report.ladder.is_some());
    assert!(report.matches.is_none());
    assert!(transport
        .requests()
        .iter()
        .all(|url| url.contains("/tft/league/v1/")));
    assert_eq!(store.count_rows(Table::Matches).await.unwrap(), 0);
}

#[tokio::test]
async fn test_matches_only_uses_existing_ladder() {
    let store = memory_store().await;
    let transport = Arc::new(full_transport());
    orchestrator(transport, store.clone())
        .run(Phase::LadderOnly)
        .await
        .unwrap();

    let transport = Arc::new(full_transport());
    let report = orchestrator(transport.clone(), store.clone())
        .run(Phase::MatchesOnly)
        .await
        .unwrap();

    assert!(report.ladder.is_none());
    assert_eq!(report.matches.unwrap().inserted, 2);
    assert!(!transport
        .requests()
        .iter()
        .any(|url| url.contains("/tft/league/v1/")));
}

#[tokio::test]
async fn test_missing_schema_is_fatal_for_match_phase() {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    let transport = Arc::new(full_transport());

    let err = orchestrator(transport, store)
        .run(Phase::MatchesOnly)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Store(_)));
}
