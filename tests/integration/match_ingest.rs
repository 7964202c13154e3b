//! Integration tests for match ingestion
//!
//! Exercise idempotence, transactional atomicity and per-player failure
//! isolation against an embedded SQLite store.

use std::sync::Arc;
use tft_ingest::client::Region;
use tft_ingest::ingest::{ItemOutcome, MatchIngestor, MatchLimits};
use tft_ingest::store::{LadderRow, Store, Table};
use tft_ingest::Tier;

use crate::support::{client, match_ids_json, match_json, memory_store, RoutedTransport};

const IDS_P1: &str = "/americas/tft/match/v1/matches/by-puuid/p1/ids";
const IDS_P2: &str = "/americas/tft/match/v1/matches/by-puuid/p2/ids";

fn match_path(match_id: &str) -> String {
    format!("/americas/tft/match/v1/matches/{match_id}")
}

async fn seed_players(store: &Store, players: &[(&str, i64)]) {
    for (key, updated_at) in players {
        let row = LadderRow {
            player_key: key.to_string(),
            summoner_id: None,
            tier: Tier::Challenger,
            rank: "I".to_string(),
            league_points: 1000,
            wins: 10,
            losses: 10,
            region: Region::Americas,
        };
        store.upsert_ladder_batch(&[row], *updated_at).await.unwrap();
    }
}

async fn table_counts(store: &Store) -> Vec<i64> {
    let mut counts = Vec::new();
    for table in [
        Table::Matches,
        Table::Participants,
        Table::Augments,
        Table::Traits,
        Table::Units,
        Table::Items,
    ] {
        counts.push(store.count_rows(table).await.unwrap());
    }
    counts
}

fn two_match_transport() -> RoutedTransport {
    RoutedTransport::new()
        .json(IDS_P1, match_ids_json(&["NA1_1", "NA1_2"]))
        .json(&match_path("NA1_1"), match_json("NA1_1", &["p1", "x1"], 2))
        .json(&match_path("NA1_2"), match_json("NA1_2", &["p1", "x2"], 1))
}

#[tokio::test]
async fn test_second_run_inserts_nothing() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 1_000)]).await;
    let transport = Arc::new(two_match_transport());
    let ingestor = MatchIngestor::new(client(transport.clone()), store.clone(), MatchLimits::default());

    let first = ingestor.run().await.unwrap();
    assert_eq!(first.players_processed, 1);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.skipped_existing, 0);
    // NA1_1 carries 2 units per participant, NA1_2 carries 1
    assert_eq!(table_counts(&store).await, vec![2, 4, 8, 4, 6, 18]);

    let second = ingestor.run().await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_existing, 2);
    assert_eq!(second.failed, 0);
    assert_eq!(table_counts(&store).await, vec![2, 4, 8, 4, 6, 18]);

    // Stored matches are not fetched again.
    assert_eq!(transport.hits(&match_path("NA1_1")), 1);
    assert_eq!(transport.hits(&match_path("NA1_2")), 1);
}

#[tokio::test]
async fn test_match_shared_by_two_players_is_stored_once() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 2_000), ("p2", 1_000)]).await;
    let transport = Arc::new(
        RoutedTransport::new()
            .json(IDS_P1, match_ids_json(&["NA1_7"]))
            .json(IDS_P2, match_ids_json(&["NA1_7"]))
            .json(&match_path("NA1_7"), match_json("NA1_7", &["p1", "p2"], 1)),
    );

    let report = MatchIngestor::new(client(transport.clone()), store.clone(), MatchLimits::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.players_processed, 2);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped_existing, 1);
    assert_eq!(store.count_rows(Table::Matches).await.unwrap(), 1);
}

#[tokio::test]
async fn test_failure_on_third_unit_leaves_no_rows() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 1_000)]).await;
    sqlx::query(
        "CREATE TRIGGER fail_third_unit BEFORE INSERT ON participant_units
         WHEN (SELECT COUNT(*) FROM participant_units) >= 2
         BEGIN SELECT RAISE(ABORT, 'forced unit failure'); END",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let transport = Arc::new(
        RoutedTransport::new()
            .json(IDS_P1, match_ids_json(&["NA1_9"]))
            .json(&match_path("NA1_9"), match_json("NA1_9", &["p1"], 3)),
    );
    let ingestor = MatchIngestor::new(client(transport), store.clone(), MatchLimits::default());

    let report = ingestor.run().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.inserted, 0);
    assert_eq!(table_counts(&store).await, vec![0, 0, 0, 0, 0, 0]);
    assert!(!store.match_exists("NA1_9").await.unwrap());

    sqlx::query("DROP TRIGGER fail_third_unit")
        .execute(store.pool())
        .await
        .unwrap();

    let retry = ingestor.run().await.unwrap();
    assert_eq!(retry.inserted, 1);
    assert!(store.match_exists("NA1_9").await.unwrap());
    assert_eq!(store.count_rows(Table::Units).await.unwrap(), 3);
}

#[tokio::test]
async fn test_short_item_id_list_pads_with_null() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 1_000)]).await;
    let transport = Arc::new(
        RoutedTransport::new()
            .json(IDS_P1, match_ids_json(&["NA1_3"]))
            .json(&match_path("NA1_3"), match_json("NA1_3", &["p1"], 1)),
    );

    MatchIngestor::new(client(transport), store.clone(), MatchLimits::default())
        .run()
        .await
        .unwrap();

    let items: Vec<(Option<i64>, String)> =
        sqlx::query_as("SELECT item_id, item_name FROM unit_items ORDER BY id")
            .fetch_all(store.pool())
            .await
            .unwrap();
    assert_eq!(
        items,
        vec![
            (Some(44), "Item_A".to_string()),
            (None, "Item_B".to_string()),
            (None, "Item_C".to_string()),
        ]
    );

    let augments: Vec<(String, i64)> =
        sqlx::query_as("SELECT augment_id, pick_order FROM participant_augments ORDER BY pick_order")
            .fetch_all(store.pool())
            .await
            .unwrap();
    assert_eq!(
        augments,
        vec![
            ("TFT_Augment_First".to_string(), 1),
            ("TFT_Augment_Second".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_failing_player_does_not_stop_others() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 2_000), ("p2", 1_000)]).await;
    let transport = Arc::new(
        RoutedTransport::new()
            .fail(IDS_P1)
            .json(IDS_P2, match_ids_json(&["NA1_5"]))
            .json(&match_path("NA1_5"), match_json("NA1_5", &["p2"], 1)),
    );

    let report = MatchIngestor::new(client(transport), store.clone(), MatchLimits::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.players_skipped, 1);
    assert_eq!(report.players_processed, 1);
    assert_eq!(report.inserted, 1);
}

#[tokio::test]
async fn test_player_with_unknown_region_is_skipped() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 1_000)]).await;
    sqlx::query(
        "INSERT INTO ladder_entries
            (puuid, region, summoner_id, tier, rank, league_points, wins, losses, updated_at)
         VALUES ('p_oce', 'oce', NULL, 'CHALLENGER', 'I', 900, 10, 10, 5000)",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let transport = Arc::new(
        RoutedTransport::new()
            .json(IDS_P1, match_ids_json(&["NA1_6"]))
            .json(&match_path("NA1_6"), match_json("NA1_6", &["p1"], 1)),
    );

    let report = MatchIngestor::new(client(transport.clone()), store.clone(), MatchLimits::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.players_skipped, 1);
    assert_eq!(report.players_processed, 1);
    assert_eq!(report.inserted, 1);
    assert!(!transport.requests().iter().any(|url| url.contains("p_oce")));
    assert_eq!(transport.hits(IDS_P1), 1);
}

#[tokio::test]
async fn test_failed_match_fetch_is_counted_and_skipped() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 1_000)]).await;
    let transport = Arc::new(
        RoutedTransport::new()
            .json(IDS_P1, match_ids_json(&["NA1_404", "NA1_2"]))
            .json(&match_path("NA1_2"), match_json("NA1_2", &["p1"], 1)),
    );

    let report = MatchIngestor::new(client(transport), store.clone(), MatchLimits::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.inserted, 1);
    assert!(!store.match_exists("NA1_404").await.unwrap());
}

#[tokio::test]
async fn test_limits_bound_players_and_id_count() {
    let store = memory_store().await;
    seed_players(&store, &[("p1", 3_000), ("p2", 2_000), ("p3", 1_000)]).await;
    let transport = Arc::new(
        RoutedTransport::new()
            .json(IDS_P1, match_ids_json(&[]))
            .json(IDS_P2, match_ids_json(&[])),
    );
    let limits = MatchLimits {
        max_players: 2,
        matches_per_player: 7,
    };

    let report = MatchIngestor::new(client(transport.clone()), store, limits)
        .run()
        .await
        .unwrap();

    assert_eq!(report.players_processed, 2);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|url| url.contains("count=7&start=0")));
    assert!(!requests.iter().any(|url| url.contains("/p3/")));
}

#[tokio::test]
async fn test_ingest_match_outcomes() {
    let store = memory_store().await;
    let transport = Arc::new(
        RoutedTransport::new().json(&match_path("NA1_1"), match_json("NA1_1", &["p1"], 1)),
    );
    let ingestor = MatchIngestor::new(client(transport), store, MatchLimits::default());

    assert_eq!(
        ingestor.ingest_match(Region::Americas, "NA1_1").await,
        ItemOutcome::Stored
    );
    assert_eq!(
        ingestor.ingest_match(Region::Americas, "NA1_1").await,
        ItemOutcome::AlreadyPresent
    );
    assert!(matches!(
        ingestor.ingest_match(Region::Americas, "NA1_2").await,
        ItemOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn test_file_store_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("tft.db").display());

    let store = Store::connect(&url).await.unwrap();
    store.init_schema().await.unwrap();
    seed_players(&store, &[("p1", 1_000)]).await;
    let first = MatchIngestor::new(
        client(Arc::new(two_match_transport())),
        store.clone(),
        MatchLimits::default(),
    )
    .run()
    .await
    .unwrap();
    assert_eq!(first.inserted, 2);
    store.close().await;

    let reopened = Store::connect(&url).await.unwrap();
    reopened.init_schema().await.unwrap();
    let second = MatchIngestor::new(
        client(Arc::new(two_match_transport())),
        reopened.clone(),
        MatchLimits::default(),
    )
    .run()
    .await
    .unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_existing, 2);
    assert_eq!(reopened.count_rows(Table::Matches).await.unwrap(), 2);
}
