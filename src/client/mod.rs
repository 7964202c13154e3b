//! Upstream API client
//!
//! Builds endpoint URLs for ladder and match queries and delegates every call to
//! the shared [`RateLimitedFetcher`]. No caching: each call is a round-trip.

use std::sync::Arc;

use crate::fetcher::{FetchResult, RateLimitedFetcher};
use crate::Tier;

pub mod routing;
pub mod types;

pub use routing::{Region, RegionPlatforms, Routing, LADDER_PLATFORMS};
pub use types::{LeagueEntryDto, LeagueList, MatchDto};

/// Default host template; `{route}` is replaced by a platform or region label
pub const DEFAULT_HOST_TEMPLATE: &str = "https://{route}.api.riotgames.com";

/// Typed access to the ladder and match endpoints
pub struct ApiClient {
    fetcher: Arc<RateLimitedFetcher>,
    host_template: String,
}

impl ApiClient {
    /// Client talking to the public API hosts
    pub fn new(fetcher: Arc<RateLimitedFetcher>) -> Self {
        Self {
            fetcher,
            host_template: DEFAULT_HOST_TEMPLATE.to_string(),
        }
    }

    /// Replace the host template (e.g. `http://127.0.0.1:8080/{route}` for a stub server)
    pub fn with_host_template(mut self, template: impl Into<String>) -> Self {
        self.host_template = template.into();
        self
    }

    fn host(&self, route: &str) -> String {
        self.host_template.replace("{route}", route)
    }

    /// URL of the ladder page for `tier` on `platform`
    pub fn ladder_url(&self, tier: Tier, platform: &str) -> String {
        format!(
            "{}/tft/league/v1/{}",
            self.host(platform),
            tier.endpoint_segment()
        )
    }

    /// URL listing a player's recent match ids
    pub fn match_ids_url(&self, region: Region, player_key: &str, count: u32, start: u32) -> String {
        format!(
            "{}/tft/match/v1/matches/by-puuid/{}/ids?count={}&start={}",
            self.host(region.as_str()),
            urlencoding::encode(player_key),
            count,
            start
        )
    }

    /// URL of a full match payload
    pub fn match_url(&self, region: Region, match_id: &str) -> String {
        format!(
            "{}/tft/match/v1/matches/{}",
            self.host(region.as_str()),
            urlencoding::encode(match_id)
        )
    }

    /// Fetch the ladder page for one tier on one platform
    pub async fn get_ladder(&self, tier: Tier, platform: &str) -> FetchResult<LeagueList> {
        self.fetcher.get_json(&self.ladder_url(tier, platform)).await
    }

    /// Fetch up to `count` recent match ids for a player, most recent first
    pub async fn get_match_ids(
        &self,
        region: Region,
        player_key: &str,
        count: u32,
        start: u32,
    ) -> FetchResult<Vec<String>> {
        self.fetcher
            .get_json(&self.match_ids_url(region, player_key, count, start))
            .await
    }

    /// Fetch a full match payload
    pub async fn get_match(&self, region: Region, match_id: &str) -> FetchResult<MatchDto> {
        self.fetcher.get_json(&self.match_url(region, match_id)).await
    }
}
