//! Platform and region routing tables
//!
//! Ladder endpoints live on platform hosts (`na1`, `euw1`, ...); match endpoints
//! live on the broader regional hosts. Every platform belongs to exactly one
//! region, which is also the region tag stored with ladder rows and matches.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Regional routing value used for match queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// North and South America
    Americas,
    /// Europe, Turkey and Russia
    Europe,
    /// Korea and Japan
    Asia,
}

impl Region {
    /// All valid match regions
    pub const ALL: [Region; 3] = [Region::Americas, Region::Europe, Region::Asia];

    /// Host label and stored region tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Europe => "europe",
            Region::Asia => "asia",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "americas" => Ok(Region::Americas),
            "europe" => Ok(Region::Europe),
            "asia" => Ok(Region::Asia),
            _ => Err(format!("Invalid region: {s}")),
        }
    }
}

/// Default region → platform table for ladder queries
pub const LADDER_PLATFORMS: [(Region, &[&str]); 3] = [
    (Region::Americas, &["na1", "br1", "la1", "la2"]),
    (Region::Europe, &["euw1", "eun1", "tr1", "ru"]),
    (Region::Asia, &["kr", "jp1"]),
];

/// Platforms served under one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPlatforms {
    /// Region the platforms belong to
    pub region: Region,
    /// Platform host labels
    pub platforms: Vec<String>,
}

/// Region → platform routing used by the ladder ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    entries: Vec<RegionPlatforms>,
}

impl Default for Routing {
    fn default() -> Self {
        Self {
            entries: LADDER_PLATFORMS
                .iter()
                .map(|(region, platforms)| RegionPlatforms {
                    region: *region,
                    platforms: platforms.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl Routing {
    /// Routing restricted to the given platforms of one region
    pub fn only(region: Region, platforms: &[&str]) -> Self {
        Self {
            entries: vec![RegionPlatforms {
                region,
                platforms: platforms.iter().map(|p| p.to_string()).collect(),
            }],
        }
    }

    /// Configured regions with their platforms, in table order
    pub fn entries(&self) -> &[RegionPlatforms] {
        &self.entries
    }

    /// Total number of configured platforms
    pub fn platform_count(&self) -> usize {
        self.entries.iter().map(|e| e.platforms.len()).sum()
    }
}
