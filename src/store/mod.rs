//! Relational persistence
//!
//! One [`Store`] wraps a sqlx connection pool. The same SQL (with `$N`
//! placeholders) runs against PostgreSQL and SQLite; the backend is chosen from
//! the connection-string scheme.

use sqlx::any::{AnyPoolOptions, AnyQueryResult};
use sqlx::AnyPool;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub mod ladder;
pub mod matches;
pub mod schema;

pub use ladder::{LadderRow, PlayerRef, StoredLadderEntry};
pub use matches::{
    AugmentRow, InsertOutcome, ItemRow, MatchRecord, ParticipantRow, TraitRow, UnitRow,
};

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Error reported by the database driver
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Connection string with an unsupported scheme
    #[error("unsupported database url scheme: {0}")]
    UnsupportedUrl(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Database backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// PostgreSQL
    Postgres,
    /// SQLite (file or in-memory)
    Sqlite,
}

impl Dialect {
    /// Detect the backend from a connection string
    pub fn from_url(url: &str) -> StoreResult<Self> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            _ => Err(StoreError::UnsupportedUrl(scheme)),
        }
    }
}

/// Tables written by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Ladder standings
    LadderEntries,
    /// Match headers
    Matches,
    /// Per-match participants
    Participants,
    /// Participant augments
    Augments,
    /// Participant traits
    Traits,
    /// Participant units
    Units,
    /// Unit items
    Items,
}

impl Table {
    /// Every table, parents first
    pub const ALL: [Table; 7] = [
        Table::LadderEntries,
        Table::Matches,
        Table::Participants,
        Table::Augments,
        Table::Traits,
        Table::Units,
        Table::Items,
    ];

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::LadderEntries => "ladder_entries",
            Table::Matches => "matches",
            Table::Participants => "match_participants",
            Table::Augments => "participant_augments",
            Table::Traits => "participant_traits",
            Table::Units => "participant_units",
            Table::Items => "unit_items",
        }
    }
}

/// Connection pool plus the detected backend
#[derive(Clone)]
pub struct Store {
    pool: AnyPool,
    dialect: Dialect,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open a pool for `database_url`
    ///
    /// In-memory SQLite databases get a single long-lived connection so every
    /// query sees the same database.
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let dialect = Dialect::from_url(database_url)?;
        sqlx::any::install_default_drivers();

        let in_memory = dialect == Dialect::Sqlite && database_url.contains(":memory:");
        let options = if in_memory {
            AnyPoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(Duration::from_secs(600))
        };

        let pool = options.connect(database_url).await?;
        info!(?dialect, "connected to database");
        Ok(Self { pool, dialect })
    }

    /// Underlying pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Create every table and index if missing
    pub async fn init_schema(&self) -> StoreResult<()> {
        for statement in schema::statements(self.dialect) {
            let result: AnyQueryResult = sqlx::query(&statement).execute(&self.pool).await?;
            debug!(rows = result.rows_affected(), "schema statement applied");
        }
        info!("schema ready");
        Ok(())
    }

    /// Number of rows in `table`
    pub async fn count_rows(&self, table: Table) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Close the pool, waiting for connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
