use std::str::FromStr;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use modlog_domain::{
    DbConfig, EventRepository, ModerationAction, ModerationEvent, NewModerationEvent, Player,
    PlayerAlias, PlayerKey, PlayerRepository, PlayfabId, SourceRef,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        playfab_id TEXT NOT NULL UNIQUE,
        last_username TEXT,
        first_seen DATETIME,
        last_seen DATETIME
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_aliases (
        player_id INTEGER NOT NULL,
        alias TEXT NOT NULL,
        first_seen DATETIME,
        last_seen DATETIME,
        PRIMARY KEY (player_id, alias),
        FOREIGN KEY (player_id) REFERENCES players(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS moderation_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL,
        action TEXT NOT NULL CHECK (action IN ('Kick', 'Ban')),
        occurred_at DATETIME NOT NULL,
        location TEXT,
        context TEXT,
        reason TEXT NOT NULL,
        duration_seconds INTEGER,
        raw_text TEXT NOT NULL,
        source_message_id INTEGER,
        source_channel_id INTEGER,
        event_hash TEXT NOT NULL UNIQUE,
        created_at DATETIME NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY (player_id) REFERENCES players(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_events_player_time ON moderation_events(player_id, occurred_at)",
    "CREATE INDEX IF NOT EXISTS idx_events_action_time ON moderation_events(action, occurred_at)",
];

// Window widening: a NULL on either side keeps the other value.
const UPSERT_PLAYER: &str = r#"
    INSERT INTO players (playfab_id, last_username, first_seen, last_seen)
    VALUES (?, ?, ?, ?)
    ON CONFLICT(playfab_id) DO UPDATE SET
        last_username = CASE
            WHEN excluded.last_username IS NULL THEN players.last_username
            WHEN excluded.last_seen IS NOT NULL AND players.last_seen IS NOT NULL
                AND excluded.last_seen < players.last_seen THEN players.last_username
            ELSE excluded.last_username
        END,
        first_seen = MIN(COALESCE(players.first_seen, excluded.first_seen),
                         COALESCE(excluded.first_seen, players.first_seen)),
        last_seen = MAX(COALESCE(players.last_seen, excluded.last_seen),
                        COALESCE(excluded.last_seen, players.last_seen))
    RETURNING id
"#;

const UPSERT_ALIAS: &str = r#"
    INSERT INTO player_aliases (player_id, alias, first_seen, last_seen)
    VALUES (?, ?, ?, ?)
    ON CONFLICT(player_id, alias) DO UPDATE SET
        first_seen = MIN(COALESCE(player_aliases.first_seen, excluded.first_seen),
                         COALESCE(excluded.first_seen, player_aliases.first_seen)),
        last_seen = MAX(COALESCE(player_aliases.last_seen, excluded.last_seen),
                        COALESCE(excluded.last_seen, player_aliases.last_seen))
"#;

const INSERT_EVENT: &str = r#"
    INSERT INTO moderation_events (
        player_id, action, occurred_at, location, context, reason,
        duration_seconds, raw_text, source_message_id, source_channel_id, event_hash
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(event_hash) DO NOTHING
"#;

/// Relational store for players, aliases and moderation events.
///
/// Every write is a single statement, so concurrent ingestions sharing
/// the pool cannot interleave a read with a write.
#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        if config.database_url.contains(":memory:") {
            return Self::in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("invalid database_url '{}'", config.database_url))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database {}", config.database_url))?;
        info!("database opened at {}", config.database_url);
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection that never
    /// expires, otherwise each new connection would see an empty schema.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to create in-memory database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn player_from_row(row: &SqliteRow) -> anyhow::Result<Player> {
    Ok(Player {
        key: PlayerKey(row.try_get("id")?),
        playfab_id: row.try_get("playfab_id")?,
        last_username: row.try_get("last_username")?,
        first_seen: row.try_get("first_seen")?,
        last_seen: row.try_get("last_seen")?,
    })
}

fn alias_from_row(row: &SqliteRow) -> anyhow::Result<PlayerAlias> {
    Ok(PlayerAlias {
        player: PlayerKey(row.try_get("player_id")?),
        alias: row.try_get("alias")?,
        first_seen: row.try_get("first_seen")?,
        last_seen: row.try_get("last_seen")?,
    })
}

fn event_from_row(row: &SqliteRow) -> anyhow::Result<ModerationEvent> {
    let action: String = row.try_get("action")?;
    let action = ModerationAction::from_keyword(&action)
        .ok_or_else(|| anyhow!("unknown moderation action '{}' in storage", action))?;
    Ok(ModerationEvent {
        id: row.try_get("id")?,
        player: PlayerKey(row.try_get("player_id")?),
        action,
        occurred_at: row.try_get("occurred_at")?,
        location: row.try_get("location")?,
        context: row.try_get("context")?,
        reason: row.try_get("reason")?,
        duration_seconds: row.try_get("duration_seconds")?,
        raw_text: row.try_get("raw_text")?,
        source: SourceRef::new(
            row.try_get("source_message_id")?,
            row.try_get("source_channel_id")?,
        ),
        fingerprint: row.try_get("event_hash")?,
    })
}

#[async_trait]
impl PlayerRepository for SqliteRepo {
    async fn upsert_player(
        &self,
        playfab_id: &PlayfabId,
        display_name: Option<&str>,
        observed_at: Option<NaiveDateTime>,
    ) -> anyhow::Result<PlayerKey> {
        let id: i64 = sqlx::query_scalar(UPSERT_PLAYER)
            .bind(playfab_id.as_str())
            .bind(display_name)
            .bind(observed_at)
            .bind(observed_at)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("failed to upsert player {}", playfab_id))?;
        Ok(PlayerKey(id))
    }

    async fn record_alias(
        &self,
        player: PlayerKey,
        alias: &str,
        observed_at: Option<NaiveDateTime>,
    ) -> anyhow::Result<()> {
        sqlx::query(UPSERT_ALIAS)
            .bind(player.0)
            .bind(alias)
            .bind(observed_at)
            .bind(observed_at)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to record alias for player {}", player))?;
        Ok(())
    }

    async fn find_player(&self, playfab_id: &PlayfabId) -> anyhow::Result<Option<Player>> {
        let row = sqlx::query(
            "SELECT id, playfab_id, last_username, first_seen, last_seen FROM players WHERE playfab_id = ?",
        )
        .bind(playfab_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(player_from_row).transpose()
    }

    async fn list_aliases(&self, player: PlayerKey) -> anyhow::Result<Vec<PlayerAlias>> {
        let rows = sqlx::query(
            r#"
            SELECT player_id, alias, first_seen, last_seen
            FROM player_aliases
            WHERE player_id = ?
            ORDER BY last_seen DESC, alias ASC
            "#,
        )
        .bind(player.0)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(alias_from_row).collect()
    }
}

#[async_trait]
impl EventRepository for SqliteRepo {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .context("failed to create schema")?;
        }
        debug!("moderation log schema initialized");
        Ok(())
    }

    async fn insert_event_if_new(&self, event: &NewModerationEvent) -> anyhow::Result<bool> {
        let result = sqlx::query(INSERT_EVENT)
            .bind(event.player.0)
            .bind(event.action.as_str())
            .bind(event.occurred_at)
            .bind(event.location.as_deref())
            .bind(event.context.as_deref())
            .bind(&event.reason)
            .bind(event.duration_seconds)
            .bind(&event.raw_text)
            .bind(event.source.message_id)
            .bind(event.source.channel_id)
            .bind(&event.fingerprint)
            .execute(&self.pool)
            .await
            .context("failed to insert moderation event")?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_events(
        &self,
        player: PlayerKey,
        limit: usize,
    ) -> anyhow::Result<Vec<ModerationEvent>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT id, player_id, action, occurred_at, location, context, reason,
                   duration_seconds, raw_text, source_message_id, source_channel_id, event_hash
            FROM moderation_events
            WHERE player_id = ?
            ORDER BY occurred_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(player.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
