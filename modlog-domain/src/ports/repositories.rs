use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::entities::{ModerationEvent, NewModerationEvent, Player, PlayerAlias};
use crate::value_objects::{PlayerKey, PlayfabId};

/// Canonical player identity and alias history.
///
/// Both writes must be a single atomic insert-or-merge at the storage
/// boundary so concurrent ingestions cannot lose a widening update.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn upsert_player(
        &self,
        playfab_id: &PlayfabId,
        display_name: Option<&str>,
        observed_at: Option<NaiveDateTime>,
    ) -> anyhow::Result<PlayerKey>;
    async fn record_alias(
        &self,
        player: PlayerKey,
        alias: &str,
        observed_at: Option<NaiveDateTime>,
    ) -> anyhow::Result<()>;
    async fn find_player(&self, playfab_id: &PlayfabId) -> anyhow::Result<Option<Player>>;
    async fn list_aliases(&self, player: PlayerKey) -> anyhow::Result<Vec<PlayerAlias>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    /// Returns `false` when an event with the same fingerprint already exists.
    async fn insert_event_if_new(&self, event: &NewModerationEvent) -> anyhow::Result<bool>;
    async fn list_events(
        &self,
        player: PlayerKey,
        limit: usize,
    ) -> anyhow::Result<Vec<ModerationEvent>>;
    async fn ping(&self) -> anyhow::Result<()>;
}
