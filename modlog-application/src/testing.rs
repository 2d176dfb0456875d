// In-memory repository used by application tests.
// Mirrors the widening and dedup rules of the SQL store.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use modlog_domain::ports::{EventRepository, PlayerRepository};
use modlog_domain::{
    ModerationEvent, NewModerationEvent, Player, PlayerAlias, PlayerKey, PlayfabId,
};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    players: Vec<Player>,
    aliases: Vec<PlayerAlias>,
    events: Vec<ModerationEvent>,
}

#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub async fn player(&self, playfab_id: &str) -> Option<Player> {
        let inner = self.inner.lock().await;
        inner
            .players
            .iter()
            .find(|player| player.playfab_id == playfab_id)
            .cloned()
    }

    pub async fn aliases(&self) -> Vec<PlayerAlias> {
        self.inner.lock().await.aliases.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.inner.lock().await.events.len()
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("storage unavailable"));
        }
        Ok(())
    }
}

fn widen(
    first_seen: &mut Option<NaiveDateTime>,
    last_seen: &mut Option<NaiveDateTime>,
    observed_at: Option<NaiveDateTime>,
) {
    let Some(observed) = observed_at else {
        return;
    };
    *first_seen = Some(first_seen.map_or(observed, |current| current.min(observed)));
    *last_seen = Some(last_seen.map_or(observed, |current| current.max(observed)));
}

#[async_trait]
impl PlayerRepository for MemoryRepository {
    async fn upsert_player(
        &self,
        playfab_id: &PlayfabId,
        display_name: Option<&str>,
        observed_at: Option<NaiveDateTime>,
    ) -> anyhow::Result<PlayerKey> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        let next_key = PlayerKey(inner.players.len() as i64 + 1);
        if let Some(player) = inner
            .players
            .iter_mut()
            .find(|player| player.playfab_id == playfab_id.as_str())
        {
            let older = matches!(
                (observed_at, player.last_seen),
                (Some(observed), Some(last)) if observed < last
            );
            if let (Some(name), false) = (display_name, older) {
                player.last_username = Some(name.to_string());
            }
            widen(&mut player.first_seen, &mut player.last_seen, observed_at);
            return Ok(player.key);
        }
        inner.players.push(Player {
            key: next_key,
            playfab_id: playfab_id.as_str().to_string(),
            last_username: display_name.map(ToString::to_string),
            first_seen: observed_at,
            last_seen: observed_at,
        });
        Ok(next_key)
    }

    async fn record_alias(
        &self,
        player: PlayerKey,
        alias: &str,
        observed_at: Option<NaiveDateTime>,
    ) -> anyhow::Result<()> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner
            .aliases
            .iter_mut()
            .find(|row| row.player == player && row.alias == alias)
        {
            widen(&mut existing.first_seen, &mut existing.last_seen, observed_at);
            return Ok(());
        }
        inner.aliases.push(PlayerAlias {
            player,
            alias: alias.to_string(),
            first_seen: observed_at,
            last_seen: observed_at,
        });
        Ok(())
    }

    async fn find_player(&self, playfab_id: &PlayfabId) -> anyhow::Result<Option<Player>> {
        Ok(self.player(playfab_id.as_str()).await)
    }

    async fn list_aliases(&self, player: PlayerKey) -> anyhow::Result<Vec<PlayerAlias>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<PlayerAlias> = inner
            .aliases
            .iter()
            .filter(|row| row.player == player)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        Ok(rows)
    }
}

#[async_trait]
impl EventRepository for MemoryRepository {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert_event_if_new(&self, event: &NewModerationEvent) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        if inner
            .events
            .iter()
            .any(|row| row.fingerprint == event.fingerprint)
        {
            return Ok(false);
        }
        let id = inner.events.len() as i64 + 1;
        inner.events.push(ModerationEvent {
            id,
            player: event.player,
            action: event.action,
            occurred_at: event.occurred_at,
            location: event.location.clone(),
            context: event.context.clone(),
            reason: event.reason.clone(),
            duration_seconds: event.duration_seconds,
            raw_text: event.raw_text.clone(),
            source: event.source,
            fingerprint: event.fingerprint.clone(),
        });
        Ok(true)
    }

    async fn list_events(
        &self,
        player: PlayerKey,
        limit: usize,
    ) -> anyhow::Result<Vec<ModerationEvent>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<ModerationEvent> = inner
            .events
            .iter()
            .filter(|row| row.player == player)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.check_writable()
    }
}
