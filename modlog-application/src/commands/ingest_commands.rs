use std::sync::Arc;

use modlog_domain::ports::{EventRepository, PlayerRepository};
use modlog_domain::{parse_line, IngestConfig, SourceRef};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::commands::event_commands::store_event_if_new;
use crate::commands::identity_commands::resolve_identity;
use crate::commands::submission_commands::{self, LogSubmission, SubmissionOutcome};
use crate::{AppError, AppState};

/// Per-batch counters. `inserted` is the number of newly stored events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub lines: usize,
    pub matched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

pub struct IngestionPipeline {
    players: Arc<dyn PlayerRepository>,
    events: Arc<dyn EventRepository>,
    config: IngestConfig,
}

impl IngestionPipeline {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        events: Arc<dyn EventRepository>,
        config: IngestConfig,
    ) -> Self {
        if config.fuzzy_username_match {
            warn!(
                "fuzzy username matching requested (threshold {}), identities resolve by exact PlayFab id",
                config.fuzzy_match_threshold
            );
        }
        Self {
            players,
            events,
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Parses, resolves and stores every recognizable line.
    ///
    /// Unrecognized lines are counted and skipped. The first storage
    /// failure aborts the batch; rows written before it stay written.
    pub async fn ingest_lines<I, S>(
        &self,
        lines: I,
        source: &SourceRef,
    ) -> Result<IngestReport, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = IngestReport::default();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            report.lines += 1;

            let Some(parsed) = parse_line(line) else {
                report.skipped += 1;
                debug!("skipped unrecognized line: {}", line);
                continue;
            };
            report.matched += 1;

            let player = resolve_identity(
                self.players.as_ref(),
                &parsed.playfab_id,
                &parsed.username,
                parsed.occurred_at,
            )
            .await?;
            if store_event_if_new(self.events.as_ref(), &parsed, player, *source).await? {
                report.inserted += 1;
            } else {
                report.duplicates += 1;
                debug!(
                    "duplicate {} for {} at {}",
                    parsed.action, parsed.playfab_id, parsed.occurred_at
                );
            }
        }

        info!(
            "ingested batch: lines={} matched={} inserted={} duplicates={} skipped={}",
            report.lines, report.matched, report.inserted, report.duplicates, report.skipped
        );
        Ok(report)
    }

    pub async fn ingest_text(
        &self,
        text: &str,
        source: &SourceRef,
    ) -> Result<IngestReport, AppError> {
        self.ingest_lines(split_lines(text), source).await
    }
}

/// Non-empty, trimmed lines of a text blob.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

pub async fn process_submission(
    state: &AppState,
    submission: LogSubmission,
) -> Result<SubmissionOutcome, AppError> {
    if !submission_commands::should_handle(&submission, &state.config.allowed_channel_ids) {
        state.metrics.record_ignored();
        debug!(
            "ignoring submission from channel {:?}",
            submission.channel_id
        );
        return Ok(SubmissionOutcome::ignored());
    }

    let text = submission_commands::gather_text(&submission);
    if text.trim().is_empty() {
        return Ok(SubmissionOutcome::empty());
    }
    let source = SourceRef::new(submission.message_id, submission.channel_id);
    match state.pipeline.ingest_text(&text, &source).await {
        Ok(report) => {
            state.metrics.record_ingest(&report);
            Ok(SubmissionOutcome::handled(report))
        }
        Err(err) => {
            state.metrics.record_ingest_error();
            error!("failed to ingest submission {:?}: {}", submission.message_id, err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRepository;
    use crate::Metrics;
    use modlog_domain::RuntimeConfig;

    const KICK_LINE: &str = "Kick @ 8/25/2025, 11:08:52 PM OATS Dueltroit [Ctx] User1 (6F26F3A5D9A2C314) some reason";
    const BAN_LINE: &str =
        "Ban @ 8/27/2025, 11:22:37 PM Loc [Ctx] Erol1600 (5B6F95CD14F6C21B) Reason text 2 hours";

    fn pipeline(repo: &Arc<MemoryRepository>) -> IngestionPipeline {
        IngestionPipeline::new(repo.clone(), repo.clone(), IngestConfig::default())
    }

    fn state(repo: &Arc<MemoryRepository>, allowed_channel_ids: Vec<i64>) -> AppState {
        AppState {
            config: RuntimeConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                api_token: None,
                allowed_channel_ids,
                max_body_bytes: 1024,
                request_timeout_seconds: 5,
            },
            pipeline: Arc::new(pipeline(repo)),
            player_repo: repo.clone(),
            event_repo: repo.clone(),
            metrics: Arc::new(Metrics::default()),
        }
    }

    #[tokio::test]
    async fn same_line_twice_inserts_once() {
        let repo = Arc::new(MemoryRepository::default());
        let pipeline = pipeline(&repo);
        let source = SourceRef::default();

        let first = pipeline.ingest_lines([KICK_LINE], &source).await.expect("first");
        let second = pipeline.ingest_lines([KICK_LINE], &source).await.expect("second");
        assert_eq!(first.inserted, 1);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 1);
        assert_eq!(repo.event_count().await, 1);
    }

    #[test]
    fn keeps_injected_config() {
        let repo = Arc::new(MemoryRepository::default());
        let config = IngestConfig {
            fuzzy_username_match: true,
            fuzzy_match_threshold: 80,
        };
        let pipeline = IngestionPipeline::new(repo.clone(), repo, config.clone());
        assert_eq!(pipeline.config(), &config);
    }

    #[tokio::test]
    async fn counts_each_line_outcome() {
        let repo = Arc::new(MemoryRepository::default());
        let lines = vec![
            KICK_LINE.to_string(),
            "".to_string(),
            "   ".to_string(),
            "gg everyone".to_string(),
            BAN_LINE.to_string(),
            KICK_LINE.to_string(),
        ];
        let report = pipeline(&repo)
            .ingest_lines(lines, &SourceRef::new(Some(1), Some(2)))
            .await
            .expect("ingest");
        assert_eq!(
            report,
            IngestReport {
                lines: 4,
                matched: 3,
                inserted: 2,
                duplicates: 1,
                skipped: 1,
            }
        );
    }

    #[tokio::test]
    async fn non_matching_blob_stores_nothing() {
        let repo = Arc::new(MemoryRepository::default());
        let report = pipeline(&repo)
            .ingest_text("hello\nthis is not a log\n\n", &SourceRef::default())
            .await
            .expect("ingest");
        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(repo.event_count().await, 0);
        assert!(repo.player("6F26F3A5D9A2C314").await.is_none());
    }

    #[tokio::test]
    async fn storage_failure_aborts_the_batch() {
        let repo = Arc::new(MemoryRepository::default());
        repo.fail_writes();
        let err = pipeline(&repo)
            .ingest_lines([KICK_LINE, BAN_LINE], &SourceRef::default())
            .await
            .expect_err("storage fails");
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn split_lines_trims_and_drops_blanks() {
        let lines: Vec<&str> = split_lines("  a \r\n\n\t\nb\n").collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn submission_from_unlisted_channel_is_ignored() {
        let repo = Arc::new(MemoryRepository::default());
        let state = state(&repo, vec![10]);
        let submission = LogSubmission {
            content: KICK_LINE.to_string(),
            channel_id: Some(99),
            ..LogSubmission::default()
        };
        let outcome = process_submission(&state, submission).await.expect("process");
        assert!(!outcome.handled);
        assert_eq!(repo.event_count().await, 0);
        assert!(state
            .metrics
            .render_prometheus()
            .contains("modlog_ingest_ignored_total 1\n"));
    }

    #[tokio::test]
    async fn submission_ingests_content_and_text_attachments() {
        let repo = Arc::new(MemoryRepository::default());
        let state = state(&repo, vec![10]);
        let submission = LogSubmission {
            content: KICK_LINE.to_string(),
            attachments: vec![crate::Attachment {
                filename: "logs.TXT".to_string(),
                content_type: None,
                text: Some(BAN_LINE.to_string()),
            }],
            message_id: Some(5),
            channel_id: Some(10),
            ..LogSubmission::default()
        };
        let outcome = process_submission(&state, submission).await.expect("process");
        assert!(outcome.handled);
        assert_eq!(outcome.report.inserted, 2);
        assert_eq!(
            outcome.reply.as_deref(),
            Some("Parsed and stored 2 moderation event(s). Unrecognized lines were ignored.")
        );
    }

    #[tokio::test]
    async fn submission_failure_is_counted() {
        let repo = Arc::new(MemoryRepository::default());
        repo.fail_writes();
        let state = state(&repo, Vec::new());
        let submission = LogSubmission {
            content: KICK_LINE.to_string(),
            direct_message: true,
            ..LogSubmission::default()
        };
        assert!(process_submission(&state, submission).await.is_err());
        assert!(state
            .metrics
            .render_prometheus()
            .contains("modlog_ingest_errors_total 1\n"));
    }
}
