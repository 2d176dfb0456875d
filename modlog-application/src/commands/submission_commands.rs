// Chat submission policy: which relayed messages get ingested,
// what text they contribute and how the outcome reads back to the sender.

use serde::{Deserialize, Serialize};

use crate::{AppError, IngestReport};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSubmission {
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub author_is_bot: bool,
    pub direct_message: bool,
    pub message_id: Option<i64>,
    pub channel_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub filename: String,
    pub content_type: Option<String>,
    /// Decoded body; relays leave it empty when the download failed.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmissionOutcome {
    pub handled: bool,
    #[serde(flatten)]
    pub report: IngestReport,
    pub reply: Option<String>,
}

impl SubmissionOutcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    /// Handled message that carried no text at all; nothing to answer.
    pub fn empty() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    pub fn handled(report: IngestReport) -> Self {
        Self {
            handled: true,
            report,
            reply: Some(reply_for(&report)),
        }
    }
}

pub fn should_handle(submission: &LogSubmission, allowed_channel_ids: &[i64]) -> bool {
    if submission.author_is_bot {
        return false;
    }
    if submission.direct_message {
        return true;
    }
    match submission.channel_id {
        Some(channel_id) => allowed_channel_ids.contains(&channel_id),
        None => false,
    }
}

pub fn gather_text(submission: &LogSubmission) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !submission.content.is_empty() {
        parts.push(&submission.content);
    }
    for attachment in &submission.attachments {
        if !is_text_attachment(attachment) {
            continue;
        }
        if let Some(text) = attachment.text.as_deref().filter(|text| !text.is_empty()) {
            parts.push(text);
        }
    }
    parts.join("\n")
}

fn is_text_attachment(attachment: &Attachment) -> bool {
    let name = attachment.filename.to_lowercase();
    let content_type = attachment
        .content_type
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    name.ends_with(".txt") || content_type.contains("text")
}

pub fn reply_for(report: &IngestReport) -> String {
    if report.inserted > 0 {
        return format!(
            "Parsed and stored {} moderation event(s). Unrecognized lines were ignored.",
            report.inserted
        );
    }
    if report.matched > 0 {
        return format!(
            "All {} moderation event(s) in your message were already recorded.",
            report.matched
        );
    }
    "I couldn't find any moderation log lines in your message. \
Expected format starts like: 'Kick @ 8/25/2025, 11:08:52 PM ...'"
        .to_string()
}

pub fn failure_reply(err: &AppError) -> String {
    format!("There was an error ingesting your logs: {err}")
}
