// Moderation log application layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod queries;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::ingest_commands::{IngestReport, IngestionPipeline};
pub use commands::submission_commands::{Attachment, LogSubmission, SubmissionOutcome};
pub use error::AppError;
pub use metrics::Metrics;
pub use state::AppState;
