pub mod event_commands;
pub mod identity_commands;
pub mod ingest_commands;
pub mod submission_commands;
