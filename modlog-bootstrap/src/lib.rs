pub mod cli;
pub mod context;
pub mod lifecycle;

pub use cli::{ingest_file, parse_input};
pub use context::AppContext;
pub use lifecycle::run_standalone;

pub async fn run(config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    run_standalone(config_path).await
}
