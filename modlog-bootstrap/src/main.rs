use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use modlog_bootstrap::{ingest_file, parse_input, AppContext};
use modlog_domain::SourceRef;

#[derive(Parser, Debug)]
#[command(name = "modlog")]
#[command(about = "Moderation log ingestion", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print recognized events as JSON lines without touching the database
    Parse {
        /// Log file, or `-` for stdin
        path: String,
    },
    /// Ingest a log file into the database
    IngestFile {
        path: PathBuf,
        #[arg(long)]
        message_id: Option<i64>,
        #[arg(long)]
        channel_id: Option<i64>,
    },
    /// Run the HTTP server (default)
    Serve,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing(format: LogFormat, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console = fmt::layer().with_writer(std::io::stderr);
    layers.push(match format {
        LogFormat::Text => console.with_filter(env_filter()).boxed(),
        LogFormat::Json => console.json().with_filter(env_filter()).boxed(),
    });

    let guard = log_dir.map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, "modlog.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file = fmt::layer().with_ansi(false).with_writer(writer);
        layers.push(match format {
            LogFormat::Text => file.with_filter(env_filter()).boxed(),
            LogFormat::Json => file.json().with_filter(env_filter()).boxed(),
        });
        guard
    });

    tracing_subscriber::registry().with(layers).init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(args.log_format, args.log_dir.as_deref());
    let config_path = args.config.as_deref();

    match args.command.unwrap_or(Command::Serve) {
        Command::Parse { path } => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            parse_input(&path, &mut out).await?;
        }
        Command::IngestFile {
            path,
            message_id,
            channel_id,
        } => {
            let context = AppContext::new(config_path).await?;
            let result = ingest_file(&context, &path, SourceRef::new(message_id, channel_id)).await;
            context.shutdown().await;
            let report = result?;
            println!("Inserted {} events from {}", report.inserted, path.display());
        }
        Command::Serve => modlog_bootstrap::run(config_path).await?,
    }
    Ok(())
}
