//! Logging system demonstration
//!
//! This example shows how to use the logging infrastructure in different modes.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run --example logging_demo
//!
//! # JSON format
//! cargo run --example logging_demo -- json
//!
//! # Compact format
//! cargo run --example logging_demo -- compact
//!
//! # With custom filter
//! cargo run --example logging_demo -- pretty "core_runtime=trace"
//! ```

use bridge_traits::time::{ConsoleLogger, LogLevel};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, span, trace, warn, Level};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = if args.len() > 1 {
        match args[1].as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    } else {
        LogFormat::default()
    };

    let filter = args.get(2).cloned();

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace)
        .with_logger_sink(Arc::new(ConsoleLogger))
        .with_target(true);

    if let Some(f) = filter {
        config = config.with_filter(f);
    }

    init_logging(config).expect("Failed to initialize logging");

    info!("=== Logging System Demo ===");
    info!(format = ?format, "Logging initialized");

    demo_log_levels();
    demo_structured_logging();
    demo_spans().await;
    demo_instrumentation().await;

    info!("=== Demo Complete ===");
}

fn demo_log_levels() {
    let span = span!(Level::INFO, "log_levels");
    let _enter = span.enter();

    trace!("This is a TRACE level log");
    debug!("This is a DEBUG level log");
    info!("This is an INFO level log");
    warn!("This is a WARN level log");
    error!("This is an ERROR level log");
}

fn demo_structured_logging() {
    let span = span!(Level::INFO, "structured_logging");
    let _enter = span.enter();

    info!("Simple message without fields");

    info!(
        item_id = "6f2c1a9e",
        title = "Episode 12",
        duration_ms = 1_845_000,
        "Episode information"
    );

    info!(
        queue_len = 3,
        subscribers = 2,
        elapsed_interval_ms = 500,
        "Coordinator metrics"
    );
}

async fn demo_spans() {
    let span = span!(Level::INFO, "playback_session", item = "ep12");
    let _enter = span.enter();

    info!("Starting playback session");

    {
        let inner_span = span!(Level::DEBUG, "load_item");
        let _inner = inner_span.enter();

        debug!(source = "https://cdn.example.com/ep12.mp3", "Loading source");
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }

    {
        let inner_span = span!(Level::DEBUG, "publish_now_playing");
        let _inner = inner_span.enter();

        debug!(artwork = false, "Publishing text-only snapshot");
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }

    info!(position_ms = 0, "Playback session started");
}

#[instrument]
async fn demo_instrumentation() {
    info!("Instrumented function automatically creates spans");

    let items = vec!["ep10", "ep11", "ep12"];
    enqueue_items(&items).await;
}

#[instrument(fields(count = items.len()))]
async fn enqueue_items(items: &[&str]) {
    debug!("Enqueueing items");

    for (idx, item) in items.iter().enumerate() {
        enqueue_item(idx, item).await;
    }

    info!("All items enqueued");
}

#[instrument(fields(position = idx))]
async fn enqueue_item(idx: usize, item: &str) {
    trace!(item = %item, "Enqueueing individual item");
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
}
