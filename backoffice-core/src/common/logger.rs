//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production
//! environments:
//! - Console output, pretty in development and JSON in production
//! - Optional daily rotating application log files

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console-only logging (development convenience)
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    init_logger_with_file(level, false, None)
}

/// Initialize the logging system with an optional daily rotating file layer
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - Whether to use JSON format (true for production)
/// * `log_dir` - Optional directory for file logging (e.g., Some("./work_dir/logs"))
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_format {
        // JSON format for production
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let app_log_dir = Path::new(dir).join("app");
            fs::create_dir_all(&app_log_dir)?;

            // Daily rotating appender for application logs
            let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
            let app_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(EnvFilter::new(level));

            subscriber.with(console_layer).with(app_layer).init();
        } else {
            subscriber.with(console_layer).init();
        }
    } else {
        // Pretty format for development
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let app_log_dir = Path::new(dir).join("app");
            fs::create_dir_all(&app_log_dir)?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
            let app_layer = fmt::layer()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(EnvFilter::new(level));

            subscriber.with(console_layer).with(app_layer).init();
        } else {
            subscriber.with(console_layer).init();
        }
    }

    Ok(())
}
