use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize dotenvy
pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// File name of the log written for one process run
pub fn log_file_name(service_name: &str, started: chrono::DateTime<chrono::Local>) -> String {
    format!(
        "daybook-{}.log.{}.jsonl",
        service_name,
        started.format("%y-%m-%d-%H-%M-%S")
    )
}

/// Initialize tracing with a stderr layer and a file layer under `LOG_DIR`
///
/// The returned guard flushes the file writer when dropped, so binaries keep
/// it alive until exit.
pub fn init_tracing(service_name: &str) -> tracing_appender::non_blocking::WorkerGuard {
    // If LOG_DIR is set, use it. Default to "logs/app"
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs/app".to_string());
    let filename = log_file_name(service_name, chrono::Local::now());

    let file_appender = tracing_appender::rolling::never(&log_dir, filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = format!("info,{}=debug,daybook_core=debug", service_name);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    guard
}
