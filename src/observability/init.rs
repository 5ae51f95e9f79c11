//! Subscriber setup.

use super::file_writer::FileWriter;
use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "chapel";

/// File name of the trace output inside the data directory.
pub const TRACE_FILE: &str = "chapel-traces.jsonl";

/// Installs the global tracing subscriber.
///
/// Spans are exported through OpenTelemetry to `chapel-traces.jsonl` in the
/// configured data directory. With `stderr` set, events are also printed in
/// the human-readable `fmt` format.
///
/// The level comes from `RUST_LOG` if set, then `config.trace_level`, then
/// `"info"`. Only the first call in a process takes effect. If the data
/// directory cannot be created, only the stderr layer (if any) is installed.
///
/// # Example
///
/// ```rust
/// use chapel::observability::init_tracing;
/// use chapel::Config;
///
/// let dir = std::env::temp_dir().join("chapel-doc-traces");
/// let config = Config {
///     data_dir: Some(dir),
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
/// init_tracing(&config, false);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config, stderr: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.trace_level.as_deref().unwrap_or("info")));

    let data_dir = config.data_dir();
    let otel_layer = std::fs::create_dir_all(&data_dir).ok().map(|()| {
        let resource = Resource::new(vec![
            opentelemetry::KeyValue::new("service.name", SERVICE_NAME),
            opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);
        let writer = FileWriter::new(data_dir.join(TRACE_FILE));
        let provider = tracer::create_tracer_provider(writer, SERVICE_NAME, resource);
        OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME))
    });

    let fmt_layer = stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init();
}
