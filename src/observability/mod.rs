//! Tracing with OpenTelemetry export to a local JSON-lines file.
//!
//! ```text
//! tracing → tracing-opentelemetry → OpenTelemetry SDK → JsonLinesExporter → file
//!                                                                  │
//!                                                 (optional) fmt layer → stderr
//! ```
//!
//! - Traces go to `<data_dir>/chapel-traces.jsonl`, one span per line
//! - The file rotates at 5 MB and keeps three backups
//! - Level: `RUST_LOG`, then `trace_level` in the config, then `"info"`
//!
//! Stores emit `debug` spans for every action and `info` events for
//! submissions and initialization; storage failures are logged at `warn`.
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup
//! - [`tracer`]: Tracer provider and exporter
//! - [`span_formatter`]: Span to JSON line
//! - [`file_writer`]: Rotating file writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use file_writer::FileWriter;
pub use init::{init_tracing, TRACE_FILE};
pub use span_formatter::{EventRecord, SpanRecord};
