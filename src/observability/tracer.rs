//! OpenTelemetry tracer provider that exports finished spans to a JSON-lines
//! file.

use super::file_writer::FileWriter;
use super::span_formatter::SpanFormatter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry::Key;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes each exported span as one line of the trace file.
struct JsonLinesExporter {
    writer: FileWriter,
    formatter: SpanFormatter,
    is_shutdown: AtomicBool,
}

impl JsonLinesExporter {
    fn new(writer: FileWriter, service: &str) -> Self {
        Self {
            writer,
            formatter: SpanFormatter::new(service),
            is_shutdown: AtomicBool::new(false),
        }
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let result = batch
            .iter()
            .try_for_each(|span| self.writer.write_line(&self.formatter.format(span)))
            .map_err(|e| TraceError::from(e.to_string()));

        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }

    fn set_resource(&mut self, resource: &Resource) {
        if let Some(service) = resource.get(Key::from_static_str("service.name")) {
            self.formatter.set_service(service.to_string());
        }
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("writer", &self.writer)
            .field("formatter", &self.formatter)
            .field("is_shutdown", &self.is_shutdown)
            .finish()
    }
}

/// Builds a provider that exports every span as soon as it ends.
pub fn create_tracer_provider(writer: FileWriter, service: &str, resource: Resource) -> TracerProvider {
    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(JsonLinesExporter::new(writer, service))
        .build()
}
