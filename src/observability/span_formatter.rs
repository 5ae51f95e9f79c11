//! One JSON object per finished span.

use chrono::{DateTime, Utc};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry::Value;
use opentelemetry_sdk::export::trace::SpanData;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::time::SystemTime;

/// A finished span as written to the trace file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    pub service: String,
    pub trace_id: String,
    pub span_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub name: String,
    pub start: DateTime<Utc>,
    pub duration_us: i64,
    pub attributes: BTreeMap<String, JsonValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An event recorded inside a span (a `tracing::info!` and friends).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub time: DateTime<Utc>,
    pub name: String,
    pub attributes: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone)]
pub struct SpanFormatter {
    service: String,
}

impl SpanFormatter {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    pub fn set_service(&mut self, service: impl Into<String>) {
        self.service = service.into();
    }

    pub fn record(&self, span: &SpanData) -> SpanRecord {
        let start = timestamp(span.start_time);
        let end = timestamp(span.end_time);

        SpanRecord {
            service: self.service.clone(),
            trace_id: format!("{:032x}", span.span_context.trace_id()),
            span_id: format!("{:016x}", span.span_context.span_id()),
            parent_span_id: (span.parent_span_id != SpanId::INVALID).then(|| format!("{:016x}", span.parent_span_id)),
            name: span.name.to_string(),
            start,
            duration_us: (end - start).num_microseconds().unwrap_or(i64::MAX),
            attributes: attributes(span.attributes.iter().map(|kv| (kv.key.as_str(), &kv.value))),
            events: span
                .events
                .iter()
                .map(|event| EventRecord {
                    time: timestamp(event.timestamp),
                    name: event.name.to_string(),
                    attributes: attributes(event.attributes.iter().map(|kv| (kv.key.as_str(), &kv.value))),
                })
                .collect(),
            error: match &span.status {
                Status::Error { description } => Some(description.to_string()),
                Status::Ok | Status::Unset => None,
            },
        }
    }

    /// The span as a single JSON line.
    pub fn format(&self, span: &SpanData) -> String {
        serde_json::to_string(&self.record(span)).unwrap_or_else(|e| {
            serde_json::json!({ "service": self.service, "name": span.name, "formatError": e.to_string() })
                .to_string()
        })
    }
}

fn timestamp(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

fn attributes<'a>(pairs: impl Iterator<Item = (&'a str, &'a Value)>) -> BTreeMap<String, JsonValue> {
    pairs.map(|(key, value)| (key.to_string(), attribute_value(value))).collect()
}

pub(crate) fn attribute_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::I64(i) => JsonValue::from(*i),
        Value::F64(f) => JsonValue::from(*f),
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Array(_) => JsonValue::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn attribute_values_map_to_json() {
        assert_eq!(attribute_value(&Value::Bool(true)), JsonValue::Bool(true));
        assert_eq!(attribute_value(&Value::I64(42)), serde_json::json!(42));
        assert_eq!(attribute_value(&Value::from("grace")), serde_json::json!("grace"));
    }

    #[test]
    fn records_serialize_camel_case_and_skip_empty() {
        let record = SpanRecord {
            service: "chapel".to_string(),
            trace_id: "0".repeat(32),
            span_id: "1".repeat(16),
            parent_span_id: None,
            name: "search".to_string(),
            start: Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
            duration_us: 1500,
            attributes: BTreeMap::from([("query".to_string(), serde_json::json!("grace"))]),
            events: Vec::new(),
            error: None,
        };

        let json: JsonValue = serde_json::to_value(&record).unwrap();
        assert_eq!(json["traceId"], serde_json::json!("0".repeat(32)));
        assert_eq!(json["durationUs"], serde_json::json!(1500));
        assert_eq!(json["start"], serde_json::json!("2025-06-01T09:30:00Z"));
        assert_eq!(json["attributes"]["query"], serde_json::json!("grace"));
        assert!(json.get("parentSpanId").is_none());
        assert!(json.get("events").is_none());
    }
}
