//! Output formatting for CLI

use serde::Serialize;
use tabled::{Table, Tabled};
use vidloop_core::{PlayerEventRecord, PlayerSnapshot};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

#[derive(Tabled)]
struct PropertyRow {
    property: &'static str,
    value: String,
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "#")]
    sequence: u64,
    event: &'static str,
    details: String,
}

/// Serialize to pretty JSON, falling back to an empty object
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// Render player properties
pub fn format_snapshot(snapshot: &PlayerSnapshot, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(snapshot),
        OutputFormat::Table => {
            let rows: Vec<PropertyRow> = snapshot
                .properties()
                .into_iter()
                .map(|(property, value)| PropertyRow { property, value })
                .collect();
            Table::new(rows).to_string()
        }
        OutputFormat::Text => snapshot
            .properties()
            .into_iter()
            .map(|(name, value)| format!("  {}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn event_details(record: &PlayerEventRecord) -> String {
    // Everything but the metadata and the tag
    let mut value = serde_json::to_value(&record.event).unwrap_or_default();
    if let Some(map) = value.as_object_mut() {
        map.remove("event");
        map.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        String::new()
    }
}

/// Render a recorded event log
pub fn format_events(records: &[PlayerEventRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&records),
        OutputFormat::Table => {
            let rows: Vec<EventRow> = records
                .iter()
                .map(|r| EventRow {
                    sequence: r.sequence,
                    event: r.event.name(),
                    details: event_details(r),
                })
                .collect();
            Table::new(rows).to_string()
        }
        OutputFormat::Text => records
            .iter()
            .map(|r| format!("  {:>3}. {} {}", r.sequence, r.event.name(), event_details(r)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
