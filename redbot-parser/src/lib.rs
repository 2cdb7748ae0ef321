//! # redbot-parser
//!
//! Pure formatter for red.cl prediction payloads: [`parse`] flattens the
//! nested `servicios.item[]` shape into ordered [`PredictionRecord`]s,
//! [`render`] turns them into the bordered reply block.
//!
//! The upstream payload names per-bus fields by a common prefix plus an
//! integer suffix (`distanciabus1`, `horaprediccionbus1`, `distanciabus2`,
//! ...). There is no explicit ordering field, so records keep the service
//! order of the payload and ascending suffix order within a service.

use serde_json::Value;

/// Glyph shown in place of a missing distance or ETA ("sleeping" bus).
pub const SLEEPING: &str = "💤";

const DISTANCE_PREFIX: &str = "distanciabus";
const ETA_PREFIX: &str = "horaprediccionbus";
const SEPARATOR_GLYPH: &str = "➖";
const SEPARATOR_WIDTH: usize = 15;

/// One bus approaching a stop. Absent fields mean the upstream reported no
/// live value for that slot. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord {
    pub service: String,
    pub distance_meters: Option<u32>,
    pub eta_label: Option<String>,
}

/// Flattens a raw prediction payload into one record per (service, bus slot).
///
/// For each entry of `servicios.item[]` the integer suffixes of its
/// `distanciabus*` keys are collected and sorted ascending; one record is
/// emitted per suffix, pairing `distanciabus{i}` with `horaprediccionbus{i}`.
/// Empty or non-numeric values become `None`. Items without the expected
/// shape contribute no records; the function never fails.
pub fn parse(payload: &Value) -> Vec<PredictionRecord> {
    let mut records = Vec::new();

    let items = match payload.pointer("/servicios/item").and_then(Value::as_array) {
        Some(items) => items,
        None => return records,
    };

    for item in items {
        let obj = match item.as_object() {
            Some(obj) => obj,
            None => continue,
        };
        let service = match obj.get("servicio").and_then(Value::as_str) {
            Some(service) => service,
            None => continue,
        };

        let mut suffixes: Vec<u32> = obj
            .keys()
            .filter_map(|key| key.strip_prefix(DISTANCE_PREFIX)?.parse().ok())
            .collect();
        suffixes.sort_unstable();

        for suffix in suffixes {
            let distance = obj
                .get(&format!("{DISTANCE_PREFIX}{suffix}"))
                .and_then(numeric_field);
            let eta = obj
                .get(&format!("{ETA_PREFIX}{suffix}"))
                .and_then(text_field);

            records.push(PredictionRecord {
                service: service.to_string(),
                distance_meters: distance,
                eta_label: eta,
            });
        }
    }

    records
}

/// Renders records as a bordered block: separator line, one line per record,
/// separator line. Missing fields render as the [`SLEEPING`] glyph, never as
/// an empty string. Total: well-formed records always produce a line.
pub fn render(records: &[PredictionRecord]) -> String {
    let separator = SEPARATOR_GLYPH.repeat(SEPARATOR_WIDTH);

    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(separator.clone());
    for record in records {
        let distance = record
            .distance_meters
            .map(|d| format!("{d}m"))
            .unwrap_or_else(|| SLEEPING.to_string());
        let eta = record.eta_label.as_deref().unwrap_or(SLEEPING);
        lines.push(format!("🚍 {} {} ({})", record.service, distance, eta));
    }
    lines.push(separator);

    lines.join("\n")
}

/// Reads a distance value: a non-empty numeric string or a JSON number.
fn numeric_field(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

/// Reads an ETA label: a non-empty string.
fn text_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn separator() -> String {
        SEPARATOR_GLYPH.repeat(SEPARATOR_WIDTH)
    }

    #[test]
    fn test_parse_pairs_distance_and_eta_by_suffix() {
        let payload = json!({
            "servicios": {
                "item": [
                    {
                        "servicio": "506",
                        "distanciabus1": "120",
                        "horaprediccionbus1": "3 min",
                        "distanciabus2": "",
                        "horaprediccionbus2": ""
                    }
                ]
            }
        });

        let records = parse(&payload);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].service, "506");
        assert_eq!(records[0].distance_meters, Some(120));
        assert_eq!(records[0].eta_label.as_deref(), Some("3 min"));
        assert_eq!(records[1].service, "506");
        assert_eq!(records[1].distance_meters, None);
        assert_eq!(records[1].eta_label, None);
    }

    #[test]
    fn test_parse_preserves_service_order_and_sorts_suffixes() {
        // bus2 keys appear before bus1 in the payload; output is still 1 then 2.
        let payload = json!({
            "servicios": {
                "item": [
                    {
                        "servicio": "210",
                        "distanciabus2": "900",
                        "horaprediccionbus2": "12 min",
                        "distanciabus1": "300",
                        "horaprediccionbus1": "5 min"
                    },
                    {
                        "servicio": "506",
                        "distanciabus1": "50",
                        "horaprediccionbus1": "1 min"
                    }
                ]
            }
        });

        let records = parse(&payload);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].service, "210");
        assert_eq!(records[0].distance_meters, Some(300));
        assert_eq!(records[1].service, "210");
        assert_eq!(records[1].distance_meters, Some(900));
        assert_eq!(records[2].service, "506");
        assert_eq!(records[2].distance_meters, Some(50));
    }

    #[test]
    fn test_parse_record_count_matches_suffix_pairs() {
        let payload = json!({
            "servicios": {
                "item": [
                    { "servicio": "A", "distanciabus1": "1", "distanciabus2": "2", "distanciabus3": "3" },
                    { "servicio": "B", "distanciabus1": "4" }
                ]
            }
        });

        assert_eq!(parse(&payload).len(), 4);
    }

    #[test]
    fn test_parse_ignores_non_numeric_suffix_keys() {
        let payload = json!({
            "servicios": {
                "item": [
                    { "servicio": "A", "distanciabusX": "1", "distanciabus1": "77" }
                ]
            }
        });

        let records = parse(&payload);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].distance_meters, Some(77));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let payload = json!({
            "servicios": {
                "item": [
                    { "servicio": "506", "distanciabus1": "120", "horaprediccionbus1": "3 min" }
                ]
            }
        });

        assert_eq!(parse(&payload), parse(&payload));
    }

    #[test]
    fn test_parse_tolerates_malformed_payload() {
        assert!(parse(&json!({})).is_empty());
        assert!(parse(&json!({ "servicios": {} })).is_empty());
        assert!(parse(&json!({ "servicios": { "item": "not an array" } })).is_empty());
        assert!(parse(&json!({ "servicios": { "item": [42] } })).is_empty());
    }

    #[test]
    fn test_render_is_bordered_with_one_line_per_record() {
        let records = vec![
            PredictionRecord {
                service: "506".to_string(),
                distance_meters: Some(120),
                eta_label: Some("3 min".to_string()),
            },
            PredictionRecord {
                service: "506".to_string(),
                distance_meters: None,
                eta_label: None,
            },
        ];

        let text = render(&records);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], separator());
        assert_eq!(lines[1], "🚍 506 120m (3 min)");
        assert_eq!(lines[2], format!("🚍 506 {SLEEPING} ({SLEEPING})"));
        assert_eq!(lines[3], separator());
    }

    #[test]
    fn test_render_never_emits_empty_or_none_fields() {
        let records = vec![PredictionRecord {
            service: "210".to_string(),
            distance_meters: None,
            eta_label: None,
        }];

        let text = render(&records);
        assert!(!text.contains("None"));
        assert!(!text.contains("()"));
        assert!(text.contains(SLEEPING));
    }

    #[test]
    fn test_render_empty_records_is_just_the_border() {
        let text = render(&[]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![separator(), separator()]);
    }
}
