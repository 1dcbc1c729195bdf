// normalize.rs
// Response normalization: flatten extended-JSON leaves left over from the
// document engine, alias `_id`/`id` both ways, and render money fields with
// Indian digit grouping. Applied to every record the API returns so clients
// see the same shape regardless of which storage engine produced it.

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::format::{MONEY_FIELDS, format_inr};
use crate::models::{RC_TEXT_FIELDS, as_flag};

/// Serialize a record and normalize it for the wire.
pub fn normalize_record<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record)
        .map(normalize_value)
        .unwrap_or(Value::Null)
}

pub fn normalize_records<T: Serialize>(records: &[T]) -> Value {
    Value::Array(records.iter().map(normalize_record).collect())
}

/// Recursively normalize a JSON tree.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => normalize_object(map),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

fn normalize_object(map: Map<String, Value>) -> Value {
    if let Some(flat) = flatten_extended(&map) {
        return flat;
    }

    let mut out = Map::with_capacity(map.len() + 1);
    for (key, value) in map {
        let value = normalize_value(value);
        let value = if MONEY_FIELDS.contains(&key.as_str()) {
            money_display(value)
        } else {
            value
        };
        out.insert(key, value);
    }

    match (out.contains_key("_id"), out.contains_key("id")) {
        (true, false) => {
            if let Some(id) = out.get("_id").cloned() {
                out.insert("id".to_string(), id);
            }
        }
        (false, true) => {
            if let Some(id) = out.get("id").cloned() {
                out.insert("_id".to_string(), id);
            }
        }
        _ => {}
    }

    Value::Object(out)
}

/// Collapse single-key extended-JSON wrappers to plain scalars. Anything not
/// recognized is left for the recursive pass.
fn flatten_extended(map: &Map<String, Value>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }
    if let Some(Value::String(hex)) = map.get("$oid") {
        return Some(Value::String(hex.clone()));
    }
    match map.get("$date") {
        Some(Value::String(text)) => return Some(Value::String(text.clone())),
        Some(Value::Object(inner)) => {
            if let Some(Value::String(millis)) = inner.get("$numberLong") {
                if let Some(formatted) = millis.parse::<i64>().ok().and_then(format_millis) {
                    return Some(Value::String(formatted));
                }
            }
        }
        _ => {}
    }
    if let Some(Value::String(text)) = map.get("$numberLong") {
        if let Ok(parsed) = text.parse::<i64>() {
            return Some(Value::Number(parsed.into()));
        }
    }
    None
}

fn format_millis(millis: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn money_display(value: Value) -> Value {
    match value.as_f64() {
        Some(amount) => Value::String(format_inr(amount)),
        None => value,
    }
}

/// Resolve RC read fields on an already normalized record: promoted columns
/// win when non-empty, the `details` blob fills the gaps, and text fields
/// fall back to the empty string so clients always see every key.
pub fn resolve_rc_fields(value: &mut Value) {
    let Some(record) = value.as_object_mut() else {
        return;
    };
    let details = match record.get("details") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    for key in RC_TEXT_FIELDS {
        let column_empty = !matches!(record.get(key), Some(Value::String(text)) if !text.is_empty());
        if column_empty {
            let fallback = details
                .get(key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .unwrap_or("");
            record.insert(key.to_string(), Value::String(fallback.to_string()));
        }
    }

    let detail_status = details.get("status").and_then(Value::as_object);
    let mut flags = Map::new();
    for flag in ["rtoFeesPaid", "transferred", "returnedToDealer"] {
        let column = record
            .get("status")
            .and_then(|status| status.get(flag))
            .and_then(as_flag)
            .unwrap_or(false);
        let detail = detail_status
            .and_then(|status| status.get(flag))
            .and_then(as_flag)
            .unwrap_or(false);
        flags.insert(flag.to_string(), Value::Bool(column || detail));
    }
    record.insert("status".to_string(), Value::Object(flags));

    for key in ["pdfUrl", "pdfPublicId"] {
        let column_empty = !matches!(record.get(key), Some(Value::String(text)) if !text.is_empty());
        if column_empty {
            let fallback = details
                .get(key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .unwrap_or("");
            record.insert(key.to_string(), Value::String(fallback.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn flattens_oid_and_aliases_id() {
        let raw = json!({
            "_id": { "$oid": "656e7a1f2b3c4d5e6f708192" },
            "make": "Maruti"
        });
        let out = normalize_value(raw);
        assert_eq!(out["_id"], json!("656e7a1f2b3c4d5e6f708192"));
        assert_eq!(out["id"], json!("656e7a1f2b3c4d5e6f708192"));
    }

    #[test]
    fn aliases_relational_id_back_to_underscore() {
        let out = normalize_value(json!({ "id": "abc123", "name": "x" }));
        assert_eq!(out["_id"], json!("abc123"));
    }

    #[test]
    fn existing_pair_left_alone() {
        let out = normalize_value(json!({ "_id": "a", "id": "b" }));
        assert_eq!(out["_id"], json!("a"));
        assert_eq!(out["id"], json!("b"));
    }

    #[test]
    fn flattens_wrapped_dates_to_rfc3339() {
        let raw = json!({ "createdAt": { "$date": { "$numberLong": "1717236000000" } } });
        let out = normalize_value(raw);
        assert_eq!(out["createdAt"], json!("2024-06-01T10:00:00.000Z"));
    }

    #[test]
    fn passthrough_string_dates() {
        let raw = json!({ "createdAt": { "$date": "2024-06-01T10:00:00Z" } });
        let out = normalize_value(raw);
        assert_eq!(out["createdAt"], json!("2024-06-01T10:00:00Z"));
    }

    #[test]
    fn money_fields_become_grouped_strings() {
        let raw = json!({ "buyingPrice": 1234567, "manufactureYear": 2019 });
        let out = normalize_value(raw);
        assert_eq!(out["buyingPrice"], json!("12,34,567"));
        assert_eq!(out["manufactureYear"], json!(2019));
    }

    #[test]
    fn money_formatting_reaches_nested_records() {
        let raw = json!({
            "serviceItems": [{ "description": "oil", "amount": 1500 }],
            "grandTotal": 100000.5
        });
        let out = normalize_value(raw);
        assert_eq!(out["grandTotal"], json!("1,00,000.5"));
        // line-item `amount` is not a listed money field
        assert_eq!(out["serviceItems"][0]["amount"], json!(1500));
    }

    #[test]
    fn money_strings_left_untouched() {
        let out = normalize_value(json!({ "total": "1,000" }));
        assert_eq!(out["total"], json!("1,000"));
    }

    #[test]
    fn rc_column_wins_over_details() {
        let mut record = json!({
            "ownerName": "Column Owner",
            "details": { "ownerName": "Blob Owner" },
            "status": {}
        });
        resolve_rc_fields(&mut record);
        assert_eq!(record["ownerName"], json!("Column Owner"));
    }

    #[test]
    fn rc_details_fill_empty_columns() {
        let mut record = json!({
            "ownerName": "",
            "details": {
                "ownerName": "Blob Owner",
                "status": { "transferred": "true" },
                "pdfUrl": "https://files/rc.pdf"
            },
            "status": { "rtoFeesPaid": true, "transferred": false, "returnedToDealer": false },
            "pdfUrl": null
        });
        resolve_rc_fields(&mut record);
        assert_eq!(record["ownerName"], json!("Blob Owner"));
        assert_eq!(record["status"]["transferred"], json!(true));
        assert_eq!(record["status"]["rtoFeesPaid"], json!(true));
        assert_eq!(record["pdfUrl"], json!("https://files/rc.pdf"));
    }

    #[test]
    fn rc_missing_everywhere_defaults_to_empty() {
        let mut record = json!({ "details": {}, "status": {} });
        resolve_rc_fields(&mut record);
        assert_eq!(record["remarks"], json!(""));
        assert_eq!(record["status"]["returnedToDealer"], json!(false));
        assert_eq!(record["pdfPublicId"], json!(""));
    }
}
