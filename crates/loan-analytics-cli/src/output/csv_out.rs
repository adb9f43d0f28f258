use serde_json::{Map, Value};
use std::io;

/// Write output as CSV to stdout.
///
/// A result whose only nested part is a list of records (a schedule's
/// `entries`, ranked `offers`) is written one record per row. Anything else
/// is flattened to field/value pairs with dotted keys.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };

            match sole_record_list(body) {
                Some(arr) => write_array_csv(&mut wtr, arr),
                None => {
                    let _ = wtr.write_record(["field", "value"]);
                    let mut flat = Vec::new();
                    flatten(None, body, &mut flat);
                    for (key, val) in flat {
                        let _ = wtr.write_record([key.as_str(), val.as_str()]);
                    }
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// The record list, if it is the only non-scalar field.
fn sole_record_list(body: &Map<String, Value>) -> Option<&Vec<Value>> {
    let mut nested = body.values().filter(|v| v.is_object() || v.is_array());
    match (nested.next(), nested.next()) {
        (Some(Value::Array(arr)), None) if matches!(arr.first(), Some(Value::Object(_))) => {
            Some(arr)
        }
        _ => None,
    }
}

/// Nested objects become dotted keys (`snowball.total_interest`), record
/// lists become indexed keys (`milestones.0.title`).
fn flatten(prefix: Option<&str>, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let full = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        flatten_value(full, val, out);
    }
}

fn flatten_value(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(inner) => flatten(Some(&key), inner, out),
        Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))) => {
            for (i, item) in arr.iter().enumerate() {
                flatten_value(format!("{}.{}", key, i), item, out);
            }
        }
        _ => out.push((key, format_csv_value(value))),
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(_)) = arr.first() {
        let rows: Vec<Vec<(String, String)>> = arr
            .iter()
            .filter_map(Value::as_object)
            .map(|map| {
                let mut flat = Vec::new();
                flatten(None, map, &mut flat);
                flat
            })
            .collect();

        let headers: Vec<&str> = rows[0].iter().map(|(k, _)| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for row in &rows {
            let cells: Vec<&str> = headers
                .iter()
                .map(|h| {
                    row.iter()
                        .find(|(k, _)| k == h)
                        .map_or("", |(_, v)| v.as_str())
                })
                .collect();
            let _ = wtr.write_record(&cells);
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_entries_are_the_sole_record_list() {
        let body = json!({
            "monthly_payment": "1032.80",
            "entries": [{ "payment_number": 1 }, { "payment_number": 2 }],
        });
        let rows = sole_record_list(body.as_object().unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_comparison_with_strategies_is_flattened() {
        let body = json!({
            "current": { "total_interest": "900.00" },
            "snowball": { "total_interest": "850.00" },
            "milestones": [{ "title": "Debt-free" }],
        });
        let map = body.as_object().unwrap();
        assert!(sole_record_list(map).is_none());

        let mut flat = Vec::new();
        flatten(None, map, &mut flat);
        assert!(flat.contains(&("snowball.total_interest".to_string(), "850.00".to_string())));
        assert!(flat.contains(&("milestones.0.title".to_string(), "Debt-free".to_string())));
    }
}
