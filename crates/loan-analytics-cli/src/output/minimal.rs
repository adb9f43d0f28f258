use serde_json::Value;

/// Print just the headline answer from the output.
///
/// Looks for well-known result fields in priority order, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "monthly_payment",
        "recommendation",
        "best_recommended",
        "break_even_months",
        "minimum_payment_now",
        "progress_percent",
        "payoff_date",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        // e.g. the recommendation object: its strategy is the answer
        Value::Object(map) if map.contains_key("strategy") => format_minimal(&map["strategy"]),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
