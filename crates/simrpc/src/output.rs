use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use simrpc_wire::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct CallOutput<'a> {
    method: &'a str,
    endpoint: String,
    result: serde_json::Value,
}

/// Print a call result on stdout.
pub fn print_result(method: &str, endpoint: &str, result: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = CallOutput {
                method,
                endpoint: endpoint.to_string(),
                result: value_to_json(result),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["METHOD", "ENDPOINT", "RESULT"])
                .add_row(vec![method.to_string(), endpoint.to_string(), result.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("method={method} endpoint={endpoint} result={result}");
        }
        OutputFormat::Raw => {
            println!("{result}");
        }
    }
}

/// Convert a wire value to JSON for display.
///
/// Lossy at the edges: binary becomes a size preview, non-string map keys are
/// stringified, and non-finite floats become null. Good enough for eyes and
/// scripts; not a wire format.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::UInt(n) => serde_json::Value::from(*n),
        Value::F32(f) => serde_json::Number::from_f64(f64::from(*f))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::F64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Bin(bytes) => serde_json::Value::String(format!("<binary {} bytes>", bytes.len())),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, val)| {
                    let key = match key {
                        Value::Str(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key, value_to_json(val))
                })
                .collect(),
        ),
    }
}

/// Convert a JSON argument into a wire value.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::F64(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, val)| (Value::Str(key.clone()), json_to_value(val)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_to_value_picks_narrowest_integer() {
        assert_eq!(json_to_value(&serde_json::json!(-3)), Value::Int(-3));
        assert_eq!(json_to_value(&serde_json::json!(3)), Value::Int(3));
        assert_eq!(
            json_to_value(&serde_json::json!(u64::MAX)),
            Value::UInt(u64::MAX)
        );
        assert_eq!(json_to_value(&serde_json::json!(1.5)), Value::F64(1.5));
    }

    #[test]
    fn value_to_json_roundtrips_structures() {
        let value = Value::Map(vec![
            (Value::from("ok"), Value::Bool(true)),
            (
                Value::from("items"),
                Value::Array(vec![Value::Int(1), Value::Nil]),
            ),
        ]);
        assert_eq!(
            value_to_json(&value),
            serde_json::json!({"ok": true, "items": [1, null]})
        );
    }

    #[test]
    fn binary_payload_becomes_preview() {
        let value = Value::Bin(vec![0, 1, 2]);
        assert_eq!(
            value_to_json(&value),
            serde_json::Value::String("<binary 3 bytes>".to_string())
        );
    }

    #[test]
    fn non_string_map_keys_are_stringified() {
        let value = Value::Map(vec![(Value::Int(7), Value::Bool(true))]);
        assert_eq!(value_to_json(&value), serde_json::json!({"7": true}));
    }
}
