//! JSON import: an array of objects, or `{ "employees": [...] }`.

use std::collections::HashMap;

use serde_json::Value;

use crate::{
  Error, Result,
  fields::{Field, RawRow, normalize_key},
};

pub fn parse(input: &str) -> Result<Vec<RawRow>> {
  let doc: Value = serde_json::from_str(input)?;
  let items = match doc {
    Value::Array(items) => items,
    Value::Object(mut map) => match map.remove("employees") {
      Some(Value::Array(items)) => items,
      _ => return Err(Error::UnsupportedShape),
    },
    _ => return Err(Error::UnsupportedShape),
  };

  Ok(items.iter().map(row_from_item).collect())
}

/// Anything that is not an object becomes a fully defaulted row.
fn row_from_item(item: &Value) -> RawRow {
  let mut row = RawRow::default();
  let Value::Object(map) = item else {
    return row;
  };

  let by_key: HashMap<String, &Value> =
    map.iter().map(|(k, v)| (normalize_key(k), v)).collect();

  for field in Field::ALL {
    let value = field.pick(|alias| by_key.get(alias).and_then(|v| scalar(v)));
    if let Some(value) = value {
      row.set(field, value);
    }
  }
  row
}

fn scalar(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
