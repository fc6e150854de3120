use serde_json::Value;

use crate::error::CensusError;
use crate::types::CellValue;

/// Flat mapping from census field name to scalar cell, in payload order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CensusRecord {
    fields: Vec<(String, CellValue)>,
}

impl CensusRecord {
    pub fn from_pairs(fields: Vec<(String, CellValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Reduce one response cell to a scalar.
///
/// Single-element containers unwrap (recursively, so `[[3]]` is `3`);
/// containers with any other arity become `Missing`. Dropping multi-valued
/// cells to missing instead of picking an element is a deliberate policy:
/// an ambiguous cell is unusable as a feature, and an arbitrary pick would
/// be silent data corruption.
pub fn flat_cell(cell: &Value) -> CellValue {
    match cell {
        Value::Null => CellValue::Missing,
        Value::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => match n.as_f64() {
            Some(v) => CellValue::Number(v),
            None => CellValue::Missing,
        },
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Array(items) => match items.as_slice() {
            [only] => flat_cell(only),
            _ => CellValue::Missing,
        },
        Value::Object(map) => {
            let mut values = map.values();
            match (values.next(), values.next()) {
                (Some(only), None) => flat_cell(only),
                _ => CellValue::Missing,
            }
        }
    }
}

/// Flatten a whole webhook payload into a [`CensusRecord`].
///
/// Accepts either a bare JSON object or the records orientation: a
/// one-element array holding that object. Anything else (several rows for
/// a single-sector query, a scalar, an empty array) is a malformed payload.
pub fn flatten_record(payload: &Value) -> Result<CensusRecord, CensusError> {
    let record = match payload {
        Value::Object(map) => map,
        Value::Array(rows) => match rows.as_slice() {
            [Value::Object(map)] => map,
            [_] => {
                return Err(CensusError::UnexpectedShape(
                    "single-element array does not hold an object".into(),
                ))
            }
            rows => {
                return Err(CensusError::UnexpectedShape(format!(
                    "expected one record for one sector, got {}",
                    rows.len()
                )))
            }
        },
        other => {
            return Err(CensusError::UnexpectedShape(format!(
                "expected object or records array, got {}",
                json_kind(other)
            )))
        }
    };

    Ok(CensusRecord::from_pairs(
        record
            .iter()
            .map(|(name, cell)| (name.clone(), flat_cell(cell)))
            .collect(),
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_pass_through_unchanged() {
        assert_eq!(flat_cell(&json!(731.5)), CellValue::Number(731.5));
        assert_eq!(flat_cell(&json!("urbano")), CellValue::Text("urbano".into()));
        assert_eq!(flat_cell(&json!(null)), CellValue::Missing);
    }

    #[test]
    fn single_element_containers_unwrap() {
        assert_eq!(flat_cell(&json!([731.5])), CellValue::Number(731.5));
        assert_eq!(flat_cell(&json!([[3.0]])), CellValue::Number(3.0));
        assert_eq!(flat_cell(&json!({"$numberDouble": "7"})), CellValue::Text("7".into()));
    }

    #[test]
    fn multi_element_containers_become_missing_never_an_element() {
        assert_eq!(flat_cell(&json!([1.0, 2.0])), CellValue::Missing);
        assert_eq!(flat_cell(&json!([])), CellValue::Missing);
        assert_eq!(flat_cell(&json!({"a": 1, "b": 2})), CellValue::Missing);
    }

    #[test]
    fn flattening_is_idempotent_on_flat_output() {
        for cell in [json!(1.0), json!([1.0]), json!([1.0, 2.0]), json!("x")] {
            let once = flat_cell(&cell);
            let json_again = match &once {
                CellValue::Number(n) => json!(n),
                CellValue::Text(s) => json!(s),
                CellValue::Missing => Value::Null,
            };
            assert_eq!(flat_cell(&json_again), once);
        }
    }

    #[test]
    fn record_flattens_from_records_orientation() {
        let payload = json!([{ "BASICO_V011": [1234.5], "SITUACAO": "urbano" }]);
        let record = flatten_record(&payload).unwrap();
        assert_eq!(record.get("BASICO_V011"), Some(&CellValue::Number(1234.5)));
        assert_eq!(record.get("SITUACAO"), Some(&CellValue::Text("urbano".into())));
    }

    #[test]
    fn record_preserves_payload_field_order() {
        let payload = json!({ "z_last": 1.0, "a_first": 2.0, "m_mid": 3.0 });
        let record = flatten_record(&payload).unwrap();
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["z_last", "a_first", "m_mid"]);
    }

    #[test]
    fn multi_row_payload_is_rejected() {
        let payload = json!([{ "a": 1 }, { "a": 2 }]);
        assert!(matches!(
            flatten_record(&payload),
            Err(CensusError::UnexpectedShape(_))
        ));
    }
}
