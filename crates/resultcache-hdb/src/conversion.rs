//! Conversion from HANA values to cacheable row values.

use hdbconnect::HdbValue;
use resultcache::{Row, Value};

/// Convert a HANA value to a [`Value`].
///
/// Decimals become strings to keep their precision; temporal and LOB
/// types fall back to their debug representation.
pub fn hdb_value_to_value(value: &HdbValue<'_>) -> Value {
    match value {
        HdbValue::NULL => Value::Null,
        HdbValue::BOOLEAN(v) => Value::Bool(*v),
        HdbValue::TINYINT(v) => Value::Int(i64::from(*v)),
        HdbValue::SMALLINT(v) => Value::Int(i64::from(*v)),
        HdbValue::INT(v) => Value::Int(i64::from(*v)),
        HdbValue::BIGINT(v) => Value::Int(*v),
        HdbValue::REAL(v) => Value::Float(f64::from(*v)),
        HdbValue::DOUBLE(v) => Value::Float(*v),
        HdbValue::DECIMAL(v) => Value::String(v.to_string()),
        HdbValue::STRING(v) => Value::String(v.clone()),
        HdbValue::BINARY(v) => Value::Bytes(v.clone()),
        other => Value::String(format!("{other:?}")),
    }
}

/// Pair a HANA row with its column names.
pub fn hdb_row_to_row(columns: &[String], row: &hdbconnect::Row) -> Row {
    let mut converted = Row::new();
    for (i, column) in columns.iter().enumerate().take(row.len()) {
        converted.push(column.clone(), hdb_value_to_value(&row[i]));
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null() {
        assert_eq!(hdb_value_to_value(&HdbValue::NULL), Value::Null);
    }

    #[test]
    fn test_integers_widen_to_i64() {
        assert_eq!(hdb_value_to_value(&HdbValue::TINYINT(42)), Value::Int(42));
        assert_eq!(hdb_value_to_value(&HdbValue::SMALLINT(1234)), Value::Int(1234));
        assert_eq!(hdb_value_to_value(&HdbValue::INT(123_456)), Value::Int(123_456));
        assert_eq!(
            hdb_value_to_value(&HdbValue::BIGINT(9_876_543_210)),
            Value::Int(9_876_543_210)
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(hdb_value_to_value(&HdbValue::REAL(1.5)), Value::Float(1.5));
        assert_eq!(hdb_value_to_value(&HdbValue::DOUBLE(2.25)), Value::Float(2.25));
    }

    #[test]
    fn test_string_and_bool() {
        assert_eq!(
            hdb_value_to_value(&HdbValue::STRING("hello world".to_string())),
            Value::from("hello world")
        );
        assert_eq!(hdb_value_to_value(&HdbValue::BOOLEAN(true)), Value::Bool(true));
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            hdb_value_to_value(&HdbValue::BINARY(vec![1, 2, 3])),
            Value::Bytes(vec![1, 2, 3])
        );
    }
}
