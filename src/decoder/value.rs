use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A decoded payload value. Records keep their fields in wire order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// field of a record by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// field names of a record, in order
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Value::Struct(fields) => fields.iter().map(|(n, _)| n.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn record_keeps_field_order_in_json() {
        let v = Value::Struct(vec![
            ("zeta".to_owned(), Value::U8(1)),
            ("alpha".to_owned(), Value::Array(vec![Value::Bool(true), Value::Bool(false)])),
            ("mid".to_owned(), Value::String("中文".to_owned())),
        ]);
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"zeta":1,"alpha":[true,false],"mid":"中文"}"#
        );
        assert_eq!(v.field_names(), ["zeta", "alpha", "mid"]);
        assert_eq!(v.get("mid").and_then(Value::as_str), Some("中文"));
        assert_eq!(v.get("alpha").and_then(Value::as_array).map(|a| a.len()), Some(2));
        assert!(v.get("nope").is_none());
    }

    #[test]
    fn numbers_in_json() {
        assert_eq!(serde_json::to_string(&Value::I16(-2)).unwrap(), "-2");
        assert_eq!(serde_json::to_string(&Value::F64(1.5)).unwrap(), "1.5");
        assert_eq!(
            serde_json::to_string(&Value::U64(u64::MAX)).unwrap(),
            "18446744073709551615"
        );
    }
}
