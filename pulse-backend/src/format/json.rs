use bytes::Bytes;
use pulse_core::Raw;
use serde_json::Value;

use super::{Format, FormatError};

/// JSON encoding (default).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn encode(&self, value: &Value) -> Result<Raw, FormatError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, FormatError> {
        serde_json::from_slice(data).map_err(|err| FormatError::Deserialize(Box::new(err)))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_field_order() {
        let value = json!({"z": 1, "a": [true, null]});
        let raw = JsonFormat.encode(&value).unwrap();
        assert_eq!(&raw[..], br#"{"z":1,"a":[true,null]}"#);
        assert_eq!(JsonFormat.decode(&raw).unwrap(), value);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            JsonFormat.decode(b"{not json"),
            Err(FormatError::Deserialize(_))
        ));
    }
}
