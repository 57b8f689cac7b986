use serde_json::Value;

use crate::error::ValidationError;

/// Keys every animation document must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["v", "fr", "w", "h"];

/// Fallback out-point when a document omits `op`.
pub const DEFAULT_OUT_POINT: f64 = 60.0;

/// A validated animation document.
///
/// The document stays a raw JSON tree so editing preserves every key the
/// producer wrote, known to us or not; this type only guarantees the
/// structural contract checked by [`AnimationDocument::from_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDocument {
    root: Value,
}

impl AnimationDocument {
    /// Validates raw JSON bytes. Does not decompress; run the codec first
    /// when the container is a `.lottie` stream.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.is_empty() || bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ValidationError::EmptyInput);
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| ValidationError::MalformedJson(err.to_string()))?;
        Self::from_value(value)
    }

    /// Validates an already-parsed JSON value.
    ///
    /// The check order is part of the contract: structural failures surface
    /// before field-level ones so error messages stay specific. The value is
    /// returned unchanged on success.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None if value.is_null() => return Err(ValidationError::EmptyInput),
            None => return Err(ValidationError::NotAnObject),
        };

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !obj.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { names: missing });
        }

        match &obj["v"] {
            Value::String(_) | Value::Number(_) => {}
            _ => return Err(ValidationError::InvalidField { name: "v" }),
        }

        for name in ["fr", "w", "h"] {
            match obj[name].as_f64() {
                Some(n) if n > 0.0 => {}
                _ => return Err(ValidationError::InvalidField { name }),
            }
        }

        // Empty sequences are valid: placeholder documents carry no layers.
        for name in ["layers", "assets"] {
            if let Some(field) = obj.get(name) {
                if !field.is_array() {
                    return Err(ValidationError::InvalidField { name });
                }
            }
        }

        Ok(Self { root: value })
    }

    /// Wraps a value derived from an already-validated document, e.g. a deep
    /// copy produced by materialization. The caller vouches for the contract.
    pub fn from_value_unchecked(value: Value) -> Self {
        Self { root: value }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Format version tag, rendered to text whether the producer wrote a
    /// string or a bare number.
    pub fn version(&self) -> Option<String> {
        match &self.root["v"] {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.root.get("nm").and_then(Value::as_str)
    }

    pub fn frame_rate(&self) -> f64 {
        self.root["fr"].as_f64().unwrap_or(0.0)
    }

    pub fn width(&self) -> f64 {
        self.root["w"].as_f64().unwrap_or(0.0)
    }

    pub fn height(&self) -> f64 {
        self.root["h"].as_f64().unwrap_or(0.0)
    }

    pub fn in_point(&self) -> f64 {
        self.root.get("ip").and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn out_point(&self) -> f64 {
        self.root
            .get("op")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_OUT_POINT)
    }

    pub fn layers(&self) -> &[Value] {
        self.root
            .get("layers")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    pub fn layers_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.root.get_mut("layers").and_then(Value::as_array_mut)
    }

    pub fn assets(&self) -> &[Value] {
        self.root
            .get("assets")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_document_with_empty_layers() {
        let doc = AnimationDocument::from_value(
            json!({"v": "5.9.6", "fr": 30, "w": 512, "h": 512, "layers": []}),
        )
        .unwrap();
        assert_eq!(doc.version().as_deref(), Some("5.9.6"));
        assert_eq!(doc.frame_rate(), 30.0);
        assert!(doc.layers().is_empty());
    }

    #[test]
    fn accepts_numeric_version() {
        let doc =
            AnimationDocument::from_value(json!({"v": 5, "fr": 24, "w": 100, "h": 100})).unwrap();
        assert_eq!(doc.version().as_deref(), Some("5"));
    }

    #[test]
    fn rejects_empty_and_whitespace_input() {
        assert_eq!(
            AnimationDocument::from_bytes(b"").unwrap_err(),
            ValidationError::EmptyInput
        );
        assert_eq!(
            AnimationDocument::from_bytes(b"  \n\t ").unwrap_err(),
            ValidationError::EmptyInput
        );
    }

    #[test]
    fn rejects_malformed_json_with_parser_message() {
        let err = AnimationDocument::from_bytes(b"{\"v\": ").unwrap_err();
        assert_eq!(err.code(), "MALFORMED_JSON");
        match err {
            ValidationError::MalformedJson(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object_top_level() {
        assert_eq!(
            AnimationDocument::from_bytes(b"[1, 2, 3]").unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn names_every_missing_field() {
        let err = AnimationDocument::from_value(json!({"fr": 30, "w": 512, "h": 512}))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                names: vec!["v".to_string()]
            }
        );

        let err = AnimationDocument::from_value(json!({"w": 512})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                names: vec!["v".to_string(), "fr".to_string(), "h".to_string()]
            }
        );
    }

    #[test]
    fn rejects_non_positive_dimensions_and_frame_rate() {
        for (field, doc) in [
            ("fr", json!({"v": "5.0", "fr": 0, "w": 512, "h": 512})),
            ("w", json!({"v": "5.0", "fr": 30, "w": -1, "h": 512})),
            ("h", json!({"v": "5.0", "fr": 30, "w": 512, "h": "tall"})),
        ] {
            assert_eq!(
                AnimationDocument::from_value(doc).unwrap_err(),
                ValidationError::InvalidField { name: field }
            );
        }
    }

    #[test]
    fn rejects_non_sequence_layers_and_assets() {
        let err = AnimationDocument::from_value(
            json!({"v": "5.0", "fr": 30, "w": 512, "h": 512, "layers": {}}),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidField { name: "layers" });

        let err = AnimationDocument::from_value(
            json!({"v": "5.0", "fr": 30, "w": 512, "h": 512, "assets": "none"}),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidField { name: "assets" });
    }

    #[test]
    fn validation_never_mutates() {
        let value = json!({"v": "5.9.6", "fr": 30, "w": 512, "h": 512, "extra": {"kept": true}});
        let doc = AnimationDocument::from_value(value.clone()).unwrap();
        assert_eq!(doc.as_value(), &value);
    }

    #[test]
    fn serialize_then_validate_returns_the_same_document() {
        let doc = AnimationDocument::from_value(json!({
            "v": "5.9.6", "fr": 30, "w": 512, "h": 512,
            "layers": [{"ty": 4, "nm": "bg", "shapes": [{"ty": "fl", "c": {"a": 0, "k": [1, 0, 0, 1]}}]}],
            "assets": []
        }))
        .unwrap();
        let bytes = doc.to_bytes().unwrap();
        assert_eq!(AnimationDocument::from_bytes(&bytes).unwrap(), doc);
    }

    #[test]
    fn out_point_falls_back_when_absent() {
        let doc =
            AnimationDocument::from_value(json!({"v": "5.0", "fr": 30, "w": 10, "h": 10})).unwrap();
        assert_eq!(doc.out_point(), DEFAULT_OUT_POINT);
    }
}
