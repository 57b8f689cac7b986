use lottie_data::AnimationDocument;
use serde_json::Value;

/// Session-only flag marking a layer as hidden in the editor.
pub const HIDDEN_KEY: &str = "_hidden";

/// Session-only backup of a layer's end-frame, captured before hiding so the
/// exact value survives hide/show cycles.
pub const ORIGINAL_OUT_POINT_KEY: &str = "_originalOp";

/// Whether a layer currently reads as hidden: the explicit session flag
/// wins, otherwise a collapsed (`op <= ip`) layer is the persisted encoding
/// of invisible.
pub fn is_hidden(layer: &Value, document_out_point: f64) -> bool {
    if let Some(flag) = layer.get(HIDDEN_KEY).and_then(Value::as_bool) {
        return flag;
    }
    let ip = layer.get("ip").and_then(Value::as_f64).unwrap_or(0.0);
    let op = layer
        .get("op")
        .and_then(Value::as_f64)
        .unwrap_or(document_out_point);
    op <= ip
}

/// Toggles the session-only hidden flag on a layer.
///
/// The first hide captures the layer's end-frame (falling back to the
/// document's) so un-hiding can restore it exactly; the backup is captured
/// once and kept across repeated toggles.
pub fn set_hidden(layer: &mut Value, document_out_point: f64, hidden: bool) {
    let Some(obj) = layer.as_object_mut() else {
        return;
    };
    if hidden {
        if !obj.contains_key(ORIGINAL_OUT_POINT_KEY) {
            let op = obj
                .get("op")
                .and_then(Value::as_f64)
                .unwrap_or(document_out_point);
            obj.insert(ORIGINAL_OUT_POINT_KEY.to_string(), Value::from(op));
        }
        obj.insert(HIDDEN_KEY.to_string(), Value::Bool(true));
    } else {
        obj.insert(HIDDEN_KEY.to_string(), Value::Bool(false));
        if let Some(original) = obj.get(ORIGINAL_OUT_POINT_KEY).cloned() {
            obj.insert("op".to_string(), original);
        }
    }
}

/// Produces the deep copy that gets serialized: hidden layers collapse to
/// zero duration (`op = ip`, the portable invisible encoding) and every
/// session-only key is stripped. The live editing document is never the one
/// persisted. Idempotent.
pub fn materialize_for_persist(doc: &AnimationDocument) -> AnimationDocument {
    let mut copy = doc.as_value().clone();

    if let Some(layers) = copy.get_mut("layers").and_then(Value::as_array_mut) {
        for layer in layers.iter_mut() {
            let Some(obj) = layer.as_object_mut() else {
                continue;
            };
            let hidden = obj.get(HIDDEN_KEY).and_then(Value::as_bool) == Some(true);
            if hidden {
                let ip = obj.get("ip").cloned().unwrap_or_else(|| Value::from(0.0));
                obj.insert("op".to_string(), ip);
            }
        }
    }

    strip_session_keys(&mut copy);
    AnimationDocument::from_value_unchecked(copy)
}

fn strip_session_keys(node: &mut Value) {
    match node {
        Value::Object(map) => {
            map.remove(HIDDEN_KEY);
            map.remove(ORIGINAL_OUT_POINT_KEY);
            for value in map.values_mut() {
                strip_session_keys(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_session_keys(item);
            }
        }
        _ => {}
    }
}
