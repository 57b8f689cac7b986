use lottie_data::model::{classify_property, PropertyShape};
use lottie_data::{AnimationDocument, LayerKind};
use serde_json::{json, Map, Value};

use crate::index::MAX_TRAVERSAL_DEPTH;

/// Transform-block sub-keys that carry animatable properties.
const TRANSFORM_KEYS: [&str; 14] = [
    "o", "r", "p", "a", "s", "t", "sk", "sa", "sc", "sw", "rx", "ry", "rz", "or",
];

/// Shape-entry sub-keys that carry animatable properties.
const SHAPE_PROPERTY_KEYS: [&str; 4] = ["p", "s", "c", "o"];

/// Repairs animatable-property nodes that omit the `a` discriminator, which
/// downstream players require. Returns the number of repairs. Idempotent.
///
/// The one shape that must NOT be repaired is the text-document keyframe
/// list: it is structurally identical to an undiscriminated animated track,
/// and stamping `a` onto it corrupts text rendering. The shared
/// classification in `lottie_data::model` makes that call.
pub fn normalize(doc: &mut AnimationDocument) -> usize {
    normalize_value(doc.as_value_mut())
}

pub fn normalize_value(root: &mut Value) -> usize {
    let mut repairs = 0;
    walk(root, 0, &mut repairs);
    repairs
}

fn walk(node: &mut Value, depth: usize, repairs: &mut usize) {
    if depth >= MAX_TRAVERSAL_DEPTH {
        tracing::debug!("depth bound reached while normalizing, not descending");
        return;
    }
    match node {
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, repairs);
            }
        }
        Value::Object(map) => {
            backfill_discriminator(map, repairs);
            fix_transform_block(map, repairs);
            fix_shape_entries(map, repairs);
            for value in map.values_mut() {
                if value.is_object() || value.is_array() {
                    walk(value, depth + 1, repairs);
                }
            }
        }
        _ => {}
    }
}

fn backfill_discriminator(map: &mut Map<String, Value>, repairs: &mut usize) {
    if map.contains_key("a") {
        return;
    }
    match classify_property(map) {
        PropertyShape::Bare | PropertyShape::TextKeyframes(_) => {}
        PropertyShape::Static(_) | PropertyShape::KeyframeTrack(_) => {
            map.insert("a".to_string(), Value::from(0));
            *repairs += 1;
        }
    }
}

/// Transform sub-properties are never text documents, so they get the
/// discriminator unconditionally, and keyframe entries whose start value is
/// itself an undiscriminated property are repaired too.
fn fix_transform_block(map: &mut Map<String, Value>, repairs: &mut usize) {
    let Some(Value::Object(ks)) = map.get_mut("ks") else {
        return;
    };
    for key in TRANSFORM_KEYS {
        let Some(Value::Object(prop)) = ks.get_mut(key) else {
            continue;
        };
        if prop.contains_key("k") && !prop.contains_key("a") {
            prop.insert("a".to_string(), Value::from(0));
            *repairs += 1;
        }
        if let Some(Value::Array(keyframes)) = prop.get_mut("k") {
            for keyframe in keyframes {
                let Some(Value::Object(start)) = keyframe.get_mut("s") else {
                    continue;
                };
                if start.contains_key("k") && !start.contains_key("a") {
                    start.insert("a".to_string(), Value::from(0));
                    *repairs += 1;
                }
            }
        }
    }
}

fn fix_shape_entries(map: &mut Map<String, Value>, repairs: &mut usize) {
    let Some(Value::Array(shapes)) = map.get_mut("shapes") else {
        return;
    };
    for shape in shapes {
        let Some(obj) = shape.as_object_mut() else {
            continue;
        };
        for key in SHAPE_PROPERTY_KEYS {
            let Some(Value::Object(prop)) = obj.get_mut(key) else {
                continue;
            };
            if prop.contains_key("k") && !prop.contains_key("a") {
                prop.insert("a".to_string(), Value::from(0));
                *repairs += 1;
            }
        }
    }
}

/// Back-fills the text-layer blocks some producers omit but players expect:
/// path options (`t.p`), alignment/grouping (`t.m`) and the animator list
/// (`t.a`). Returns the number of layers touched. Idempotent.
pub fn ensure_text_layer_defaults(doc: &mut AnimationDocument) -> usize {
    let Some(layers) = doc.layers_mut() else {
        return 0;
    };
    let mut touched = 0;
    for layer in layers.iter_mut() {
        if LayerKind::of_layer(layer) != LayerKind::Text {
            continue;
        }
        let Some(Value::Object(text)) = layer.get_mut("t") else {
            continue;
        };
        let mut changed = false;
        if !text.contains_key("p") {
            text.insert("p".to_string(), json!({}));
            changed = true;
        }
        if !text.contains_key("m") {
            text.insert(
                "m".to_string(),
                json!({"g": 1, "a": {"a": 0, "k": [0, 0], "ix": 2}}),
            );
            changed = true;
        }
        if !text.contains_key("a") {
            text.insert("a".to_string(), json!([]));
            changed = true;
        }
        if changed {
            touched += 1;
        }
    }
    touched
}
