use lottie_data::{AnimationDocument, LayerKind};
use serde_json::Value;

use crate::error::EditError;
use crate::index::NodePath;

/// One editable text value inside a text layer, referencing the node it was
/// extracted from by path so edits write through to the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub layer_path: NodePath,
    pub layer_name: String,
    /// Index into the text-document keyframe array, or `None` for the
    /// single-document shape.
    pub keyframe_index: Option<usize>,
    pub text: String,
}

impl TextSpan {
    pub fn is_keyframed(&self) -> bool {
        self.keyframe_index.is_some()
    }
}

/// Walks top-level layers and expands every text layer's document block into
/// one span per distinct text value, covering both the keyframed array shape
/// (`t.d.k[].s.t`) and the single-document shape (`t.d.k.s.t`).
pub fn extract_text_spans(doc: &AnimationDocument) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut text_layers = 0usize;
    for (index, layer) in doc.layers().iter().enumerate() {
        if LayerKind::of_layer(layer) != LayerKind::Text {
            continue;
        }
        let Some(k) = layer.pointer("/t/d/k") else {
            continue;
        };
        text_layers += 1;
        let layer_path = NodePath::root().child_key("layers").child_index(index);
        let layer_name = layer
            .get("nm")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Text Layer {text_layers}"));

        match k {
            Value::Array(keyframes) => {
                for (kf_index, keyframe) in keyframes.iter().enumerate() {
                    if let Some(text) = keyframe.pointer("/s/t").and_then(Value::as_str) {
                        spans.push(TextSpan {
                            layer_path: layer_path.clone(),
                            layer_name: layer_name.clone(),
                            keyframe_index: Some(kf_index),
                            text: text.to_string(),
                        });
                    }
                }
            }
            Value::Object(_) => {
                if let Some(text) = k.pointer("/s/t").and_then(Value::as_str) {
                    spans.push(TextSpan {
                        layer_path,
                        layer_name,
                        keyframe_index: None,
                        text: text.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    spans
}

/// Writes `new_text` through to the node a span was extracted from.
///
/// The span is re-resolved against the live tree; if the layer is gone, is
/// no longer a text layer, or its document block changed shape since
/// extraction, the edit fails with a stale reference and the document is
/// left untouched.
pub fn update_text(
    doc: &mut AnimationDocument,
    span: &TextSpan,
    new_text: &str,
) -> Result<(), EditError> {
    let stale = || EditError::StaleReference {
        path: span.layer_path.to_string(),
    };

    let layer = span
        .layer_path
        .resolve_mut(doc.as_value_mut())
        .ok_or_else(stale)?;
    if LayerKind::of_layer(layer) != LayerKind::Text {
        return Err(stale());
    }
    let k = layer.pointer_mut("/t/d/k").ok_or_else(stale)?;

    let slot = match span.keyframe_index {
        Some(index) => match k {
            Value::Array(keyframes) => keyframes
                .get_mut(index)
                .and_then(|kf| kf.pointer_mut("/s/t")),
            _ => None,
        },
        None if k.is_object() => k.pointer_mut("/s/t"),
        None => None,
    }
    .ok_or_else(stale)?;

    *slot = Value::String(new_text.to_string());
    Ok(())
}
