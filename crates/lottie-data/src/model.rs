use serde_json::{Map, Value};

/// Layer variants as encoded by the `ty` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Precomp,
    Solid,
    Image,
    Null,
    Shape,
    Text,
    Audio,
    Camera,
    Unknown(u8),
}

impl LayerKind {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Self::Precomp,
            1 => Self::Solid,
            2 => Self::Image,
            3 => Self::Null,
            4 => Self::Shape,
            5 => Self::Text,
            6 => Self::Audio,
            13 => Self::Camera,
            other => Self::Unknown(other),
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::Precomp => 0,
            Self::Solid => 1,
            Self::Image => 2,
            Self::Null => 3,
            Self::Shape => 4,
            Self::Text => 5,
            Self::Audio => 6,
            Self::Camera => 13,
            Self::Unknown(tag) => tag,
        }
    }

    /// Display label used wherever a layer list is shown to a person.
    pub fn label(self) -> &'static str {
        match self {
            Self::Precomp => "Precomp",
            Self::Solid => "Solid",
            Self::Image => "Image",
            Self::Null => "Null",
            Self::Shape => "Shape",
            Self::Text => "Text",
            Self::Audio => "Audio",
            Self::Camera => "Camera",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Reads the tag off a raw layer node. Layers missing `ty` read as tag 0.
    pub fn of_layer(layer: &Value) -> Self {
        let tag = layer
            .get("ty")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .min(u8::MAX as u64) as u8;
        Self::from_tag(tag)
    }
}

/// What a node's `k` payload actually is.
///
/// The same array shape can mean two different things: an animated keyframe
/// track, or a text-document keyframe list that must never receive the
/// `a` discriminator. This classification is the single place that tells
/// them apart; every mutator goes through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyShape<'a> {
    /// No `k` key at all.
    Bare,
    /// A static value: scalar, numeric array, or a non-keyframe object.
    Static(&'a Value),
    /// An array of keyframe-shaped objects without the text signature.
    KeyframeTrack(&'a [Value]),
    /// The text-document pattern: entries carrying `s` (style) or `t` (time).
    TextKeyframes(&'a [Value]),
}

/// Classifies the `k` payload of an animatable-property node.
pub fn classify_property(node: &Map<String, Value>) -> PropertyShape<'_> {
    let Some(k) = node.get("k") else {
        return PropertyShape::Bare;
    };
    match k {
        Value::Array(entries) => {
            if is_text_keyframe_list(entries) {
                PropertyShape::TextKeyframes(entries)
            } else if entries.first().is_some_and(Value::is_object) {
                PropertyShape::KeyframeTrack(entries)
            } else {
                PropertyShape::Static(k)
            }
        }
        other => PropertyShape::Static(other),
    }
}

/// Shape test for the text-document keyframe pattern: a non-empty array
/// whose first entry is an object with an `s` or `t` key. Structurally this
/// is indistinguishable from an undiscriminated animated track, which is
/// exactly why the test is centralized here.
pub fn is_text_keyframe_list(entries: &[Value]) -> bool {
    entries
        .first()
        .and_then(Value::as_object)
        .is_some_and(|first| first.contains_key("s") || first.contains_key("t"))
}
