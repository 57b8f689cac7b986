use std::collections::{BTreeSet, HashMap};

use lottie_data::AnimationDocument;
use serde_json::Value;

use crate::error::EditError;
use crate::index::{find_properties, PropertyHandle};

/// Keys that carry color payloads: fill/generic color, stroke, font color.
/// The `s` entry also matches scale-like values; the channel-shape check on
/// the value is what keeps false positives out, same as the editor this
/// behavior was lifted from. Adjust the table, not the call sites.
pub const COLOR_KEYS: [&str; 3] = ["c", "s", "fc"];

/// Per-channel tolerance when matching colors that round-tripped through
/// 8-bit hex quantization.
pub const CHANNEL_TOLERANCE: f64 = 0.01;

/// Predicate for the shared property walk: a color key whose value is a
/// 3-4 channel numeric array, directly or under a `k` sub-key.
pub fn is_color_property(key: &str, value: &Value) -> bool {
    if !COLOR_KEYS.contains(&key) {
        return false;
    }
    channel_slots(value).is_some()
}

fn is_channel_array(items: &[Value]) -> bool {
    (3..=4).contains(&items.len()) && items.iter().all(Value::is_number)
}

fn channel_slots(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) if is_channel_array(items) => Some(items),
        Value::Object(map) => match map.get("k") {
            Some(Value::Array(items)) if is_channel_array(items) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn channel_slots_mut(value: &mut Value) -> Option<&mut Vec<Value>> {
    match value {
        Value::Array(items) if is_channel_array(items) => Some(items),
        Value::Object(map) => match map.get_mut("k") {
            Some(Value::Array(items)) if is_channel_array(items) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn channel_triple(items: &[Value]) -> Option<[f64; 3]> {
    Some([
        items.first()?.as_f64()?,
        items.get(1)?.as_f64()?,
        items.get(2)?.as_f64()?,
    ])
}

/// Parses `#rrggbb` (leading `#` optional) into 0-1 channels.
pub fn hex_to_channels(hex: &str) -> Option<[f64; 3]> {
    let raw = hex.strip_prefix('#').unwrap_or(hex);
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&raw[range], 16)
            .ok()
            .map(|v| v as f64 / 255.0)
    };
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Quantizes 0-1 channels to lowercase `#rrggbb`.
pub fn channels_to_hex(channels: [f64; 3]) -> String {
    let quantize = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        quantize(channels[0]),
        quantize(channels[1]),
        quantize(channels[2])
    )
}

pub fn channels_match(a: [f64; 3], b: [f64; 3], tolerance: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < tolerance)
}

/// Euclidean distance between two hex colors in RGB space.
pub fn color_distance(a: &str, b: &str) -> Option<f64> {
    let a = hex_to_channels(a)?;
    let b = hex_to_channels(b)?;
    Some(
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt(),
    )
}

/// Cheap change-detection stamp: serialized length plus top-level key count.
/// A collision only forces an unnecessary cache rebuild; cached locations
/// are re-validated against the live tree before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    byte_len: usize,
    key_count: usize,
}

pub fn fingerprint(doc: &AnimationDocument) -> Fingerprint {
    Fingerprint {
        byte_len: doc.to_bytes().map(|b| b.len()).unwrap_or(0),
        key_count: doc.as_value().as_object().map_or(0, |map| map.len()),
    }
}

/// Extracts the distinct color set of a document and rewrites colors in
/// place, caching hex-to-location mappings between calls to avoid
/// re-traversal.
#[derive(Debug, Default)]
pub struct ColorEditor {
    colors: BTreeSet<String>,
    locations: HashMap<String, Vec<PropertyHandle>>,
    fingerprint: Option<Fingerprint>,
}

impl ColorEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct colors currently present, as lowercase hex. Rebuilds the
    /// location cache when the document fingerprint has moved.
    pub fn extract_colors(&mut self, doc: &AnimationDocument) -> &BTreeSet<String> {
        let stamp = fingerprint(doc);
        if self.fingerprint != Some(stamp) || self.colors.is_empty() {
            self.rebuild(doc, stamp);
        }
        &self.colors
    }

    fn rebuild(&mut self, doc: &AnimationDocument, stamp: Fingerprint) {
        self.colors.clear();
        self.locations.clear();
        for handle in find_properties(doc.as_value(), is_color_property) {
            let channels = handle
                .resolve(doc.as_value())
                .and_then(channel_slots)
                .and_then(channel_triple);
            let Some(channels) = channels else { continue };
            let hex = channels_to_hex(channels);
            self.colors.insert(hex.clone());
            self.locations.entry(hex).or_default().push(handle);
        }
        self.fingerprint = Some(stamp);
    }

    pub fn reset(&mut self) {
        self.colors.clear();
        self.locations.clear();
        self.fingerprint = None;
    }

    /// Rewrites every occurrence of `old_hex` to `new_hex`, preserving any
    /// alpha channel. Uses cached locations when the fingerprint still
    /// matches and every location re-validates against the live tree;
    /// otherwise falls back to a full tolerance walk. Returns the number of
    /// rewritten properties.
    pub fn replace_color(
        &mut self,
        doc: &mut AnimationDocument,
        old_hex: &str,
        new_hex: &str,
    ) -> Result<usize, EditError> {
        let old_channels =
            hex_to_channels(old_hex).ok_or_else(|| EditError::InvalidColor(old_hex.to_string()))?;
        let new_channels =
            hex_to_channels(new_hex).ok_or_else(|| EditError::InvalidColor(new_hex.to_string()))?;
        let old_key = channels_to_hex(old_channels);
        let new_key = channels_to_hex(new_channels);
        if old_key == new_key {
            return Ok(0);
        }

        let fresh = self.fingerprint == Some(fingerprint(doc));
        if fresh && self.locations.contains_key(&old_key) {
            let handles = self.locations.remove(&old_key).unwrap_or_default();
            let all_valid = handles.iter().all(|handle| {
                handle
                    .resolve(doc.as_value())
                    .and_then(channel_slots)
                    .and_then(channel_triple)
                    .is_some_and(|c| channels_match(c, old_channels, CHANNEL_TOLERANCE))
            });
            if all_valid {
                let mut rewritten = 0;
                for handle in &handles {
                    if let Some(items) =
                        handle.resolve_mut(doc.as_value_mut()).and_then(channel_slots_mut)
                    {
                        write_channels(items, new_channels);
                        rewritten += 1;
                    }
                }
                self.colors.remove(&old_key);
                self.colors.insert(new_key.clone());
                self.locations.entry(new_key).or_default().extend(handles);
                self.fingerprint = Some(fingerprint(doc));
                return Ok(rewritten);
            }
            tracing::debug!(color = %old_key, "cached color locations went stale, re-walking");
        }

        let rewritten = replace_by_walk(doc, old_channels, new_channels);
        self.reset();
        Ok(rewritten)
    }
}

fn write_channels(items: &mut [Value], channels: [f64; 3]) {
    for (slot, value) in items.iter_mut().zip(channels.iter()) {
        *slot = Value::from(*value);
    }
}

fn replace_by_walk(doc: &mut AnimationDocument, old: [f64; 3], new: [f64; 3]) -> usize {
    let handles = find_properties(doc.as_value(), is_color_property);
    let mut rewritten = 0;
    for handle in handles {
        let matches = handle
            .resolve(doc.as_value())
            .and_then(channel_slots)
            .and_then(channel_triple)
            .is_some_and(|c| channels_match(c, old, CHANNEL_TOLERANCE));
        if matches {
            if let Some(items) = handle.resolve_mut(doc.as_value_mut()).and_then(channel_slots_mut)
            {
                write_channels(items, new);
                rewritten += 1;
            }
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> AnimationDocument {
        AnimationDocument::from_value(value).unwrap()
    }

    fn shape_doc() -> AnimationDocument {
        doc(json!({
            "v": "5.9.6", "fr": 30, "w": 512, "h": 512,
            "layers": [{
                "ty": 4, "ip": 0, "op": 60,
                "shapes": [
                    {"ty": "fl", "c": {"a": 0, "k": [1.0, 0.0, 0.0, 1.0]}, "o": {"a": 0, "k": 100}},
                    {"ty": "st", "c": {"a": 0, "k": [0.0, 0.0, 1.0, 0.5]}}
                ]
            }]
        }))
    }

    #[test]
    fn hex_conversion_inverts_up_to_quantization() {
        for hex in ["#ff0000", "#00ff00", "#1a2b3c", "#ffffff", "#000000"] {
            let channels = hex_to_channels(hex).unwrap();
            assert_eq!(channels_to_hex(channels), hex);
        }
        assert!(hex_to_channels("#12345").is_none());
        assert!(hex_to_channels("#zzzzzz").is_none());
        assert_eq!(hex_to_channels("ff0000"), hex_to_channels("#ff0000"));
    }

    #[test]
    fn extracts_distinct_colors() {
        let mut editor = ColorEditor::new();
        let document = shape_doc();
        let colors: Vec<String> = editor.extract_colors(&document).iter().cloned().collect();
        assert_eq!(colors, vec!["#0000ff", "#ff0000"]);
    }

    #[test]
    fn extracts_direct_channel_arrays() {
        let mut editor = ColorEditor::new();
        let document = doc(json!({
            "v": "5.0", "fr": 30, "w": 10, "h": 10,
            "layers": [{"ty": 5, "t": {"d": {"k": {"s": {"t": "hi", "fc": [0.0, 1.0, 0.0]}}}}}]
        }));
        assert!(editor.extract_colors(&document).contains("#00ff00"));
    }

    #[test]
    fn replace_color_uses_cache_and_preserves_alpha() {
        let mut editor = ColorEditor::new();
        let mut document = shape_doc();
        editor.extract_colors(&document);

        let rewritten = editor
            .replace_color(&mut document, "#ff0000", "#00ff00")
            .unwrap();
        assert_eq!(rewritten, 1);
        assert_eq!(
            document.as_value().pointer("/layers/0/shapes/0/c/k").unwrap(),
            &json!([0.0, 1.0, 0.0, 1.0])
        );

        let colors = editor.extract_colors(&document);
        assert!(!colors.contains("#ff0000"));
        assert!(colors.contains("#00ff00"));
    }

    #[test]
    fn replace_color_falls_back_to_tolerance_walk() {
        let mut editor = ColorEditor::new();
        let mut document = doc(json!({
            "v": "5.0", "fr": 30, "w": 10, "h": 10,
            "layers": [{"ty": 4, "shapes": [
                {"ty": "fl", "c": {"a": 0, "k": [0.998, 0.002, 0.0, 1.0]}}
            ]}]
        }));
        // No prior extraction: the cache is empty and the walk must match
        // within the channel tolerance.
        let rewritten = editor
            .replace_color(&mut document, "#ff0000", "#0000ff")
            .unwrap();
        assert_eq!(rewritten, 1);
        assert_eq!(
            document.as_value().pointer("/layers/0/shapes/0/c/k").unwrap(),
            &json!([0.0, 0.0, 1.0, 1.0])
        );
    }

    #[test]
    fn replace_color_merges_into_existing_color() {
        let mut editor = ColorEditor::new();
        let mut document = shape_doc();
        editor.extract_colors(&document);
        editor
            .replace_color(&mut document, "#ff0000", "#0000ff")
            .unwrap();
        let colors: Vec<String> = editor.extract_colors(&document).iter().cloned().collect();
        assert_eq!(colors, vec!["#0000ff"]);
    }

    #[test]
    fn invalid_hex_is_a_typed_error() {
        let mut editor = ColorEditor::new();
        let mut document = shape_doc();
        let err = editor
            .replace_color(&mut document, "#nothex", "#00ff00")
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_COLOR");
    }

    #[test]
    fn identical_colors_are_a_no_op() {
        let mut editor = ColorEditor::new();
        let mut document = shape_doc();
        assert_eq!(
            editor
                .replace_color(&mut document, "#ff0000", "#ff0000")
                .unwrap(),
            0
        );
    }

    #[test]
    fn color_distance_orders_by_closeness() {
        let near = color_distance("#ff0000", "#fe0100").unwrap();
        let far = color_distance("#ff0000", "#00ff00").unwrap();
        assert!(near < far);
    }
}
