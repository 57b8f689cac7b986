use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lottie_data::{compress, AnimationDocument, ContainerFormat};
use lottie_edit::color::ColorEditor;
use lottie_edit::normalize::{ensure_text_layer_defaults, normalize};
use lottie_edit::text::{extract_text_spans, update_text, TextSpan};
use lottie_edit::visibility::{is_hidden, materialize_for_persist, set_hidden};
use lottie_edit::EditError;
use lottie_interact::PlayerControl;

use crate::{decode, EngineError, PlayerFactory};

/// Playback speed bounds; values outside are clamped on set.
pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 5.0;

/// Undo history cap. The oldest snapshot falls off first.
pub const HISTORY_LIMIT: usize = 50;

fn default_speed() -> f64 {
    1.0
}

/// Sidecar fields that travel alongside the document as one logical record,
/// never inside the Lottie JSON itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

impl Default for AnimationMetadata {
    fn default() -> Self {
        Self {
            background_color: None,
            speed: default_speed(),
        }
    }
}

impl AnimationMetadata {
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            default_speed()
        };
    }
}

/// Output of [`EditingSession::persist`]: bytes in the original container
/// format plus the filename with its extension corrected to match.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedAnimation {
    pub bytes: Vec<u8>,
    pub format: ContainerFormat,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    document: Value,
    metadata: AnimationMetadata,
}

/// One editing session over a decoded document.
///
/// Owns the live tree and all editor state; mutations go through the methods
/// here so dirty tracking and history stay consistent. All operations are
/// synchronous and the session is single-owner; embedding hosts provide
/// external mutual exclusion per document instance.
#[derive(Debug)]
pub struct EditingSession {
    document: AnimationDocument,
    format: ContainerFormat,
    file_name: Option<String>,
    metadata: AnimationMetadata,
    colors: ColorEditor,
    history: Vec<Snapshot>,
    cursor: usize,
    dirty: bool,
}

impl EditingSession {
    /// Decodes raw bytes and opens a session with default metadata.
    pub fn open(bytes: &[u8], file_name: Option<&str>) -> Result<Self, EngineError> {
        Self::open_with_metadata(bytes, file_name, AnimationMetadata::default())
    }

    /// Decodes raw bytes and opens a session with stored sidecar metadata.
    pub fn open_with_metadata(
        bytes: &[u8],
        file_name: Option<&str>,
        metadata: AnimationMetadata,
    ) -> Result<Self, EngineError> {
        let decoded = decode(bytes, file_name)?;
        let mut session = Self {
            document: decoded.document,
            format: decoded.format,
            file_name: file_name.map(str::to_string),
            metadata,
            colors: ColorEditor::new(),
            history: Vec::new(),
            cursor: 0,
            dirty: false,
        };
        session.history.push(session.snapshot());
        Ok(session)
    }

    pub fn document(&self) -> &AnimationDocument {
        &self.document
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn metadata(&self) -> &AnimationMetadata {
        &self.metadata
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.metadata.set_speed(speed);
        self.touch();
    }

    pub fn set_background_color(&mut self, color: Option<String>) {
        self.metadata.background_color = color;
        self.touch();
    }

    /// Distinct colors currently in the document, as lowercase hex.
    pub fn colors(&mut self) -> BTreeSet<String> {
        self.colors.extract_colors(&self.document).clone()
    }

    /// Rewrites every occurrence of `old_hex` to `new_hex`; returns how many
    /// properties changed.
    pub fn replace_color(&mut self, old_hex: &str, new_hex: &str) -> Result<usize, EngineError> {
        let rewritten = self
            .colors
            .replace_color(&mut self.document, old_hex, new_hex)?;
        if rewritten > 0 {
            self.touch();
        }
        Ok(rewritten)
    }

    pub fn text_spans(&self) -> Vec<TextSpan> {
        extract_text_spans(&self.document)
    }

    pub fn update_text(&mut self, span: &TextSpan, new_text: &str) -> Result<(), EngineError> {
        update_text(&mut self.document, span, new_text)?;
        self.touch();
        Ok(())
    }

    pub fn layer_hidden(&self, index: usize) -> bool {
        let out_point = self.document.out_point();
        self.document
            .layers()
            .get(index)
            .is_some_and(|layer| is_hidden(layer, out_point))
    }

    pub fn set_layer_hidden(&mut self, index: usize, hidden: bool) -> Result<(), EngineError> {
        let out_point = self.document.out_point();
        let layer = self
            .document
            .layers_mut()
            .and_then(|layers| layers.get_mut(index))
            .ok_or_else(|| EditError::StaleReference {
                path: format!("layers[{index}]"),
            })?;
        set_hidden(layer, out_point, hidden);
        self.touch();
        Ok(())
    }

    /// The repaired copy a player should load: hidden layers collapsed,
    /// session keys stripped, discriminators and text-layer defaults
    /// back-filled. The live document is left untouched.
    pub fn prepare_for_playback(&self) -> AnimationDocument {
        let mut prepared = materialize_for_persist(&self.document);
        normalize(&mut prepared);
        ensure_text_layer_defaults(&mut prepared);
        prepared
    }

    /// Builds a live playback instance from the repaired playback copy. The
    /// factory comes from the host; a player is always handed the prepared
    /// document, never the live editing tree.
    pub fn create_player(&self, factory: &dyn PlayerFactory) -> Box<dyn PlayerControl> {
        let prepared = self.prepare_for_playback();
        factory.instantiate(&prepared)
    }

    /// Serializes the session in its original container format, re-compressing
    /// when the source was a `.lottie`, and corrects the filename extension.
    pub fn persist(&self) -> Result<PersistedAnimation, EngineError> {
        let prepared = self.prepare_for_playback();
        let json = prepared.to_bytes()?;
        let bytes = match self.format {
            ContainerFormat::Compressed => compress(&json)?,
            ContainerFormat::Plain => json,
        };
        let file_name = self
            .file_name
            .as_deref()
            .map(|name| with_extension(name, self.format.extension()));
        Ok(PersistedAnimation {
            bytes,
            format: self.format,
            file_name,
        })
    }

    /// Marks the session dirty and records an undo snapshot. Edits made
    /// after an undo truncate the redo tail, then the cap evicts the oldest
    /// snapshot.
    fn touch(&mut self) {
        self.dirty = true;
        self.history.truncate(self.cursor + 1);
        self.history.push(self.snapshot());
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.cursor = self.history.len() - 1;
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.as_value().clone(),
            metadata: self.metadata.clone(),
        }
    }

    fn restore(&mut self, index: usize) {
        let snapshot = self.history[index].clone();
        self.document = AnimationDocument::from_value_unchecked(snapshot.document);
        self.metadata = snapshot.metadata;
        self.colors.reset();
        self.cursor = index;
        self.dirty = true;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.restore(self.cursor - 1);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.restore(self.cursor + 1);
        true
    }
}

fn with_extension(name: &str, extension: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.{extension}"),
        _ => format!("{name}.{extension}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_clamps_to_supported_range() {
        let mut metadata = AnimationMetadata::default();
        metadata.set_speed(0.01);
        assert_eq!(metadata.speed, MIN_SPEED);
        metadata.set_speed(9.0);
        assert_eq!(metadata.speed, MAX_SPEED);
        metadata.set_speed(2.5);
        assert_eq!(metadata.speed, 2.5);
        metadata.set_speed(f64::NAN);
        assert_eq!(metadata.speed, 1.0);
    }

    #[test]
    fn metadata_serializes_camel_case_sidecar() {
        let metadata = AnimationMetadata {
            background_color: Some("#102030".to_string()),
            speed: 1.5,
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"backgroundColor": "#102030", "speed": 1.5})
        );
        let parsed: AnimationMetadata = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(parsed, AnimationMetadata::default());
    }

    #[test]
    fn extension_swap_replaces_or_appends() {
        assert_eq!(with_extension("anim.json", "lottie"), "anim.lottie");
        assert_eq!(with_extension("anim.v2.lottie", "json"), "anim.v2.json");
        assert_eq!(with_extension("anim", "json"), "anim.json");
        assert_eq!(with_extension(".hidden", "json"), ".hidden.json");
    }
}
