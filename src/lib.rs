pub mod debounce;
pub mod session;

use thiserror::Error;

pub use debounce::DebouncePolicy;
pub use lottie_data::{
    compress, decompress, detect_format, AnimationDocument, ContainerFormat, DecodeError,
    ValidationError,
};
pub use lottie_edit::EditError;
pub use lottie_interact::{
    compile, normalize_rules, Binding, InteractionRule, PlayerControl, RenderSurface,
};
pub use session::{AnimationMetadata, EditingSession, PersistedAnimation};

/// Top-level error for the decode/edit/persist pipeline, delegating the
/// stable code strings of the underlying failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("failed to serialize animation: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::Decode(err) => err.code(),
            Self::Edit(err) => err.code(),
            Self::Serialize(_) => "SERIALIZE_ERROR",
        }
    }
}

/// A decoded upload: the validated document plus the container it arrived
/// in, so persisting can round-trip the format.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAnimation {
    pub document: AnimationDocument,
    pub format: ContainerFormat,
}

/// Decodes raw bytes into a validated document: container detection,
/// decompression when the stream is a `.lottie`, then structural validation.
/// Failures surface verbatim; there is no best-effort parse.
pub fn decode(bytes: &[u8], filename: Option<&str>) -> Result<DecodedAnimation, EngineError> {
    let format = detect_format(bytes, filename);
    let document = match format {
        ContainerFormat::Compressed => {
            let plain = decompress(bytes)?;
            AnimationDocument::from_bytes(&plain)?
        }
        ContainerFormat::Plain => AnimationDocument::from_bytes(bytes)?,
    };
    tracing::debug!(
        version = document.version().as_deref().unwrap_or("?"),
        layers = document.layers().len(),
        ?format,
        "decoded animation document"
    );
    Ok(DecodedAnimation { document, format })
}

/// Host-supplied capability that turns a document into a live playback
/// instance. The engine never manages player libraries itself; whether the
/// playback runtime is already loaded, lazily fetched or mocked is entirely
/// the host's concern.
pub trait PlayerFactory {
    fn instantiate(&self, document: &AnimationDocument) -> Box<dyn PlayerControl>;
}
