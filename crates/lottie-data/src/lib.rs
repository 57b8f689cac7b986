pub mod codec;
pub mod document;
pub mod error;
pub mod model;

pub use codec::{compress, decompress, detect_format, ContainerFormat};
pub use document::AnimationDocument;
pub use error::{DecodeError, ValidationError};
pub use model::{classify_property, LayerKind, PropertyShape};
