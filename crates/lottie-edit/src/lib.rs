pub mod color;
pub mod error;
pub mod index;
pub mod normalize;
pub mod text;
pub mod visibility;

pub use color::ColorEditor;
pub use error::EditError;
pub use index::{find_properties, NodePath, PropertyHandle};
pub use normalize::{ensure_text_layer_defaults, normalize, normalize_value};
pub use text::{extract_text_spans, update_text, TextSpan};
pub use visibility::{is_hidden, materialize_for_persist, set_hidden};
