use thiserror::Error;

/// Failure of a single edit operation. These never corrupt the rest of the
/// document; the caller may re-extract and retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("`{path}` no longer refers to the node it was extracted from")]
    StaleReference { path: String },
    #[error("`{0}` is not a valid hex color")]
    InvalidColor(String),
}

impl EditError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::StaleReference { .. } => "STALE_REFERENCE",
            Self::InvalidColor(_) => "INVALID_COLOR",
        }
    }
}
