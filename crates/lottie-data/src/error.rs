use thiserror::Error;

/// Structural or field-level rejection of a would-be animation document.
///
/// Each variant maps to a stable code string so calling UIs can key
/// localized guidance off [`ValidationError::code`] instead of matching on
/// message wording.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the file is empty")]
    EmptyInput,
    #[error("invalid JSON format: {0}")]
    MalformedJson(String),
    #[error("a Lottie animation must be a JSON object")]
    NotAnObject,
    #[error("missing required Lottie properties: {}", names.join(", "))]
    MissingFields { names: Vec<String> },
    #[error("invalid value for required property `{name}`")]
    InvalidField { name: &'static str },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::MalformedJson(_) => "MALFORMED_JSON",
            Self::NotAnObject => "NOT_AN_OBJECT",
            Self::MissingFields { .. } => "MISSING_FIELDS",
            Self::InvalidField { .. } => "INVALID_FIELD",
        }
    }
}

/// Container-level failure: the bytes were flagged as a compressed `.lottie`
/// stream but could not be gzip-decoded (or re-encoded on persist).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to process the .lottie container: {0}")]
    Gzip(#[from] std::io::Error),
}

impl DecodeError {
    pub fn code(&self) -> &'static str {
        "DECODE_ERROR"
    }
}
