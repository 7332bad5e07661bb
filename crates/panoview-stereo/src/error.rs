use std::fmt;

/// A field of view that cannot produce a usable projection.
#[derive(Debug, Clone, PartialEq)]
pub struct FovError {
    pub message: String,
}

impl FovError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into() }
    }
}

impl fmt::Display for FovError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid field of view: {}", self.message)
    }
}

impl std::error::Error for FovError {}
