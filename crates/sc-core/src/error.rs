use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    InvalidZone,
    MalformedZoneRecord,
    DuplicateId,
    NotFound,
    Upstream,
    Unavailable,
    Internal,
}

#[derive(Debug, Clone)]
pub struct ScError {
    pub code: ErrorCode,
    pub message: String,
}

impl ScError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

impl fmt::Display for ScError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ScError {}

pub type ScResult<T> = Result<T, ScError>;
