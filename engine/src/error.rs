use std::{fmt, io};

use shared::constants::{LOAD_FAILURE_ERROR, SEGMENT_MISMATCH_ERROR};
use shared::shared_wheel_game::WheelError;

/// Why a candidate load did not replace the pool
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Decode(serde_json::Error),
    Invalid(validator::ValidationErrors),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Decode(e) => write!(f, "Decode error: {}", e),
            Self::Invalid(e) => write!(f, "Invalid candidate: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Invalid(e) => Some(e),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

impl From<validator::ValidationErrors> for LoadError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Invalid(err)
    }
}

#[derive(Debug)]
pub enum Error {
    InvalidConfiguration(WheelError),
    LoadFailure(LoadError),
    IndexOutOfRange { index: usize, len: usize },
    NoSpinInFlight,
    Config { key: String, value: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(e) => write!(f, "{}", e),
            Self::LoadFailure(e) => write!(f, "{}: {}", LOAD_FAILURE_ERROR, e),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "{}: index {} with {} candidates", SEGMENT_MISMATCH_ERROR, index, len)
            }
            Self::NoSpinInFlight => write!(f, "No spin in flight"),
            Self::Config { key, value } => write!(f, "Invalid value for {}: {:?}", key, value),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfiguration(e) => Some(e),
            Self::LoadFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WheelError> for Error {
    fn from(err: WheelError) -> Self {
        Self::InvalidConfiguration(err)
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Self::LoadFailure(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
