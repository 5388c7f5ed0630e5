//! Status codes reported by backends.

use std::fmt;

/// Non-success status returned by a [`Vem`](crate::Vem) call.
///
/// Codes are passed through verbatim; unknown ones are kept as [`ErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Error,
    OutOfMemory,
    TypeNotSupported,
    InstNotSupported,
    UserFuncNotSupported,
    Other(i32),
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::Error => 1,
            Self::OutOfMemory => 2,
            Self::TypeNotSupported => 3,
            Self::InstNotSupported => 4,
            Self::UserFuncNotSupported => 5,
            Self::Other(code) => *code,
        }
    }

    /// `None` for the success code 0.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::Error),
            2 => Some(Self::OutOfMemory),
            3 => Some(Self::TypeNotSupported),
            4 => Some(Self::InstNotSupported),
            5 => Some(Self::UserFuncNotSupported),
            other => Some(Self::Other(other)),
        }
    }

    /// Human-readable description used in error logs.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Error => "general error",
            Self::OutOfMemory => "out of memory",
            Self::TypeNotSupported => "data type not supported",
            Self::InstNotSupported => "instruction not supported",
            Self::UserFuncNotSupported => "user-defined function not supported",
            Self::Other(_) => "unknown backend error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.text(), self.code())
    }
}

impl std::error::Error for ErrorCode {}
