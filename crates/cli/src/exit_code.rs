//! Process exit codes
//!
//! Scripts can rely on these values staying stable.

use bunny_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Bad flags, missing settings, invalid paths
    UsageError = 2,
    /// Connection failures, timeouts, server kept failing
    NetworkError = 3,
    NotFound = 5,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a library error onto an exit code
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::InvalidPath(_) => Self::UsageError,
            Error::Network(_) | Error::ServerBusy(_) | Error::Drain(_) | Error::Request(_) => {
                Self::NetworkError
            }
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => Self::NotFound,
            Error::Cancelled | Error::Decode(_) | Error::Io(_) => Self::GeneralError,
        }
    }

    /// Map an HTTP status that is not a success onto an exit code
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            _ => Self::GeneralError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}
