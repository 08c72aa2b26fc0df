use std::fmt;

use crate::lookup::LookupError;
use crate::model::item::{DecodeError, SnapshotError};

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SnapshotParseFailed,
    SnapshotReadFailed,
    MissingItemPayload,
    DirectoryReadFailed,
    DirectoryParseFailed,
    LookupServiceFailed,
    LookupCancelled,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::SnapshotParseFailed => "E1002",
            Self::SnapshotReadFailed => "E1003",
            Self::MissingItemPayload => "E2002",
            Self::DirectoryReadFailed => "E3001",
            Self::DirectoryParseFailed => "E3002",
            Self::LookupServiceFailed => "E3003",
            Self::LookupCancelled => "E3004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotParseFailed => "Home screen snapshot could not be parsed",
            Self::SnapshotReadFailed => "Home screen snapshot could not be read",
            Self::MissingItemPayload => "Home screen item payload missing",
            Self::DirectoryReadFailed => "Directory file read failed",
            Self::DirectoryParseFailed => "Directory file parse error",
            Self::LookupServiceFailed => "Directory lookup failed",
            Self::LookupCancelled => "Lookup cancelled",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .homescreen/config.toml and retry."),
            Self::SnapshotParseFailed => Some("Check that the snapshot is the JSON home screen form."),
            Self::SnapshotReadFailed => Some("Check the snapshot path exists and is readable."),
            Self::MissingItemPayload => Some("Refetch the home screen; the snapshot is malformed."),
            Self::DirectoryReadFailed => Some("Check the configured directory paths exist."),
            Self::DirectoryParseFailed => {
                Some("Directory files must hold a JSON array of records.")
            }
            Self::LookupServiceFailed => Some("Retry once the directory service is reachable."),
            Self::LookupCancelled => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl DecodeError {
    /// Machine-readable code associated with this decode error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingPayload(_) => ErrorCode::MissingItemPayload,
        }
    }
}

impl SnapshotError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::SnapshotReadFailed,
            Self::Parse { .. } => ErrorCode::SnapshotParseFailed,
        }
    }
}

/// Errors that abort an enrichment pass.
///
/// Both variants are transparent: the caller sees exactly the error the
/// decoder or collaborator produced.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl EnrichError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Decode(err) => err.code(),
            Self::Lookup(err) => err.code(),
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
