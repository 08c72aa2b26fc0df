//! Lookup collaborators consulted during enrichment.
//!
//! The enricher never talks to a directory service directly. It goes through
//! [`PhoneNumberLookup`] and [`EmailLookup`], so the real services, a file on
//! disk, or a test double can stand behind the same pass.
//!
//! Implementations must return records in the order the directory reports
//! them; selection is first-match.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ErrorCode;
use crate::model::record::{EmailRecord, PhoneNumberRecord};

// ---------------------------------------------------------------------------
// Execution context
// ---------------------------------------------------------------------------

/// Ambient state threaded through a pass into every lookup.
///
/// The enricher only passes it along. Collaborators use it to scope their
/// query to an account and to observe cancellation.
#[derive(Debug, Default)]
pub struct Context {
    account: Option<String>,
    cancelled: AtomicBool,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_account(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            cancelled: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Request cancellation. Lookups started after this fail with
    /// [`LookupError::Cancelled`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// # Errors
    ///
    /// Returns [`LookupError::Cancelled`] once [`Context::cancel`] was called.
    pub fn check_cancelled(&self) -> Result<(), LookupError> {
        if self.is_cancelled() {
            Err(LookupError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures reported by a lookup collaborator.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("failed to read directory file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse directory file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} lookup failed: {reason}")]
    Service {
        service: &'static str,
        reason: String,
    },

    #[error("lookup cancelled")]
    Cancelled,
}

impl LookupError {
    #[must_use]
    pub fn service(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Service {
            service,
            reason: reason.into(),
        }
    }

    /// Machine-readable code associated with this lookup error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::DirectoryReadFailed,
            Self::Parse { .. } => ErrorCode::DirectoryParseFailed,
            Self::Service { .. } => ErrorCode::LookupServiceFailed,
            Self::Cancelled => ErrorCode::LookupCancelled,
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Source of the account's phone numbers.
pub trait PhoneNumberLookup {
    /// # Errors
    ///
    /// Returns [`LookupError`] when the directory cannot be consulted.
    fn phone_numbers(&self, ctx: &Context) -> Result<Vec<PhoneNumberRecord>, LookupError>;
}

/// Source of the account's email addresses.
pub trait EmailLookup {
    /// # Errors
    ///
    /// Returns [`LookupError`] when the directory cannot be consulted.
    fn user_emails(&self, ctx: &Context) -> Result<Vec<EmailRecord>, LookupError>;
}

impl<T: PhoneNumberLookup + ?Sized> PhoneNumberLookup for &T {
    fn phone_numbers(&self, ctx: &Context) -> Result<Vec<PhoneNumberRecord>, LookupError> {
        (**self).phone_numbers(ctx)
    }
}

impl<T: EmailLookup + ?Sized> EmailLookup for &T {
    fn user_emails(&self, ctx: &Context) -> Result<Vec<EmailRecord>, LookupError> {
        (**self).user_emails(ctx)
    }
}

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

/// Fixed list of phone numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPhoneNumbers(pub Vec<PhoneNumberRecord>);

impl PhoneNumberLookup for StaticPhoneNumbers {
    fn phone_numbers(&self, ctx: &Context) -> Result<Vec<PhoneNumberRecord>, LookupError> {
        ctx.check_cancelled()?;
        Ok(self.0.clone())
    }
}

/// Fixed list of emails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEmails(pub Vec<EmailRecord>);

impl EmailLookup for StaticEmails {
    fn user_emails(&self, ctx: &Context) -> Result<Vec<EmailRecord>, LookupError> {
        ctx.check_cancelled()?;
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// File-backed collaborators
// ---------------------------------------------------------------------------

/// Directory exported to JSON files, one array of records per file.
///
/// A source without a configured path reports no records. The files are
/// re-read on every lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonFileDirectory {
    phone_numbers: Option<PathBuf>,
    emails: Option<PathBuf>,
}

impl JsonFileDirectory {
    #[must_use]
    pub const fn new(phone_numbers: Option<PathBuf>, emails: Option<PathBuf>) -> Self {
        Self {
            phone_numbers,
            emails,
        }
    }

    #[must_use]
    pub fn phone_numbers_path(&self) -> Option<&Path> {
        self.phone_numbers.as_deref()
    }

    #[must_use]
    pub fn emails_path(&self) -> Option<&Path> {
        self.emails.as_deref()
    }
}

fn read_records<T: DeserializeOwned>(
    ctx: &Context,
    path: Option<&Path>,
) -> Result<Vec<T>, LookupError> {
    ctx.check_cancelled()?;
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let content = fs::read_to_string(path).map_err(|source| LookupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<T> =
        serde_json::from_str(&content).map_err(|source| LookupError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), count = records.len(), "loaded directory file");
    Ok(records)
}

impl PhoneNumberLookup for JsonFileDirectory {
    fn phone_numbers(&self, ctx: &Context) -> Result<Vec<PhoneNumberRecord>, LookupError> {
        read_records(ctx, self.phone_numbers_path())
    }
}

impl EmailLookup for JsonFileDirectory {
    fn user_emails(&self, ctx: &Context) -> Result<Vec<EmailRecord>, LookupError> {
        read_records(ctx, self.emails_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn static_lookups_return_records_in_order() {
        let ctx = Context::new();
        let phones = StaticPhoneNumbers(vec![
            PhoneNumberRecord::new("+1", true, false),
            PhoneNumberRecord::new("+2", false, false),
        ]);
        let numbers = phones.phone_numbers(&ctx).expect("lookup");
        assert_eq!(numbers[0].phone_number, "+1");
        assert_eq!(numbers[1].phone_number, "+2");
    }

    #[test]
    fn cancelled_context_stops_lookups() {
        let ctx = Context::for_account("alice");
        ctx.cancel();
        assert!(ctx.is_cancelled());

        let err = StaticEmails::default()
            .user_emails(&ctx)
            .expect_err("cancelled");
        assert!(matches!(err, LookupError::Cancelled));
        assert_eq!(err.code(), ErrorCode::LookupCancelled);
    }

    #[test]
    fn context_carries_account() {
        assert_eq!(Context::for_account("alice").account(), Some("alice"));
        assert_eq!(Context::new().account(), None);
    }

    #[test]
    fn unconfigured_file_source_is_empty() {
        let directory = JsonFileDirectory::default();
        let ctx = Context::new();
        assert!(directory.phone_numbers(&ctx).expect("lookup").is_empty());
        assert!(directory.user_emails(&ctx).expect("lookup").is_empty());
    }

    #[test]
    fn file_source_reads_records() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("emails.json");
        std::fs::write(
            &path,
            r#"[{"email":"a@example.com","isVerified":true,"isPrimary":true},
                {"email":"b@example.com","isVerified":false,"isPrimary":false}]"#,
        )
        .expect("write emails");

        let directory = JsonFileDirectory::new(None, Some(path));
        let emails = directory.user_emails(&Context::new()).expect("lookup");
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[1].email, "b@example.com");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().expect("temp dir");
        let directory = JsonFileDirectory::new(Some(dir.path().join("absent.json")), None);
        let err = directory
            .phone_numbers(&Context::new())
            .expect_err("missing file");
        assert!(matches!(err, LookupError::Io { .. }));
        assert_eq!(err.code(), ErrorCode::DirectoryReadFailed);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("phones.json");
        std::fs::write(&path, "{not json").expect("write phones");

        let directory = JsonFileDirectory::new(Some(path), None);
        let err = directory
            .phone_numbers(&Context::new())
            .expect_err("malformed file");
        assert!(matches!(err, LookupError::Parse { .. }));
        assert!(err.to_string().contains("phones.json"));
    }
}
