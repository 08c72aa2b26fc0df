use serde::{Deserialize, Serialize};

/// A phone number attached to the account, as reported by the phone
/// number directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberRecord {
    pub phone_number: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub superseded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctime: Option<i64>,
}

impl PhoneNumberRecord {
    #[must_use]
    pub fn new(phone_number: impl Into<String>, verified: bool, superseded: bool) -> Self {
        Self {
            phone_number: phone_number.into(),
            verified,
            superseded,
            visibility: None,
            ctime: None,
        }
    }

    /// A number the user still has to verify: neither verified nor replaced
    /// by a newer claim.
    #[must_use]
    pub const fn needs_verification(&self) -> bool {
        !self.superseded && !self.verified
    }
}

/// An email address attached to the account, as reported by the email
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub email: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verify_email_date: Option<i64>,
}

impl EmailRecord {
    #[must_use]
    pub fn new(email: impl Into<String>, is_verified: bool, is_primary: bool) -> Self {
        Self {
            email: email.into(),
            is_verified,
            is_primary,
            visibility: None,
            last_verify_email_date: None,
        }
    }
}
