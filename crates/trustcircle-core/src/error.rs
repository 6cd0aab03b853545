//! The error type shared by every Trust Circle crate.
//!
//! One error type, tagged with a [`ReturnCode`]. Callers match on
//! [`Error::code`] rather than on error subtypes.

use std::borrow::Cow;

use thiserror::Error;

use crate::code::ReturnCode;

type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure tagged with its catalogued outcome.
///
/// Warning-classified errors carry a category message only. Error-classified
/// errors may additionally carry the underlying cause for diagnostics.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct Error {
    code: ReturnCode,
    message: Cow<'static, str>,
    #[source]
    source: Option<Source>,
}

impl Error {
    /// Create an error with an explicit code and message.
    pub fn new(code: ReturnCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    ///
    /// Ignored for warning-classified codes, which must not leak detail.
    pub fn with_source(mut self, source: impl Into<Source>) -> Self {
        if !self.code.is_warning() {
            self.source = Some(source.into());
        }
        self
    }

    pub fn code(&self) -> ReturnCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wrong passphrase or unusable credentials.
    pub fn authentication() -> Self {
        Self::new(ReturnCode::AuthenticationWarning, "authentication failed")
    }

    pub fn authorization(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::AuthorizationWarning, message)
    }

    pub fn identification(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::IdentificationWarning, message)
    }

    pub fn illegal_action(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::IllegalAction, message)
    }

    pub fn verification(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::VerificationWarning, message)
    }

    /// Data could not be decrypted: wrong key, corruption or tampering.
    pub fn integrity() -> Self {
        Self::new(
            ReturnCode::IntegrityWarning,
            "data could not be decrypted or has been tampered with",
        )
    }

    pub fn signature() -> Self {
        Self::new(ReturnCode::SignatureWarning, "signature is invalid")
    }

    pub fn setting(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::SettingWarning, message)
    }

    pub fn crypto(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::CryptoError, message)
    }

    pub fn corrupted(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::IntegrityError, message)
    }

    pub fn settings_invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::SettingError, message)
    }

    pub fn database(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::DatabaseError, message)
    }

    pub fn constraint(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ReturnCode::ConstraintError, message)
    }
}

/// Result type for Trust Circle operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_includes_code() {
        let err = Error::illegal_action("trustee already exists");
        assert_eq!(
            err.to_string(),
            "IllegalAction(405): trustee already exists"
        );
    }

    #[test]
    fn test_warning_drops_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "aead::Error");
        let err = Error::authentication().with_source(cause);
        assert!(err.source().is_none());
        assert!(!err.to_string().contains("aead"));
    }

    #[test]
    fn test_error_keeps_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = Error::database("insert failed").with_source(cause);
        assert_eq!(err.code(), ReturnCode::DatabaseError);
        assert!(err.source().is_some());
    }
}
