//! Return codes: the closed catalogue of outcomes.
//!
//! Every failure in the system is tagged with exactly one [`ReturnCode`].
//! Published codes never change meaning; new outcomes get new numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// The request completed.
    Info,
    /// The client did something wrong (bad credentials, bad input, ...).
    Warning,
    /// The server failed.
    Error,
}

/// A catalogued outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnCode {
    Success,

    AuthenticationWarning,
    AuthorizationWarning,
    IdentificationWarning,
    IllegalAction,
    VerificationWarning,
    IntegrityWarning,
    SignatureWarning,
    SettingWarning,

    Error,
    CryptoError,
    IntegrityError,
    SettingError,
    DatabaseError,
    ConstraintError,
}

struct Row {
    code: i32,
    status: u16,
    classification: Classification,
    description: &'static str,
}

impl ReturnCode {
    /// The whole catalogue, in numeric order.
    pub const ALL: [ReturnCode; 15] = [
        ReturnCode::Success,
        ReturnCode::AuthenticationWarning,
        ReturnCode::AuthorizationWarning,
        ReturnCode::IdentificationWarning,
        ReturnCode::IllegalAction,
        ReturnCode::VerificationWarning,
        ReturnCode::IntegrityWarning,
        ReturnCode::SignatureWarning,
        ReturnCode::SettingWarning,
        ReturnCode::Error,
        ReturnCode::CryptoError,
        ReturnCode::IntegrityError,
        ReturnCode::SettingError,
        ReturnCode::DatabaseError,
        ReturnCode::ConstraintError,
    ];

    const fn row(&self) -> Row {
        use Classification::{Error as E, Info as I, Warning as W};

        match self {
            ReturnCode::Success => Row {
                code: 0,
                status: 200,
                classification: I,
                description: "The request completed without errors.",
            },
            ReturnCode::AuthenticationWarning => Row {
                code: 401,
                status: 401,
                classification: W,
                description: "The account could not be authenticated.",
            },
            ReturnCode::AuthorizationWarning => Row {
                code: 403,
                status: 403,
                classification: W,
                description: "The account is not permitted to perform this request.",
            },
            ReturnCode::IdentificationWarning => Row {
                code: 404,
                status: 404,
                classification: W,
                description: "The requested object could not be identified.",
            },
            ReturnCode::IllegalAction => Row {
                code: 405,
                status: 405,
                classification: W,
                description: "The requested action is not allowed.",
            },
            ReturnCode::VerificationWarning => Row {
                code: 406,
                status: 406,
                classification: W,
                description: "The request contained values that failed verification.",
            },
            ReturnCode::IntegrityWarning => Row {
                code: 409,
                status: 409,
                classification: W,
                description: "The data could not be decrypted or has been tampered with.",
            },
            ReturnCode::SignatureWarning => Row {
                code: 412,
                status: 412,
                classification: W,
                description: "The signature is invalid.",
            },
            ReturnCode::SettingWarning => Row {
                code: 422,
                status: 422,
                classification: W,
                description: "The value was rejected by the current settings.",
            },
            ReturnCode::Error => Row {
                code: 900,
                status: 500,
                classification: E,
                description: "An unknown error occurred.",
            },
            ReturnCode::CryptoError => Row {
                code: 901,
                status: 500,
                classification: E,
                description: "A cryptographic operation failed.",
            },
            ReturnCode::IntegrityError => Row {
                code: 902,
                status: 500,
                classification: E,
                description: "Stored data is corrupted.",
            },
            ReturnCode::SettingError => Row {
                code: 903,
                status: 500,
                classification: E,
                description: "The settings could not be read or are invalid.",
            },
            ReturnCode::DatabaseError => Row {
                code: 904,
                status: 500,
                classification: E,
                description: "The storage layer failed.",
            },
            ReturnCode::ConstraintError => Row {
                code: 905,
                status: 500,
                classification: E,
                description: "A uniqueness constraint was violated.",
            },
        }
    }

    /// Numeric code.
    pub const fn code(&self) -> i32 {
        self.row().code
    }

    /// Externally-facing status equivalent (HTTP semantics).
    pub const fn status(&self) -> u16 {
        self.row().status
    }

    pub const fn classification(&self) -> Classification {
        self.row().classification
    }

    pub const fn description(&self) -> &'static str {
        self.row().description
    }

    /// Look up a code by number. Unknown numbers map to [`ReturnCode::Error`].
    pub fn find_by_code(code: i32) -> ReturnCode {
        Self::ALL
            .iter()
            .copied()
            .find(|rc| rc.code() == code)
            .unwrap_or(ReturnCode::Error)
    }

    pub const fn is_warning(&self) -> bool {
        matches!(self.classification(), Classification::Warning)
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.classification(), Classification::Error)
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<i32> = ReturnCode::ALL.iter().map(|rc| rc.code()).collect();
        assert_eq!(codes.len(), ReturnCode::ALL.len());
    }

    #[test]
    fn test_find_by_code_roundtrip() {
        for rc in ReturnCode::ALL {
            let found = ReturnCode::find_by_code(rc.code());
            assert_eq!(found, rc);
            assert_eq!(found.classification(), rc.classification());
            assert_eq!(found.description(), rc.description());
        }
    }

    #[test]
    fn test_unknown_code_falls_back_to_error() {
        for unknown in [-1, 1, 402, 899, 1000, i32::MIN, i32::MAX] {
            assert_eq!(ReturnCode::find_by_code(unknown), ReturnCode::Error);
        }
    }

    #[test]
    fn test_classification_split() {
        let warnings = [
            ReturnCode::AuthenticationWarning,
            ReturnCode::AuthorizationWarning,
            ReturnCode::IdentificationWarning,
            ReturnCode::IllegalAction,
            ReturnCode::VerificationWarning,
            ReturnCode::IntegrityWarning,
            ReturnCode::SignatureWarning,
            ReturnCode::SettingWarning,
        ];
        for rc in warnings {
            assert!(rc.is_warning(), "{rc} should be a warning");
        }

        let errors = [
            ReturnCode::Error,
            ReturnCode::CryptoError,
            ReturnCode::IntegrityError,
            ReturnCode::SettingError,
            ReturnCode::DatabaseError,
            ReturnCode::ConstraintError,
        ];
        for rc in errors {
            assert!(rc.is_error(), "{rc} should be an error");
            assert_eq!(rc.status(), 500);
        }

        assert_eq!(ReturnCode::Success.classification(), Classification::Info);
    }

    #[test]
    fn test_display() {
        assert_eq!(ReturnCode::IllegalAction.to_string(), "IllegalAction(405)");
    }
}
