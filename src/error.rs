use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VideyError {
    #[error("File too large: {size} bytes (max {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("File is empty: {0}")]
    EmptyFile(String),

    #[error("Balance {balance} is below the minimum withdrawal of {minimum}")]
    BelowMinimumWithdrawal { balance: f64, minimum: f64 },

    #[error("Payment method not set or balance unavailable")]
    PaymentMethodMissing,

    #[error("No withdrawal selected")]
    NoPendingWithdrawal,

    #[error("Withdrawal option unavailable: {0}")]
    WithdrawalOptionUnavailable(String),

    #[error("User not logged in")]
    NotLoggedIn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = VideyError> = std::result::Result<T, E>;

impl VideyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            VideyError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            VideyError::EmptyFile(_) => "EMPTY_FILE",
            VideyError::BelowMinimumWithdrawal { .. } => "BELOW_MINIMUM_WITHDRAWAL",
            VideyError::PaymentMethodMissing => "PAYMENT_METHOD_MISSING",
            VideyError::NoPendingWithdrawal => "NO_PENDING_WITHDRAWAL",
            VideyError::WithdrawalOptionUnavailable(_) => "WITHDRAWAL_OPTION_UNAVAILABLE",
            VideyError::NotLoggedIn => "NOT_LOGGED_IN",
            VideyError::NotFound(_) => "NOT_FOUND",
            VideyError::Validation(_) => "VALIDATION_ERROR",
            VideyError::Api { .. } => "UPSTREAM_ERROR",
            VideyError::Http(_) => "HTTP_ERROR",
            VideyError::Io(_) => "IO_ERROR",
            VideyError::Serialization(_) => "SERIALIZATION_ERROR",
            VideyError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Errors the user can fix by changing their input, as opposed to
    /// transport or upstream failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            VideyError::FileTooLarge { .. }
                | VideyError::EmptyFile(_)
                | VideyError::BelowMinimumWithdrawal { .. }
                | VideyError::PaymentMethodMissing
                | VideyError::NoPendingWithdrawal
                | VideyError::WithdrawalOptionUnavailable(_)
                | VideyError::NotLoggedIn
                | VideyError::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        let err = VideyError::FileTooLarge { size: 10, limit: 5 };
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert!(err.is_user_error());

        let err = VideyError::Api {
            status: StatusCode::BAD_GATEWAY,
            message: "down".to_string(),
        };
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert!(!err.is_user_error());
        assert_eq!(err.to_string(), "API error (502 Bad Gateway): down");
    }
}
