// Error classification for consistent messages and exit codes

use crate::service::ServiceError;
use thiserror::Error;

/// Exit code for invalid input, missing tasks and similar user mistakes
pub const USER_ERROR_EXIT: i32 = 1;
/// Exit code for storage, configuration and wiring failures
pub const INTERNAL_ERROR_EXIT: i32 = 2;

/// An error the user can fix by changing their input
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UserError(pub String);

/// Wrap a message as a user error
pub fn user_error(message: impl Into<String>) -> anyhow::Error {
    UserError(message.into()).into()
}

/// Map a service error to a user or internal error
pub fn service_error(err: ServiceError) -> anyhow::Error {
    if err.is_user_error() {
        user_error(err.to_string())
    } else {
        anyhow::Error::from(err)
    }
}

/// True when `err` should be reported as a user error (exit code 1)
pub fn is_user_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<UserError>().is_some()
        || err.downcast_ref::<clap::Error>().is_some()
}

/// Exit code for an error returned from [`crate::cli::run`]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if is_user_error(err) {
        USER_ERROR_EXIT
    } else {
        INTERNAL_ERROR_EXIT
    }
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}
