//! Generic error handling utilities
//!
//! Provides unified error handling that can work across different error types
//! while maintaining domain-specific error logging patterns, plus the panic
//! guard used wherever module-authored code is invoked by the host.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Boxed error returned by module hooks and event listeners
pub type BoxedError = Box<dyn std::error::Error>;

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When it returns `false`,
/// `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error contains a specific, user-actionable message
    /// that should be displayed directly to the user
    ///
    /// Examples of user-actionable errors:
    /// - Argument parsing failures
    /// - Invalid module identifiers in configuration
    ///
    /// Examples of system errors:
    /// - IO failures
    /// - Module activation failures
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// - Shows specific messages for user-actionable errors
/// - Shows generic context with debug details for system errors
///
/// # Arguments
/// * `error` - The error to handle (must implement ContextualError)
/// * `operation_context` - Human-readable description of the operation that failed
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    if error.is_user_actionable() {
        if let Some(user_msg) = error.user_message() {
            log::error!("FATAL: {}", user_msg);
        } else {
            log::error!("FATAL: {}", operation_context);
        }
    } else {
        log::error!("FATAL: {}: {}", operation_context, error);
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Run module-authored code, converting both returned errors and panics
/// into a printable cause
///
/// The host never lets a misbehaving module unwind through its own state
/// transitions; the caller decides how the cause is reported.
pub fn run_guarded<F>(operation: F) -> Result<(), String>
where
    F: FnOnce() -> Result<(), BoxedError>,
{
    match catch_unwind(AssertUnwindSafe(operation)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

/// Extract the message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
