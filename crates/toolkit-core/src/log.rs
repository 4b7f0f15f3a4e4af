//! Error logging through `tracing`.

use std::fmt::Display;

/// Tracing target for logged errors.
pub const TRACING_TARGET: &str = "toolkit_core::error";

/// Logs `error` at the error level if one is present.
///
/// Logging never fails and never propagates anything back to the caller.
///
/// # Examples
///
/// ```rust
/// use toolkit_core::log_error;
///
/// let failed = std::fs::read("/definitely/not/here").err();
/// log_error(failed.as_ref());
/// log_error::<std::io::Error>(None);
/// ```
pub fn log_error<E>(error: Option<&E>)
where
    E: Display + ?Sized,
{
    if let Some(error) = error {
        tracing::error!(target: TRACING_TARGET, error = %error, "error occurred");
    }
}

/// Extension trait for logging the error side of a [`Result`] in passing.
pub trait ResultExt {
    /// Logs the error, if any, and returns `self` unchanged.
    #[must_use]
    fn log_err(self) -> Self;
}

impl<T, E> ResultExt for Result<T, E>
where
    E: Display,
{
    fn log_err(self) -> Self {
        log_error(self.as_ref().err());
        self
    }
}
