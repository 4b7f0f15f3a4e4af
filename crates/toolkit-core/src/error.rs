//! Toolkit error types and utilities.
//!
//! Every helper in the workspace reports failures through [`Error`], which
//! pairs an [`ErrorKind`] with a human-readable message and an optional
//! source error:
//!
//! - Strongly-typed error kinds for the different failure categories
//! - Builder pattern for attaching the underlying cause
//! - Integration with `thiserror` for `Display` and `Error` implementations
//!
//! The `Display` output is the message alone, so error envelopes sent to
//! clients echo the underlying error text verbatim.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for toolkit operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Message reported when a JSON body carries more than one value.
pub const MULTIPLE_JSON_VALUES_MESSAGE: &str = "body may have only one json value";

/// Error kind enumeration for categorizing toolkit errors.
///
/// Separated from [`Error`] to allow pattern matching on the failure
/// category without inspecting the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed JSON body or a body that does not match the target type.
    Decode,
    /// Request body exceeded the configured size limit.
    PayloadTooLarge,
    /// Request body contained more than one JSON value or trailing data.
    MultipleJsonValues,
    /// Value could not be serialized to JSON.
    Encode,
    /// Outbound request or connection failure.
    Transport,
    /// Malformed multipart form.
    FormParse,
    /// Multipart form exceeded the configured size limit.
    FormTooLarge,
    /// Content type detection failed.
    Detection,
    /// File create, copy, stat or mkdir failure.
    Io,
    /// Invalid configuration.
    Config,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    ///
    /// Useful for logging fields and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::PayloadTooLarge => "payload_too_large",
            Self::MultipleJsonValues => "multiple_json_values",
            Self::Encode => "encode",
            Self::Transport => "transport",
            Self::FormParse => "form_parse",
            Self::FormTooLarge => "form_too_large",
            Self::Detection => "detection",
            Self::Io => "io",
            Self::Config => "config",
        }
    }

    /// Returns the HTTP status code a handler should answer with when an
    /// error of this kind reaches the client.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::PayloadTooLarge | Self::FormTooLarge => 413,
            Self::Decode | Self::MultipleJsonValues | Self::FormParse | Self::Detection => 400,
            Self::Transport => 502,
            Self::Encode | Self::Io | Self::Config => 500,
        }
    }

    /// Returns `true` if the error was caused by the client's request.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.status_code() < 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toolkit error with structured information.
///
/// This structure carries:
///
/// - Error kind for categorization
/// - Human-readable message
/// - Optional source error for error chaining
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`] of the given kind.
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error, enabling error chain tracking.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new decode error.
    #[inline]
    pub fn decode(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Creates a new payload-too-large error for the given byte limit.
    #[inline]
    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            ErrorKind::PayloadTooLarge,
            format!("http: request body too large (limit is {limit} bytes)"),
        )
    }

    /// Creates the error returned when a body holds more than one JSON value.
    #[inline]
    pub fn multiple_json_values() -> Self {
        Self::new(ErrorKind::MultipleJsonValues, MULTIPLE_JSON_VALUES_MESSAGE)
    }

    /// Creates a new encode error.
    #[inline]
    pub fn encode(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Encode, message)
    }

    /// Creates a new transport error.
    #[inline]
    pub fn transport(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Creates a new multipart form parse error.
    #[inline]
    pub fn form_parse(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::FormParse, message)
    }

    /// Creates a new form-too-large error for the given byte limit.
    #[inline]
    pub fn form_too_large(limit: u64) -> Self {
        Self::new(
            ErrorKind::FormTooLarge,
            format!("multipart: form exceeds limit of {limit} bytes"),
        )
    }

    /// Creates a new content detection error.
    #[inline]
    pub fn detection(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Detection, message)
    }

    /// Creates a new I/O error.
    #[inline]
    pub fn io(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err.to_string()).with_source(err)
    }
}
