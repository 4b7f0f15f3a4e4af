//! Toolkit configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default maximum JSON body size: 1 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 1024 * 1024;

/// Default multipart form ceiling: 1 GiB.
pub const DEFAULT_MAX_FORM_SIZE: u64 = 1024 * 1024 * 1024;

/// Default length of the random part of stored filenames.
pub const DEFAULT_FILE_NAME_LENGTH: usize = 25;

/// Limits shared by the request helpers.
///
/// The value is owned by the caller and is read-only once handed to the
/// helpers; every operation borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ToolkitConfig {
    /// Maximum JSON request body size in bytes (0 uses the 1 MiB default)
    #[cfg_attr(
        feature = "config",
        arg(long = "max-file-size", env = "MAX_FILE_SIZE", default_value_t = 0)
    )]
    #[serde(default)]
    pub max_file_size: usize,

    /// Maximum multipart form size in bytes
    #[cfg_attr(
        feature = "config",
        arg(long = "max-form-size", env = "MAX_FORM_SIZE", default_value_t = DEFAULT_MAX_FORM_SIZE)
    )]
    #[serde(default = "default_max_form_size")]
    pub max_form_size: u64,

    /// Number of random characters in stored upload filenames
    #[cfg_attr(
        feature = "config",
        arg(long = "file-name-length", env = "FILE_NAME_LENGTH", default_value_t = DEFAULT_FILE_NAME_LENGTH)
    )]
    #[serde(default = "default_file_name_length")]
    pub file_name_length: usize,
}

fn default_max_form_size() -> u64 {
    DEFAULT_MAX_FORM_SIZE
}

fn default_file_name_length() -> usize {
    DEFAULT_FILE_NAME_LENGTH
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            max_file_size: 0,
            max_form_size: default_max_form_size(),
            file_name_length: default_file_name_length(),
        }
    }
}

impl ToolkitConfig {
    /// Set the maximum JSON body size in bytes.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Set the multipart form ceiling in bytes.
    #[must_use]
    pub fn with_max_form_size(mut self, max_form_size: u64) -> Self {
        self.max_form_size = max_form_size;
        self
    }

    /// Set the length of the random part of stored filenames.
    #[must_use]
    pub fn with_file_name_length(mut self, file_name_length: usize) -> Self {
        self.file_name_length = file_name_length;
        self
    }

    /// Returns the effective JSON body limit, using the default if zero.
    pub fn effective_max_file_size(&self) -> usize {
        if self.max_file_size == 0 {
            DEFAULT_MAX_FILE_SIZE
        } else {
            self.max_file_size
        }
    }

    /// Returns the effective form ceiling, using the default if zero.
    pub fn effective_max_form_size(&self) -> u64 {
        if self.max_form_size == 0 {
            DEFAULT_MAX_FORM_SIZE
        } else {
            self.max_form_size
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.file_name_length == 0 {
            return Err(Error::config("file_name_length cannot be zero"));
        }
        Ok(())
    }
}
