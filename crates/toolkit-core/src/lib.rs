#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod fs;
mod log;
mod response;
mod token;

pub mod prelude;

pub use crate::config::{
    DEFAULT_FILE_NAME_LENGTH, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FORM_SIZE, ToolkitConfig,
};
pub use crate::error::{BoxedError, Error, ErrorKind, MULTIPLE_JSON_VALUES_MESSAGE, Result};
pub use crate::fs::{DIR_MODE, create_dir_if_missing};
pub use crate::log::{ResultExt, log_error};
pub use crate::response::JsonResponse;
pub use crate::token::{DEFAULT_ALPHABET, RandomTokenGenerator};
