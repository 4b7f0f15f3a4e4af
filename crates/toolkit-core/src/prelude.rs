//! Prelude module for toolkit-core.
//!
//! Re-exports the most commonly used types so a single `use` statement
//! brings them into scope.
//!
//! # Example
//!
//! ```rust
//! use toolkit_core::prelude::*;
//! ```

pub use crate::{
    Error, ErrorKind, JsonResponse, RandomTokenGenerator, Result, ResultExt, ToolkitConfig,
    create_dir_if_missing, log_error,
};
