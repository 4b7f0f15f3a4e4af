//! Prelude module for toolkit-server.
//!
//! Re-exports the handler helpers together with the core types they
//! return, so a single `use` statement brings them into scope.
//!
//! # Example
//!
//! ```rust
//! use toolkit_server::prelude::*;
//! ```

pub use toolkit_core::prelude::*;

pub use crate::{
    StrictJson, Toolkit, UploadedFile, Uploader, download_file, error_json, read_json, write_json,
};
