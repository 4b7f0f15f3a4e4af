#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod codec;
pub mod download;
pub mod prelude;
pub mod response;
pub mod sniff;
pub mod upload;

mod extract;
mod toolkit;

pub use crate::codec::{APPLICATION_JSON, decode_json_slice, read_json, write_json};
pub use crate::download::download_file;
pub use crate::extract::StrictJson;
pub use crate::response::{DEFAULT_ERROR_STATUS, error_json};
pub use crate::sniff::{Mime, SNIFF_LEN, detect};
pub use crate::toolkit::Toolkit;
pub use crate::upload::{UploadedFile, Uploader};
