#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod push;

pub use toolkit_core::{Error, ErrorKind, Result};

pub use crate::client::{ReqwestPusher, TRACING_TARGET};
pub use crate::config::ReqwestConfig;
pub use crate::push::{encode_indented, push_json_to_remote};
