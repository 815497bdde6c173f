#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::cast_possible_truncation)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use ::bson;

mod attr;
mod bson_util;
mod cache;
pub mod connection;
mod conversation;
mod credential;
mod crypto;
pub mod error;
mod mechanism;
mod message;
mod password;
mod provider;
mod sasl;
mod trace;

pub use crate::{
    connection::Connection,
    credential::Credential,
    mechanism::ScramMechanism,
    provider::{FirstRound, ScramAuthProvider},
};
