#![doc = include_str!("../README.md")]

mod chunk;
mod client;
mod dispatcher;
mod endpoint;
mod error;
mod format;
mod query;
mod result;
#[cfg(test)]
mod testing;
mod transport;
mod wikidata;

pub use crate::chunk::*;
pub use crate::client::*;
pub use crate::dispatcher::*;
pub use crate::endpoint::*;
pub use crate::error::*;
pub use crate::format::*;
pub use crate::query::*;
pub use crate::result::*;
pub use crate::transport::*;
pub use crate::wikidata::*;
