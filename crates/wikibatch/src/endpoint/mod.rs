//! Endpoints turn a rendered [`Query`] into an [`HttpRequest`].
//!
//! An endpoint knows where requests go and how they are encoded; it never
//! performs I/O itself. The dispatcher pairs one endpoint with one
//! [`crate::Transport`].

mod api;
mod sparql;

pub use api::{ApiEndpoint, WIKIDATA_API};
pub use sparql::{RequestMethod, SparqlEndpoint, WIKIDATA_SPARQL};

use crate::{error::Result, query::Query, transport::HttpRequest};

/// User agent sent when the caller does not provide one.
pub const DEFAULT_USER_AGENT: &str = concat!("wikibatch/", env!("CARGO_PKG_VERSION"));

/// Builds the network request for a query.
pub trait Endpoint: Send + Sync {
    /// # Errors
    ///
    /// Fails if the query cannot be expressed as a request against this
    /// endpoint, for example a SPARQL update sent to a query service.
    fn request(&self, query: &Query) -> Result<HttpRequest>;
}

/// Appends `pairs` to `base` as a URL-encoded query string.
pub(crate) fn with_query_string<'a>(
    base: &str,
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    if encoded.is_empty() {
        return base.to_string();
    }
    let joiner = if base.contains('?') { '&' } else { '?' };
    format!("{base}{joiner}{encoded}")
}
