//! Caller-facing clients: one logical request in, one logical answer out.

mod api;
mod sparql;

pub use api::{ApiClient, ApiClientConfig, DEFAULT_MAX_VALUES};
pub use sparql::{QueryOutput, QueryRequest, SparqlClient, SparqlClientConfig};
