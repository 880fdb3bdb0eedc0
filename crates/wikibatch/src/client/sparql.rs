use crate::{
    dispatcher::{Dispatcher, DispatcherConfig},
    endpoint::SparqlEndpoint,
    error::Result,
    query::{Params, Query, SplitSpec},
    result::{AssembledResult, SimplifiedResult, Simplify, assemble},
    transport::Transport,
};
use serde::Serialize;

/// The three shapes a SPARQL request can be given in.
#[derive(Debug, Clone)]
pub enum QueryRequest {
    Single(Query),
    Batch(Vec<Query>),
    /// A template plus parameters, one of which is split into chunks.
    Split {
        template: String,
        spec: SplitSpec,
        params: Params,
    },
}

impl QueryRequest {
    /// The queries this request stands for, in order.
    ///
    /// # Errors
    ///
    /// Propagates template and split errors.
    pub fn into_batch(self) -> Result<Vec<Query>> {
        match self {
            Self::Single(query) => Ok(vec![query]),
            Self::Batch(queries) => Ok(queries),
            Self::Split {
                template,
                spec,
                params,
            } => Query::split_by_values(&template, &spec, params),
        }
    }
}

impl From<Query> for QueryRequest {
    fn from(query: Query) -> Self {
        Self::Single(query)
    }
}

impl From<Vec<Query>> for QueryRequest {
    fn from(queries: Vec<Query>) -> Self {
        Self::Batch(queries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparqlClientConfig {
    /// Merge sub-results into one document instead of keying them by name.
    pub merge_results: bool,
    /// Flatten the assembled result into plain rows.
    pub simplify: bool,
    pub dispatcher: DispatcherConfig,
}

impl Default for SparqlClientConfig {
    fn default() -> Self {
        Self {
            merge_results: true,
            simplify: false,
            dispatcher: DispatcherConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Assembled(AssembledResult),
    Simplified(SimplifiedResult),
}

/// Runs SPARQL requests of any size against one query service.
pub struct SparqlClient<T> {
    dispatcher: Dispatcher<SparqlEndpoint, T>,
    config: SparqlClientConfig,
}

impl<T: Transport> SparqlClient<T> {
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the dispatcher config does
    /// not validate.
    pub fn new(endpoint: SparqlEndpoint, transport: T, config: SparqlClientConfig) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(endpoint, transport, config.dispatcher)?,
            config,
        })
    }

    pub const fn config(&self) -> &SparqlClientConfig {
        &self.config
    }

    pub const fn dispatcher(&self) -> &Dispatcher<SparqlEndpoint, T> {
        &self.dispatcher
    }

    /// Expands, dispatches, and assembles `request`.
    ///
    /// # Errors
    ///
    /// Any error from building the batch, from dispatch, or from decoding a
    /// payload. Nothing partial is returned.
    pub async fn query(&mut self, request: impl Into<QueryRequest>) -> Result<QueryOutput> {
        let batch = request.into().into_batch()?;
        let pairs = self.dispatcher.execute(&batch).await?;

        let format = self.dispatcher.endpoint().format();
        let assembled = assemble(&pairs, format, self.config.merge_results)?;

        Ok(if self.config.simplify {
            QueryOutput::Simplified(assembled.simplify())
        } else {
            QueryOutput::Assembled(assembled)
        })
    }
}

#[cfg(feature = "http")]
impl SparqlClient<crate::transport::HyperTransport> {
    /// A client over a pooled HTTPS transport.
    ///
    /// # Errors
    ///
    /// Fails if the native root certificates cannot be loaded or `config`
    /// does not validate.
    pub fn with_http(endpoint: SparqlEndpoint, config: SparqlClientConfig) -> Result<Self> {
        Self::new(endpoint, crate::transport::HyperTransport::new()?, config)
    }
}
