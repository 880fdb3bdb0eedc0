//! Bounded-concurrency execution of query batches.
//!
//! A [`Dispatcher`] pairs an [`Endpoint`] with a [`Transport`] and owns a
//! [`QueryCache`]. Each call to [`Dispatcher::execute`] opens one session,
//! fans the batch out under a semaphore, and returns payloads positionally
//! aligned with the batch. The first failure cancels every sibling request
//! and nothing from a failed batch is cached.

mod cache;
#[cfg(test)]
mod tests;

pub use cache::QueryCache;

use crate::{
    endpoint::Endpoint,
    error::{Error, Result},
    query::Query,
    transport::{Session, Transport},
};
use bytes::Bytes;
use futures::future::try_join_all;
use tokio::sync::Semaphore;

/// In-flight request limit used unless configured otherwise.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Concurrency and caching policy for one [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Maximum number of requests in flight at once. Must be non-zero.
    pub max_concurrency: usize,
    /// Whether payloads are served from and stored into the cache.
    pub cache_results: bool,
}

impl DispatcherConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `max_concurrency` is zero or
    /// larger than the semaphore can represent.
    pub fn new(max_concurrency: usize, cache_results: bool) -> Result<Self> {
        let config = Self {
            max_concurrency,
            cache_results,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks a config built by hand.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::InvalidConfig {
                reason: "max_concurrency must be at least 1".to_string(),
            });
        }
        if self.max_concurrency > Semaphore::MAX_PERMITS {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "max_concurrency must be at most {}",
                    Semaphore::MAX_PERMITS
                ),
            });
        }
        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cache_results: true,
        }
    }
}

/// Executes query batches against one endpoint.
///
/// `execute` takes `&mut self`: the cache is mutated without locking, so one
/// instance serves one call at a time. Use separate instances for concurrent
/// batches.
pub struct Dispatcher<E, T> {
    endpoint: E,
    transport: T,
    config: DispatcherConfig,
    cache: QueryCache,
}

impl<E, T> Dispatcher<E, T>
where
    E: Endpoint,
    T: Transport,
{
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(endpoint: E, transport: T, config: DispatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            endpoint,
            transport,
            config,
            cache: QueryCache::new(),
        })
    }

    pub const fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub const fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Drops every cached payload.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Runs `batch` and returns one `(query, payload)` pair per query, in
    /// batch order regardless of completion order.
    ///
    /// A single query skips the concurrency gate. Larger batches share one
    /// session, with at most `max_concurrency` requests in flight; cache
    /// hits are answered without taking a permit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBatch`] for an empty batch. Otherwise the first
    /// request or status error wins: remaining requests are dropped and no
    /// payload from the batch is cached.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            skip_all,
            fields(
                batch = batch.len(),
                max_concurrency = self.config.max_concurrency,
                cache = self.config.cache_results,
            )
        )
    )]
    pub async fn execute(&mut self, batch: &[Query]) -> Result<Vec<(Query, Bytes)>> {
        match batch {
            [] => Err(Error::EmptyBatch),
            [query] => {
                let payload = self.execute_one(query).await?;
                Ok(vec![(query.clone(), payload)])
            }
            _ => self.execute_many(batch).await,
        }
    }

    async fn execute_one(&mut self, query: &Query) -> Result<Bytes> {
        if self.config.cache_results {
            if let Some(payload) = self.cache.get(query) {
                #[cfg(feature = "tracing")]
                tracing::debug!(query = query.name(), "Cache hit");
                return Ok(payload.clone());
            }
        }

        let session = self.transport.open()?;
        let payload = fetch(&self.endpoint, &session, query).await;
        drop(session);

        let payload = payload.inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(query = query.name(), error = %_err, "Request failed");
        })?;

        if self.config.cache_results {
            self.cache.insert(query.clone(), payload.clone());
        }
        Ok(payload)
    }

    async fn execute_many(&mut self, batch: &[Query]) -> Result<Vec<(Query, Bytes)>> {
        let Self {
            endpoint,
            transport,
            config,
            cache,
        } = self;
        let use_cache = config.cache_results;

        #[cfg(feature = "tracing")]
        if use_cache {
            let hits = batch.iter().filter(|query| cache.contains(query)).count();
            tracing::debug!(hits, "Consulted cache");
        }

        let session = transport.open()?;
        let gate = Semaphore::new(config.max_concurrency);
        let endpoint = &*endpoint;

        let tasks = batch.iter().map(|query| {
            let cached = use_cache.then(|| cache.get(query).cloned()).flatten();
            let (session, gate) = (&session, &gate);
            async move {
                if let Some(payload) = cached {
                    return Ok::<_, Error>((query.clone(), payload));
                }
                let _permit = gate.acquire().await.map_err(Error::transport)?;
                let payload = fetch(endpoint, session, query).await?;
                Ok::<_, Error>((query.clone(), payload))
            }
        });

        let results = try_join_all(tasks).await;
        drop(session);

        let results = results.inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "Batch failed");
        })?;

        if use_cache {
            for (query, payload) in &results {
                cache.insert(query.clone(), payload.clone());
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(entries = cache.len(), "Populated cache");
        }

        Ok(results)
    }
}

async fn fetch<E, S>(endpoint: &E, session: &S, query: &Query) -> Result<Bytes>
where
    E: Endpoint,
    S: Session,
{
    let request = endpoint.request(query)?;

    #[cfg(feature = "tracing")]
    tracing::trace!(query = query.name(), uri = %request.uri, "Sending request");

    let response = session.send(request).await?;
    if response.is_success() {
        Ok(response.body)
    } else {
        Err(Error::from_status(response.status, &response.body))
    }
}
