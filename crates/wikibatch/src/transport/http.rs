use super::{HttpRequest, HttpResponse, Method, Session, Transport};
use crate::error::{Error, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};

/// Idle connections kept per host unless overridden.
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 32;

/// [`Transport`] backed by a pooled `hyper` client over rustls.
///
/// The TLS connector is built once and shared by every session. HTTPS is
/// verified against the platform's native roots unless a connector is
/// supplied; plain HTTP is accepted as well.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    connector: HttpsConnector<HttpConnector>,
    max_idle_per_host: usize,
}

impl HyperTransport {
    /// Loads the native root certificates and builds the connector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if no usable root certificates are found.
    pub fn new() -> Result<Self> {
        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(Error::transport)?
            .https_or_http()
            .enable_http1()
            .build();

        #[cfg(feature = "tracing")]
        tracing::debug!("Built TLS connector from native roots");

        Ok(Self::with_connector(connector))
    }

    /// Uses a caller-built connector, for custom roots or TLS settings.
    pub const fn with_connector(connector: HttpsConnector<HttpConnector>) -> Self {
        Self {
            connector,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
        }
    }

    #[must_use]
    pub fn max_idle_per_host(mut self, max_idle_per_host: usize) -> Self {
        self.max_idle_per_host = max_idle_per_host;
        self
    }
}

impl Transport for HyperTransport {
    type Session = HyperSession;

    fn open(&self) -> Result<HyperSession> {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(self.max_idle_per_host)
            .build(self.connector.clone());

        #[cfg(feature = "tracing")]
        tracing::trace!("Opened HTTP session");

        Ok(HyperSession { client })
    }
}

/// A connection pool that lives as long as one dispatch call.
pub struct HyperSession {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl Session for HyperSession {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => hyper::Method::GET,
            Method::Post => hyper::Method::POST,
        };

        let mut builder = hyper::Request::builder()
            .method(method)
            .uri(request.uri.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let req = builder
            .body(Full::new(request.body.unwrap_or_default()))
            .map_err(Error::transport)?;

        let response = self.client.request(req).await.map_err(Error::transport)?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(Error::transport)?
            .to_bytes();

        Ok(HttpResponse { status, body })
    }
}
