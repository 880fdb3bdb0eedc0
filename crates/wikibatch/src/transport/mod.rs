//! The network seam used by the dispatcher.
//!
//! A [`Transport`] opens a [`Session`] for the duration of one dispatch call.
//! The session is dropped on every exit path, successful or not, which is what
//! releases pooled connections. Status codes are left to the caller: a
//! session only fails when no HTTP response was obtained at all.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use self::http::{DEFAULT_MAX_IDLE_PER_HOST, HyperSession, HyperTransport};

use crate::error::Result;
use bytes::Bytes;
use core::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// A fully built request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            uri: uri.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(uri: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::Post,
            uri: uri.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header called `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Opens reusable network sessions.
pub trait Transport: Send + Sync {
    type Session: Session;

    /// Acquires a session. It is released when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the session cannot be set up.
    fn open(&self) -> Result<Self::Session>;
}

/// One open session, able to send many requests concurrently.
pub trait Session: Send + Sync {
    /// Sends `request` and reads the whole response body.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}
