//! Error types for batched query execution.
//!
//! Every failure in a call is terminal for that call: nothing is retried or
//! downgraded internally, and a batch either yields every sub-result or one
//! [`Error`].
//!
//! ## Error Cases
//! - `Template`: a query template could not be rendered.
//! - `MissingSplitParameter`: the parameter to split by was not supplied.
//! - `EmptyBatch`: no queries were submitted.
//! - `UnsupportedFormat` / `UnsupportedOperation`: the request asks for
//!   something only the JSON/query path supports.
//! - `InvalidConfig`: a configuration value is out of range.
//! - `QueryBadFormed`, `Unauthorized`, `EndpointNotFound`, `UriTooLong`,
//!   `EndpointInternalError`: transport status codes 400, 401, 404, 414 and
//!   500.
//! - `Transport`: any other status or a connection-level failure.
//! - `Decode`: a payload is not valid for its declared format.
//! - `Api` / `UnrecognizedEntity`: the linked-data API rejected the request
//!   or returned an entity this crate does not model.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for query rendering, dispatch, and decoding.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A placeholder had no parameter, a brace was unbalanced, or a parameter
    /// value was neither a string nor a list of strings.
    #[error("Template error: {reason}")]
    Template { reason: String },

    /// The parameter named for splitting was not among the supplied ones.
    #[error("Split parameter `{name}` is not among the query parameters")]
    MissingSplitParameter { name: String },

    /// A batch must hold at least one query.
    #[error("Cannot execute an empty query batch")]
    EmptyBatch,

    #[error("Format `{format}` is not supported; only JSON is")]
    UnsupportedFormat { format: String },

    #[error("Unsupported operation: {reason}")]
    UnsupportedOperation { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// HTTP 400.
    #[error("Query is badly formed: {body}")]
    QueryBadFormed { body: String },

    /// HTTP 401.
    #[error("Unauthorized: {body}")]
    Unauthorized { body: String },

    /// HTTP 404.
    #[error("Endpoint not found: {body}")]
    EndpointNotFound { body: String },

    /// HTTP 414.
    #[error("Request URI too long: {body}")]
    UriTooLong { body: String },

    /// HTTP 500.
    #[error("Endpoint internal error: {body}")]
    EndpointInternalError { body: String },

    /// Any other non-success status, or a failure below the HTTP layer
    /// (`status` is `None` then).
    #[error("Transport error (status {status:?}): {reason}")]
    Transport { status: Option<u16>, reason: String },

    #[error("Decode error: {reason}")]
    Decode { reason: String },

    /// The linked-data API answered with an `error` object.
    #[error("API error `{code}`: {info}")]
    Api { code: String, info: String },

    #[error("Unrecognized entity `{id}`")]
    UnrecognizedEntity { id: String },
}

impl Error {
    /// Maps a non-success HTTP status and its body onto the error taxonomy.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body).into_owned();
        match status {
            400 => Self::QueryBadFormed { body },
            401 => Self::Unauthorized { body },
            404 => Self::EndpointNotFound { body },
            414 => Self::UriTooLong { body },
            500 => Self::EndpointInternalError { body },
            _ => Self::Transport {
                status: Some(status),
                reason: body,
            },
        }
    }

    pub(crate) fn template(reason: impl Into<String>) -> Self {
        Self::Template {
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(reason: impl core::fmt::Display) -> Self {
        Self::Transport {
            status: None,
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            reason: err.to_string(),
        }
    }
}
