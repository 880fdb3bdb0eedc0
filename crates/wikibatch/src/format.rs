//! Return formats and their payload decoders.
//!
//! Decoders are looked up by format in a table built once, on first use.
//! Only JSON has a decoder; every other format fails fast with
//! [`Error::UnsupportedFormat`] instead of being misread.

use crate::error::{Error, Result};
use core::{fmt, str::FromStr};
use serde_json::Value;
use std::{collections::HashMap, sync::LazyLock};

/// Turns a raw payload into a structured document.
pub type Decoder = fn(&[u8]) -> Result<Value>;

static DECODERS: LazyLock<HashMap<ReturnFormat, Decoder>> =
    LazyLock::new(|| HashMap::from([(ReturnFormat::Json, decode_json as Decoder)]));

/// Wire formats a query endpoint can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnFormat {
    #[default]
    Json,
    Xml,
    Turtle,
    N3,
    Rdf,
    JsonLd,
    Csv,
    Tsv,
}

impl ReturnFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Turtle => "turtle",
            Self::N3 => "n3",
            Self::Rdf => "rdf",
            Self::JsonLd => "json-ld",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// Media type sent in the `Accept` header.
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Json => "application/sparql-results+json",
            Self::Xml => "application/sparql-results+xml",
            Self::Turtle => "text/turtle",
            Self::N3 => "text/n3",
            Self::Rdf => "application/rdf+xml",
            Self::JsonLd => "application/ld+json",
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
        }
    }

    /// The decoder registered for this format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if none is registered.
    pub fn decoder(self) -> Result<Decoder> {
        DECODERS
            .get(&self)
            .copied()
            .ok_or_else(|| Error::UnsupportedFormat {
                format: self.as_str().to_string(),
            })
    }

    pub fn is_supported(self) -> bool {
        DECODERS.contains_key(&self)
    }

    /// Decodes `payload` with this format's decoder.
    pub fn decode(self, payload: &[u8]) -> Result<Value> {
        (self.decoder()?)(payload)
    }
}

impl fmt::Display for ReturnFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "turtle" => Ok(Self::Turtle),
            "n3" => Ok(Self::N3),
            "rdf" | "rdf+xml" => Ok(Self::Rdf),
            "json-ld" | "jsonld" => Ok(Self::JsonLd),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(Error::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

fn decode_json(payload: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(payload)?)
}
