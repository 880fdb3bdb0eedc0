use super::{Document, KeyedResults};
use crate::{error::Result, format::ReturnFormat, query::Query};
use bytes::Bytes;
use serde::Serialize;

/// The logical answer to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AssembledResult {
    /// The first head, with every row of every payload in batch order.
    Merged(Document),
    /// Each payload's document under its query's name.
    Keyed(KeyedResults<Document>),
}

impl AssembledResult {
    pub const fn as_merged(&self) -> Option<&Document> {
        match self {
            Self::Merged(document) => Some(document),
            Self::Keyed(_) => None,
        }
    }

    pub const fn as_keyed(&self) -> Option<&KeyedResults<Document>> {
        match self {
            Self::Merged(_) => None,
            Self::Keyed(keyed) => Some(keyed),
        }
    }
}

/// Decodes every payload and merges or keys the documents.
///
/// Decoding stops at the first malformed payload. When merging, the head
/// of the first document is kept and the heads of the rest are assumed to
/// match. An empty input merges into an empty document.
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedFormat`] or [`crate::Error::Decode`]
/// from decoding.
pub fn assemble(
    pairs: &[(Query, Bytes)],
    format: ReturnFormat,
    merge: bool,
) -> Result<AssembledResult> {
    let mut documents = pairs
        .iter()
        .map(|(query, payload)| Document::decode(format, payload).map(|doc| (query, doc)));

    if !merge {
        return documents
            .map(|decoded| decoded.map(|(query, doc)| (query.name(), doc)))
            .collect::<Result<KeyedResults<_>>>()
            .map(AssembledResult::Keyed);
    }

    let Some(first) = documents.next() else {
        return Ok(AssembledResult::Merged(Document::default()));
    };
    let (_, mut merged) = first?;

    for decoded in documents {
        let (_query, doc) = decoded?;

        #[cfg(feature = "tracing")]
        if doc.head.vars != merged.head.vars {
            tracing::warn!(
                query = _query.name(),
                expected = ?merged.head.vars,
                found = ?doc.head.vars,
                "Merging documents with different heads"
            );
        }

        merged.results.bindings.extend(doc.results.bindings);
    }

    Ok(AssembledResult::Merged(merged))
}
