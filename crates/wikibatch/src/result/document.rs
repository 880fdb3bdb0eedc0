use crate::{error::Result, format::ReturnFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One solution: variable name to bound term. Unbound variables are absent.
pub type Binding = BTreeMap<String, Term>;

/// A SPARQL JSON results document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub head: Head,
    pub results: Results,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermKind {
    Uri,
    Literal,
    TypedLiteral,
    Bnode,
}

/// An RDF term as it appears in a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Term {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }
}

impl Document {
    /// Decodes one payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedFormat`] if `format` has no decoder
    /// and [`crate::Error::Decode`] if the payload is not a results document.
    /// Boolean (`ASK`) documents carry no `results` and are rejected.
    pub fn decode(format: ReturnFormat, payload: &[u8]) -> Result<Self> {
        let value = format.decode(payload)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn rows(&self) -> &[Binding] {
        &self.results.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn decodes_wikidata_results() {
        let payload = br#"{
            "head": {"vars": ["item", "label"]},
            "results": {"bindings": [{
                "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q42"},
                "label": {"type": "literal", "value": "Douglas Adams", "xml:lang": "en"}
            }]}
        }"#;

        let document = Document::decode(ReturnFormat::Json, payload).unwrap();

        assert_eq!(document.head.vars, ["item", "label"]);
        assert_eq!(document.rows().len(), 1);
        let row = &document.rows()[0];
        assert_eq!(row["item"].kind, TermKind::Uri);
        assert_eq!(row["label"].lang.as_deref(), Some("en"));
    }

    #[test]
    fn boolean_documents_are_rejected() {
        let payload = br#"{"head": {}, "boolean": true}"#;
        assert!(matches!(
            Document::decode(ReturnFormat::Json, payload),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn serialises_back_to_protocol_shape() {
        let mut binding = Binding::new();
        binding.insert("a".to_string(), Term::literal("1"));
        let document = Document {
            head: Head {
                vars: vec!["a".to_string()],
                link: Vec::new(),
            },
            results: Results {
                bindings: vec![binding],
            },
        };

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            serde_json::json!({
                "head": {"vars": ["a"]},
                "results": {"bindings": [{"a": {"type": "literal", "value": "1"}}]}
            })
        );
    }
}
