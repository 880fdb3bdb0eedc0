use super::{AssembledResult, Document, KeyedResults};
use serde::Serialize;
use std::collections::BTreeMap;

/// A flattened solution: variable name to the bare term value.
pub type Row = BTreeMap<String, String>;

/// Strips term metadata, leaving plain values.
///
/// Keyed containers simplify each of their values, so the transform follows
/// the shape of whatever it is given rather than a fixed depth.
pub trait Simplify {
    type Output;

    fn simplify(&self) -> Self::Output;
}

impl Simplify for Document {
    type Output = Vec<Row>;

    fn simplify(&self) -> Vec<Row> {
        self.rows()
            .iter()
            .map(|binding| {
                binding
                    .iter()
                    .map(|(var, term)| (var.clone(), term.value.clone()))
                    .collect()
            })
            .collect()
    }
}

impl<T: Simplify> Simplify for KeyedResults<T> {
    type Output = KeyedResults<T::Output>;

    fn simplify(&self) -> Self::Output {
        self.map(T::simplify)
    }
}

/// [`AssembledResult`] after simplification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SimplifiedResult {
    Rows(Vec<Row>),
    Keyed(KeyedResults<Vec<Row>>),
}

impl Simplify for AssembledResult {
    type Output = SimplifiedResult;

    fn simplify(&self) -> SimplifiedResult {
        match self {
            Self::Merged(document) => SimplifiedResult::Rows(document.simplify()),
            Self::Keyed(keyed) => SimplifiedResult::Keyed(keyed.simplify()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{format::ReturnFormat, result::Term, testing::sparql_json};

    fn document(rows: &[&[(&str, &str)]]) -> Document {
        Document::decode(ReturnFormat::Json, &sparql_json(&["a", "b"], rows)).unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn merged_document_flattens_to_rows() {
        let mut doc = document(&[&[("a", "1"), ("b", "2")], &[("a", "3")]]);
        doc.results.bindings[1].insert(
            "b".to_string(),
            Term::uri("http://www.wikidata.org/entity/Q4"),
        );

        assert_eq!(
            AssembledResult::Merged(doc).simplify(),
            SimplifiedResult::Rows(vec![
                row(&[("a", "1"), ("b", "2")]),
                row(&[("a", "3"), ("b", "http://www.wikidata.org/entity/Q4")]),
            ])
        );
    }

    #[test]
    fn keyed_documents_simplify_per_name() {
        let keyed: KeyedResults<Document> = [
            ("X", document(&[&[("a", "1")]])),
            ("Y", document(&[&[("b", "2")]])),
        ]
        .into_iter()
        .collect();

        let simplified = AssembledResult::Keyed(keyed).simplify();

        let expected: KeyedResults<Vec<Row>> = [
            ("X", vec![row(&[("a", "1")])]),
            ("Y", vec![row(&[("b", "2")])]),
        ]
        .into_iter()
        .collect();
        assert_eq!(simplified, SimplifiedResult::Keyed(expected));
        assert_eq!(
            serde_json::to_string(&simplified).unwrap(),
            r#"{"X":[{"a":"1"}],"Y":[{"b":"2"}]}"#
        );
    }

    #[test]
    fn nested_keyed_results_recurse() {
        let inner: KeyedResults<Document> = [("X", document(&[&[("a", "1")]]))]
            .into_iter()
            .collect();
        let outer: KeyedResults<KeyedResults<Document>> =
            [("outer", inner)].into_iter().collect();

        let simplified = outer.simplify();
        assert_eq!(
            simplified.get("outer").and_then(|inner| inner.get("X")),
            Some(&vec![row(&[("a", "1")])])
        );
    }
}
