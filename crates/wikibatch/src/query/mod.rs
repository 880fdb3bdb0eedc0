//! Query templates, bound parameters, and query identity.
//!
//! A [`Query`] is rendered exactly once, when it is built. Its rendered
//! string is both the request payload and its identity: two queries are
//! equal, hash the same, and share a cache entry whenever their rendered
//! strings match, whatever their names.

mod split;
mod template;

pub use split::{DEFAULT_PREFIX, SplitSpec};

use crate::error::{Error, Result};
use core::{
    fmt,
    hash::{Hash, Hasher},
};
use portable_atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

/// Separator used to join list parameters unless a query overrides it.
pub const DEFAULT_SEPARATOR: &str = " ";

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(0);

/// A parameter value: a single string or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    /// The values carried, as a slice of one for scalars.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Scalar(value) => core::slice::from_ref(value),
            Self::List(values) => values,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl TryFrom<serde_json::Value> for ParamValue {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(Self::Scalar(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(Error::template(format!(
                        "list parameters must hold strings, found `{other}`"
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            other => Err(Error::template(format!(
                "parameters must be a string or a list of strings, found `{other}`"
            ))),
        }
    }
}

/// Named parameters in insertion order.
///
/// Inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style [`Params::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        let idx = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// An immutable, fully rendered request template.
#[derive(Debug, Clone)]
pub struct Query {
    template: String,
    name: String,
    params: Params,
    separator: String,
    rendered: String,
}

impl Query {
    /// Renders `template` with `params` under a generated name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if a placeholder has no parameter or a
    /// brace is unbalanced.
    pub fn new(template: impl Into<String>, params: Params) -> Result<Self> {
        Self::builder(template).params(params).build()
    }

    pub fn builder(template: impl Into<String>) -> QueryBuilder {
        QueryBuilder {
            template: template.into(),
            name: None,
            params: Params::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// The unrendered template.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Separator used to join list parameters.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The rendered request string; also the identity of this query.
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({})", self.rendered)
    }
}

/// Builder for [`Query`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    template: String,
    name: Option<String>,
    params: Params,
    separator: String,
}

impl QueryBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Adds every parameter in `params`, replacing any already set.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        for (name, value) in params.0 {
            self.params.insert(name, value);
        }
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Renders the template and freezes the query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if rendering fails.
    pub fn build(self) -> Result<Query> {
        let rendered = template::render(&self.template, &self.params, &self.separator)?;
        let name = self.name.unwrap_or_else(|| {
            format!("Query {}", NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed))
        });

        Ok(Query {
            template: self.template,
            name,
            params: self.params,
            separator: self.separator,
            rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const TEMPLATE: &str = "SELECT ?q WHERE {{ VALUES ?q {{ {qids} }} }} # {lang}";

    #[test]
    fn renders_once_at_build() {
        let query = Query::builder(TEMPLATE)
            .name("labels")
            .param("qids", vec!["wd:Q1", "wd:Q2"])
            .param("lang", "en")
            .build()
            .unwrap();

        assert_eq!(
            query.as_str(),
            "SELECT ?q WHERE { VALUES ?q { wd:Q1 wd:Q2 } } # en"
        );
        assert_eq!(query.name(), "labels");
        assert_eq!(query.template(), TEMPLATE);
        assert_eq!(query.to_string(), format!("Query({})", query.as_str()));
    }

    #[test]
    fn identity_ignores_name() {
        let a = Query::builder(TEMPLATE)
            .name("a")
            .param("qids", "wd:Q1")
            .param("lang", "en")
            .build()
            .unwrap();
        let b = Query::builder(TEMPLATE)
            .name("b")
            .param("lang", "en")
            .param("qids", "wd:Q1")
            .build()
            .unwrap();
        let c = Query::builder(TEMPLATE)
            .name("a")
            .param("qids", "wd:Q2")
            .param("lang", "en")
            .build()
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Query> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn generated_names_are_unique() {
        let params = Params::new().with("qids", "wd:Q1").with("lang", "en");
        let a = Query::new(TEMPLATE, params.clone()).unwrap();
        let b = Query::new(TEMPLATE, params).unwrap();
        assert!(a.name().starts_with("Query "));
        assert_ne!(a.name(), b.name());
        assert_eq!(a, b);
    }

    #[test]
    fn missing_parameter_is_a_template_error() {
        let err = Query::builder(TEMPLATE)
            .param("qids", "wd:Q1")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn params_keep_insertion_order_and_replace_in_place() {
        let mut params = Params::new().with("b", "1").with("a", "2");
        params.insert("b", "3");
        let names: Vec<_> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(params.get("b"), Some(&ParamValue::from("3")));
        assert_eq!(params.remove("b"), Some(ParamValue::from("3")));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn json_values_convert_to_params() {
        use serde_json::json;

        assert_eq!(
            ParamValue::try_from(json!("en")).unwrap(),
            ParamValue::from("en")
        );
        assert_eq!(
            ParamValue::try_from(json!(["Q1", "Q2"])).unwrap(),
            ParamValue::from(vec!["Q1", "Q2"])
        );
        assert!(matches!(
            ParamValue::try_from(json!(42)),
            Err(Error::Template { .. })
        ));
        assert!(matches!(
            ParamValue::try_from(json!(["Q1", 2])),
            Err(Error::Template { .. })
        ));
    }
}
