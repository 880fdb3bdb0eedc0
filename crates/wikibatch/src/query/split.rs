use super::{DEFAULT_SEPARATOR, ParamValue, Params, Query};
use crate::{
    chunk::chunks,
    error::{Error, Result},
};

/// Prefix applied to each split value unless overridden.
pub const DEFAULT_PREFIX: &str = "wd:";

/// How to split one list parameter of a template across several queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSpec {
    param: String,
    chunk_size: Option<usize>,
    prefix: String,
    separator: String,
    name: Option<String>,
}

impl SplitSpec {
    /// Splits by `param` with no chunk size (one query), the `wd:` prefix,
    /// and a space separator.
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            chunk_size: None,
            prefix: DEFAULT_PREFIX.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            name: None,
        }
    }

    /// Number of values per query. Zero, like leaving it unset, keeps every
    /// value in a single query.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Base name for the produced queries; chunk `i` is named `"{name} {i}"`.
    /// Without it every chunk gets a generated name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn param(&self) -> &str {
        &self.param
    }
}

impl Query {
    /// Builds one query per chunk of the values of `spec.param`.
    ///
    /// Each value is trimmed and prefixed. The chunk query holds its values
    /// as a list parameter under the same name, joined with the split's
    /// separator when rendered. All other parameters are shared unchanged.
    /// Concatenating the chunk lists gives back every input value in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSplitParameter`] if `spec.param` is not in
    /// `params`, or [`Error::Template`] if rendering a chunk fails.
    pub fn split_by_values(
        template: &str,
        spec: &SplitSpec,
        mut params: Params,
    ) -> Result<Vec<Self>> {
        let values = match params.remove(&spec.param) {
            Some(ParamValue::List(values)) => values,
            Some(ParamValue::Scalar(value)) => vec![value],
            None => {
                return Err(Error::MissingSplitParameter {
                    name: spec.param.clone(),
                });
            }
        };

        chunks(&values, spec.chunk_size)
            .enumerate()
            .map(|(i, chunk)| {
                let prefixed: Vec<String> = chunk
                    .iter()
                    .map(|value| format!("{}{}", spec.prefix, value.trim()))
                    .collect();

                let mut builder = Self::builder(template)
                    .separator(spec.separator.as_str())
                    .param(spec.param.as_str(), prefixed)
                    .params(params.clone());
                if let Some(name) = &spec.name {
                    builder = builder.name(format!("{name} {i}"));
                }
                builder.build()
            })
            .collect()
    }
}
