use super::{DEFAULT_USER_AGENT, Endpoint, with_query_string};
use crate::{
    error::{Error, Result},
    format::ReturnFormat,
    query::Query,
    transport::HttpRequest,
};
use core::str::FromStr;

/// The public Wikidata query service.
pub const WIKIDATA_SPARQL: &str = "https://query.wikidata.org/sparql";

const UPDATE_KEYWORDS: [&str; 9] = [
    "INSERT", "DELETE", "LOAD", "CLEAR", "CREATE", "DROP", "COPY", "MOVE", "ADD",
];

/// How a query is carried to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    /// `GET` with the query in the URL.
    #[default]
    Get,
    /// `POST` with a URL-encoded form body.
    PostForm,
    /// `POST` with the raw query as an `application/sparql-query` body.
    PostDirect,
}

impl FromStr for RequestMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" | "post-form" => Ok(Self::PostForm),
            "post-direct" => Ok(Self::PostDirect),
            _ => Err(Error::InvalidConfig {
                reason: format!("unknown request method `{s}`"),
            }),
        }
    }
}

/// A SPARQL 1.1 protocol query service.
#[derive(Debug, Clone)]
pub struct SparqlEndpoint {
    url: String,
    method: RequestMethod,
    user_agent: String,
    format: ReturnFormat,
    headers: Vec<(String, String)>,
    url_params: Vec<(String, String)>,
}

impl SparqlEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            format: ReturnFormat::default(),
            headers: Vec::new(),
            url_params: Vec::new(),
        }
    }

    pub fn wikidata() -> Self {
        Self::new(WIKIDATA_SPARQL)
    }

    #[must_use]
    pub fn method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the format results are requested in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any format without a decoder,
    /// which today is everything but JSON.
    pub fn return_format(mut self, format: ReturnFormat) -> Result<Self> {
        format.decoder()?;
        self.format = format;
        Ok(self)
    }

    /// Adds a header sent after the standard ones.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a parameter sent with every query, such as a default graph.
    #[must_use]
    pub fn url_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.url_params.push((name.into(), value.into()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub const fn format(&self) -> ReturnFormat {
        self.format
    }

    pub const fn request_method(&self) -> RequestMethod {
        self.method
    }

    fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.url_params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl Endpoint for SparqlEndpoint {
    fn request(&self, query: &Query) -> Result<HttpRequest> {
        let text = query.as_str();
        if let Some(keyword) = update_keyword(text) {
            return Err(Error::UnsupportedOperation {
                reason: format!("SPARQL update `{keyword}` cannot be sent to a query service"),
            });
        }

        let request = match self.method {
            RequestMethod::Get => HttpRequest::get(with_query_string(
                &self.url,
                self.params().chain([("query", text)]),
            )),
            RequestMethod::PostForm => {
                let body = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(self.params().chain([("query", text)]))
                    .finish();
                HttpRequest::post(self.url.as_str(), body)
                    .header("Content-Type", "application/x-www-form-urlencoded")
            }
            RequestMethod::PostDirect => {
                HttpRequest::post(with_query_string(&self.url, self.params()), text.to_string())
                    .header("Content-Type", "application/sparql-query")
            }
        };

        let mut request = request
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", self.format.media_type());
        request.headers.extend(self.headers.iter().cloned());
        Ok(request)
    }
}

/// The update keyword a request starts with, if any.
///
/// `PREFIX` and `BASE` declarations and `#` comments are skipped. Each
/// declaration ends at the `>` closing its IRI, whether or not whitespace
/// separates it from the prefix name. A `#` inside `<...>` is part of an
/// IRI, not a comment.
fn update_keyword(query: &str) -> Option<&'static str> {
    let stripped = strip_comments(query);
    let mut rest = stripped.as_str();

    loop {
        rest = rest.trim_start();
        let end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let word = &rest[..end];

        if word.eq_ignore_ascii_case("PREFIX") || word.eq_ignore_ascii_case("BASE") {
            let (_, after_iri) = rest.split_once('>')?;
            rest = after_iri;
        } else {
            return UPDATE_KEYWORDS
                .into_iter()
                .find(|keyword| word.eq_ignore_ascii_case(keyword));
        }
    }
}

fn strip_comments(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut in_iri = false;
    let mut in_comment = false;

    for ch in query.chars() {
        match ch {
            '\n' if in_comment => {
                in_comment = false;
                out.push(ch);
            }
            _ if in_comment => {}
            '#' if !in_iri => in_comment = true,
            '<' => {
                in_iri = true;
                out.push(ch);
            }
            '>' => {
                in_iri = false;
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
