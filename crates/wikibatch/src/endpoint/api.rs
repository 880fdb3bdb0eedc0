use super::{DEFAULT_USER_AGENT, Endpoint, with_query_string};
use crate::{error::Result, query::Query, transport::HttpRequest};

/// The public Wikidata action API.
pub const WIKIDATA_API: &str = "https://www.wikidata.org/w/api.php";

/// A MediaWiki-style action API reached with `GET` requests.
///
/// Every query parameter becomes a URL parameter; list values are joined
/// with the query's separator.
#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    base_url: String,
    user_agent: String,
}

impl ApiEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn wikidata() -> Self {
        Self::new(WIKIDATA_API)
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Endpoint for ApiEndpoint {
    fn request(&self, query: &Query) -> Result<HttpRequest> {
        let pairs: Vec<(&str, String)> = query
            .params()
            .iter()
            .map(|(name, value)| (name, value.values().join(query.separator())))
            .collect();
        let uri = with_query_string(
            &self.base_url,
            pairs.iter().map(|(name, value)| (*name, value.as_str())),
        );

        Ok(HttpRequest::get(uri).header("User-Agent", self.user_agent.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_become_url_parameters() {
        let query = Query::builder("action={action}&ids={ids}&format={format}")
            .separator("|")
            .param("action", "wbgetentities")
            .param("ids", vec!["Q1", "Q42"])
            .param("format", "json")
            .build()
            .unwrap();
        let request = ApiEndpoint::new("http://localhost/w/api.php")
            .user_agent("tests/1.0")
            .request(&query)
            .unwrap();

        assert_eq!(
            request.uri,
            "http://localhost/w/api.php?action=wbgetentities&ids=Q1%7CQ42&format=json"
        );
        assert_eq!(request.header_value("User-Agent"), Some("tests/1.0"));
        assert!(request.body.is_none());
    }
}
