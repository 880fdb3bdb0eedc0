use crate::{
    dispatcher::{Dispatcher, DispatcherConfig},
    endpoint::ApiEndpoint,
    error::{Error, Result},
    format::ReturnFormat,
    query::{Params, Query, SplitSpec},
    transport::Transport,
    wikidata::{Entity, RawEntity, is_entity_id},
};
use core::fmt;
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use serde_json::Value;

/// Ids sent per `wbgetentities` request unless configured otherwise.
pub const DEFAULT_MAX_VALUES: usize = 50;

const ACTION: &str = "wbgetentities";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Most ids sent in one request. Must be non-zero.
    pub max_values: usize,
    pub dispatcher: DispatcherConfig,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            max_values: DEFAULT_MAX_VALUES,
            dispatcher: DispatcherConfig::default(),
        }
    }
}

/// Fetches entities from a linked-data API, any number of ids at a time.
pub struct ApiClient<T> {
    dispatcher: Dispatcher<ApiEndpoint, T>,
    config: ApiClientConfig,
}

impl<T: Transport> ApiClient<T> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `max_values` is zero or the
    /// dispatcher config does not validate.
    pub fn new(endpoint: ApiEndpoint, transport: T, config: ApiClientConfig) -> Result<Self> {
        if config.max_values == 0 {
            return Err(Error::InvalidConfig {
                reason: "max_values must be at least 1".to_string(),
            });
        }
        Ok(Self {
            dispatcher: Dispatcher::new(endpoint, transport, config.dispatcher)?,
            config,
        })
    }

    pub const fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    pub const fn dispatcher(&self) -> &Dispatcher<ApiEndpoint, T> {
        &self.dispatcher
    }

    /// Looks up `ids`, `max_values` per request, and decodes every entity.
    ///
    /// `extra` parameters (`languages`, `props`, ...) are sent with every
    /// request; list values are joined with `|`. Entities come back in
    /// request order, then in the order each response lists them. Ids the
    /// API reports as missing are skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFormat`] unless `format` names JSON, in any
    ///   case. The request always carries `format=json`.
    /// - [`Error::Api`] if any response carries an `error` object.
    /// - [`Error::UnrecognizedEntity`] for a response key that is not an
    ///   item or property id.
    /// - Dispatch and decode errors.
    pub async fn get_entities(
        &mut self,
        ids: &[String],
        format: &str,
        extra: Params,
    ) -> Result<Vec<Entity>> {
        if format.parse::<ReturnFormat>()? != ReturnFormat::Json {
            return Err(Error::UnsupportedFormat {
                format: format.to_string(),
            });
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = extra
            .with("action", ACTION)
            .with("format", ReturnFormat::Json.as_str())
            .with("ids", ids.to_vec());

        let spec = SplitSpec::new("ids")
            .chunk_size(self.config.max_values)
            .prefix("")
            .separator("|")
            .name(ACTION);
        let template = api_template(&params);
        let batch = Query::split_by_values(&template, &spec, params)?;

        let pairs = self.dispatcher.execute(&batch).await?;

        let mut entities = Vec::new();
        for (_query, payload) in &pairs {
            let response: ApiResponse = serde_json::from_slice(payload)?;
            if let Some(error) = response.error {
                return Err(Error::Api {
                    code: error.code,
                    info: error.info,
                });
            }

            for (id, value) in response.entities.0 {
                if !is_entity_id(&id) {
                    return Err(Error::UnrecognizedEntity { id });
                }
                let raw: RawEntity = serde_json::from_value(value)?;
                if raw.is_missing() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(id = %raw.id, query = _query.name(), "Entity is missing");
                    continue;
                }
                entities.push(raw.decode()?);
            }
        }

        Ok(entities)
    }
}

#[cfg(feature = "http")]
impl ApiClient<crate::transport::HyperTransport> {
    /// A client over a pooled HTTPS transport.
    ///
    /// # Errors
    ///
    /// Fails if the native root certificates cannot be loaded or `config`
    /// does not validate.
    pub fn with_http(endpoint: ApiEndpoint, config: ApiClientConfig) -> Result<Self> {
        Self::new(endpoint, crate::transport::HyperTransport::new()?, config)
    }
}

/// `name={name}&...` over every parameter, so the rendered query is a
/// stable identity for the request.
fn api_template(params: &Params) -> String {
    params
        .iter()
        .map(|(name, _)| format!("{name}={{{name}}}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    entities: OrderedEntities,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

/// The `entities` object with its keys in document order.
#[derive(Default)]
struct OrderedEntities(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        struct EntitiesVisitor;

        impl<'de> Visitor<'de> for EntitiesVisitor {
            type Value = OrderedEntities;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of entity ids to entities")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> core::result::Result<OrderedEntities, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntities(entries))
            }
        }

        deserializer.deserialize_map(EntitiesVisitor)
    }
}
