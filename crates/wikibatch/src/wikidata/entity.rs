use super::{Claim, claim::RawStatement};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text in one language: labels, descriptions, aliases, and
/// `monolingualtext` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monolingual {
    pub language: String,
    #[serde(alias = "text")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLink {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An item or property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: String,
    pub labels: BTreeMap<String, Monolingual>,
    pub descriptions: BTreeMap<String, Monolingual>,
    pub aliases: BTreeMap<String, Vec<Monolingual>>,
    pub claims: BTreeMap<String, Vec<Claim>>,
    /// Links to Wikipedia editions only; other sites are dropped.
    pub sitelinks: BTreeMap<String, SiteLink>,
}

impl Entity {
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(|l| l.value.as_str())
    }

    pub fn description(&self, language: &str) -> Option<&str> {
        self.descriptions.get(language).map(|d| d.value.as_str())
    }

    pub fn claims(&self, property: &str) -> &[Claim] {
        self.claims
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// An entity as the API sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEntity {
    pub id: String,
    #[serde(default)]
    missing: Option<String>,
    #[serde(default)]
    labels: BTreeMap<String, Monolingual>,
    #[serde(default)]
    descriptions: BTreeMap<String, Monolingual>,
    #[serde(default)]
    aliases: BTreeMap<String, Vec<Monolingual>>,
    #[serde(default)]
    claims: BTreeMap<String, Vec<RawStatement>>,
    #[serde(default)]
    sitelinks: BTreeMap<String, SiteLink>,
}

impl RawEntity {
    /// The API returns a stub marked `missing` for ids that do not exist.
    pub fn is_missing(&self) -> bool {
        self.missing.is_some()
    }

    pub fn decode(self) -> Result<Entity> {
        let claims = self
            .claims
            .into_iter()
            .map(|(pid, statements)| -> Result<(String, Vec<Claim>)> {
                let claims = statements
                    .into_iter()
                    .map(Claim::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok((pid, claims))
            })
            .collect::<Result<_>>()?;

        let sitelinks = self
            .sitelinks
            .into_iter()
            .filter(|(site, _)| site.ends_with("wiki"))
            .collect();

        Ok(Entity {
            id: self.id,
            labels: self.labels,
            descriptions: self.descriptions,
            aliases: self.aliases,
            claims,
            sitelinks,
        })
    }
}
