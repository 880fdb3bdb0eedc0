use super::DataValue;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A statement's main value and its qualifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claim {
    pub value: DataValue,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub qualifiers: BTreeMap<String, Vec<DataValue>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStatement {
    mainsnak: RawSnak,
    #[serde(default)]
    qualifiers: BTreeMap<String, Vec<RawSnak>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSnak {
    snaktype: String,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(default)]
    datavalue: Option<RawDataValue>,
}

#[derive(Debug, Deserialize)]
struct RawDataValue {
    value: Value,
}

impl RawSnak {
    fn decode(self) -> Result<DataValue> {
        match (self.snaktype.as_str(), self.datavalue) {
            ("novalue", _) => Ok(DataValue::NoValue),
            ("somevalue", _) | (_, None) => Ok(DataValue::UnknownValue),
            (_, Some(datavalue)) => DataValue::decode(
                self.datatype.as_deref().unwrap_or_default(),
                datavalue.value,
            ),
        }
    }
}

impl TryFrom<RawStatement> for Claim {
    type Error = crate::error::Error;

    fn try_from(raw: RawStatement) -> Result<Self> {
        let value = raw.mainsnak.decode()?;
        let qualifiers = raw
            .qualifiers
            .into_iter()
            .map(|(pid, snaks)| -> Result<(String, Vec<DataValue>)> {
                let values = snaks
                    .into_iter()
                    .map(RawSnak::decode)
                    .collect::<Result<Vec<_>>>()?;
                Ok((pid, values))
            })
            .collect::<Result<_>>()?;

        Ok(Self { value, qualifiers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claim(statement: Value) -> Claim {
        let raw: RawStatement = serde_json::from_value(statement).unwrap();
        Claim::try_from(raw).unwrap()
    }

    #[test]
    fn decodes_main_value_and_qualifiers() {
        let claim = claim(json!({
            "mainsnak": {
                "snaktype": "value",
                "property": "P69",
                "datatype": "wikibase-item",
                "datavalue": {
                    "value": {"entity-type": "item", "numeric-id": 691283, "id": "Q691283"},
                    "type": "wikibase-entityid"
                }
            },
            "qualifiers": {
                "P512": [{
                    "snaktype": "value",
                    "property": "P512",
                    "datatype": "wikibase-item",
                    "datavalue": {
                        "value": {"entity-type": "item", "numeric-id": 1765120, "id": "Q1765120"},
                        "type": "wikibase-entityid"
                    }
                }],
                "P580": [{"snaktype": "somevalue", "property": "P580", "datatype": "time"}]
            }
        }));

        assert_eq!(claim.value, DataValue::Item("Q691283".to_string()));
        assert_eq!(
            claim.qualifiers["P512"],
            [DataValue::Item("Q1765120".to_string())]
        );
        assert_eq!(claim.qualifiers["P580"], [DataValue::UnknownValue]);
    }

    #[test]
    fn special_snaks() {
        let no_value = claim(json!({
            "mainsnak": {"snaktype": "novalue", "property": "P40", "datatype": "wikibase-item"}
        }));
        assert_eq!(no_value.value, DataValue::NoValue);
        assert!(no_value.qualifiers.is_empty());

        let missing = claim(json!({
            "mainsnak": {"snaktype": "value", "property": "P18", "datatype": "commonsMedia"}
        }));
        assert_eq!(missing.value, DataValue::UnknownValue);
    }
}
