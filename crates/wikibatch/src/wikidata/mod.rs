//! Typed entities decoded from the linked-data API.
//!
//! Snak values are dispatched by their `datatype` tag through a decoder
//! table built on first use. Datatypes without a decoder are kept as
//! [`DataValue::Unsupported`] rather than failing the whole entity.

mod claim;
mod datavalue;
mod entity;

pub use claim::Claim;
pub use datavalue::{CommonsMedia, DataValue, GlobeCoordinate, Quantity, Time, TimeParts};
pub use entity::{Entity, Monolingual, SiteLink};

pub(crate) use entity::RawEntity;

/// Whether `id` names an item (`Q…`) or a property (`P…`).
pub fn is_entity_id(id: &str) -> bool {
    match id.strip_prefix(['P', 'Q']) {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids() {
        assert!(is_entity_id("Q42"));
        assert!(is_entity_id("P31"));
        assert!(!is_entity_id("L1"));
        assert!(!is_entity_id("Q"));
        assert!(!is_entity_id("Q4a"));
        assert!(!is_entity_id("q42"));
    }
}
