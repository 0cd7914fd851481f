//! Listing records and the scraped input they are built from.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scraped listing page, as written by the ingestion pipeline.
///
/// Every field may be absent because a page can miss any selector.
/// PascalCase keys are accepted so files produced by other tools load as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    #[serde(default, alias = "Rooms")]
    pub rooms: Option<String>,
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "NearbySchools")]
    pub nearby_schools: Option<Vec<String>>,
    #[serde(default, alias = "AgentName")]
    pub agent_name: Option<String>,
    #[serde(default, alias = "Address")]
    pub address: Option<String>,
}

impl ListingDetail {
    /// Parse a JSON array of listings.
    pub fn parse_many(json: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(json)
    }
}

/// A stored listing. Records are immutable once created and are owned by
/// the `ListingStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: Uuid,
    pub title: String,
    pub rooms: String,
    pub status: String,
    pub description: String,
    pub nearby_schools: Vec<String>,
    pub agent_name: String,
    pub address: String,
}

impl ListingRecord {
    /// Build a record with a freshly generated id.
    pub fn from_detail(detail: ListingDetail) -> Self {
        Self::with_id(Uuid::new_v4(), detail)
    }

    pub fn with_id(id: Uuid, detail: ListingDetail) -> Self {
        Self {
            id,
            title: detail.title.unwrap_or_default(),
            rooms: detail.rooms.unwrap_or_default(),
            status: detail.status.unwrap_or_default(),
            description: detail.description.unwrap_or_default(),
            nearby_schools: detail.nearby_schools.unwrap_or_default(),
            agent_name: detail.agent_name.unwrap_or_default(),
            address: detail.address.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_and_pascal_case_keys() {
        let json = r#"[
            {"title": "Flat A", "rooms": "3", "nearbySchools": ["Elm Primary"], "agentName": "Jane"},
            {"Title": "House B", "Rooms": "4", "NearbySchools": [], "AgentName": "Omar", "Address": "2 High St"}
        ]"#;
        let listings = ListingDetail::parse_many(json).unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].nearby_schools.as_deref(), Some(&["Elm Primary".to_string()][..]));
        assert_eq!(listings[1].title.as_deref(), Some("House B"));
        assert_eq!(listings[1].address.as_deref(), Some("2 High St"));
    }

    #[test]
    fn missing_fields_become_empty() {
        let detail: ListingDetail = serde_json::from_str(r#"{"title": null}"#).unwrap();
        let record = ListingRecord::from_detail(detail);

        assert_eq!(record.title, "");
        assert!(record.nearby_schools.is_empty());
    }

    #[test]
    fn each_record_gets_its_own_id() {
        let a = ListingRecord::from_detail(ListingDetail::default());
        let b = ListingRecord::from_detail(ListingDetail::default());
        assert_ne!(a.id, b.id);
    }
}
