//! The text projection of a listing used for embedding and search output.

use crate::listing::ListingRecord;
use uuid::Uuid;

impl ListingRecord {
    /// Render the record as its search document.
    ///
    /// The text is derived on demand and never stored on the record.
    pub fn search_document(&self) -> String {
        [
            "Property listing.".to_string(),
            format!("Title: {}.", self.title),
            format!("This property has {} rooms.", self.rooms),
            format!("Current status: {}.", self.status),
            format!("Located at {}.", self.address),
            format!("Description: {}.", self.description),
            format!("Nearby schools include: {}.", self.nearby_schools.join(", ")),
            format!("Listed by agent: {}.", self.agent_name),
        ]
        .join("\n")
    }
}

/// A ranked search match.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingHit {
    pub id: Uuid,
    /// Search document of the matched listing.
    pub document: String,
    /// Cosine similarity to the query.
    pub score: f32,
}
