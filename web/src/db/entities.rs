use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::Facility;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoomType {
    pub name: String,
    pub size: String,
    pub price: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Program {
    pub name: String,
    pub schedule: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Review {
    pub author: String,
    /// 1 to 5
    pub rating: u8,
    pub date: NaiveDate,
    pub content: String,
}

/// Everything the detail page shows about one facility.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FacilityDetail {
    #[serde(flatten)]
    pub facility: Facility,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub opening_hours: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub rooms: Vec<RoomType>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl FacilityDetail {
    /// A detail record with nothing beyond the listing fields.
    pub fn bare(facility: Facility) -> Self {
        Self {
            facility,
            address: None,
            contact: None,
            opening_hours: None,
            website: None,
            rooms: Vec::new(),
            programs: Vec::new(),
            reviews: Vec::new(),
        }
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(total) / self.reviews.len() as f64)
    }
}
