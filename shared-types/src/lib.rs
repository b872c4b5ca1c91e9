use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One eldercare listing as it appears in search results.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Facility {
    pub id: u32,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub position: Position,
}

impl Facility {
    pub fn has_type(&self, label: &str) -> bool {
        self.types.iter().any(|t| t == label)
    }
}

/// Snapshot of a facility taken when it was favorited. Later edits to the
/// facility do not flow into it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FavoriteEntry {
    pub id: u32,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub price: String,
    #[serde(default)]
    pub image: String,
    pub position: Position,
}

impl From<&Facility> for FavoriteEntry {
    fn from(facility: &Facility) -> Self {
        Self {
            id: facility.id,
            title: facility.title.clone(),
            location: facility.location.clone(),
            types: facility.types.clone(),
            price: facility.price.clone(),
            image: facility.image.clone(),
            position: facility.position,
        }
    }
}

/// The signed-in principal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facility_reads_type_field() {
        let raw = r#"{
            "id": 1,
            "title": "행복한 실버타운",
            "location": "서울시 강남구 역삼동",
            "type": ["실버타운"],
            "price": "월 150만원~",
            "position": { "lat": 37.5012, "lng": 127.0396 }
        }"#;

        let facility: Facility = serde_json::from_str(raw).unwrap();
        assert!(facility.has_type("실버타운"));
        assert!(facility.amenities.is_empty());
        assert_eq!(facility.description, "");
    }

    #[test]
    fn favorite_snapshot_is_detached() {
        let mut facility = Facility {
            id: 7,
            title: "Before".to_string(),
            location: "서울시".to_string(),
            types: vec!["요양원".to_string()],
            price: "월 100만원~".to_string(),
            image: String::new(),
            description: String::new(),
            amenities: vec![],
            position: Position::new(37.0, 127.0),
        };
        let entry = FavoriteEntry::from(&facility);
        facility.title = "After".to_string();

        assert_eq!(entry.title, "Before");
        assert_eq!(entry.id, 7);
    }

    #[test]
    fn session_without_phone_omits_field() {
        let session = UserSession {
            id: "kakao_user123".to_string(),
            username: "kakaoUser".to_string(),
            email: "kakao@example.com".to_string(),
            phone: None,
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("phone"));
        let back: UserSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
