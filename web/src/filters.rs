use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared_types::Facility;
use thiserror::Error;

// ASCII only; full-width digits are not prices
static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Monthly price brackets, in units of 만원 (10,000 KRW).
///
/// Adjacent brackets share their boundary: a facility at exactly 200 matches
/// both `From100To200` and `From200To300`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PriceRange {
    UpTo100,
    From100To200,
    From200To300,
    From300,
}

impl PriceRange {
    pub const ALL: [PriceRange; 4] = [
        PriceRange::UpTo100,
        PriceRange::From100To200,
        PriceRange::From200To300,
        PriceRange::From300,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PriceRange::UpTo100 => "100만원 이하",
            PriceRange::From100To200 => "100-200만원",
            PriceRange::From200To300 => "200-300만원",
            PriceRange::From300 => "300만원 이상",
        }
    }

    pub fn contains(self, price: u64) -> bool {
        match self {
            PriceRange::UpTo100 => price <= 100,
            PriceRange::From100To200 => (100..=200).contains(&price),
            PriceRange::From200To300 => (200..=300).contains(&price),
            PriceRange::From300 => price >= 300,
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown price range: {0}")]
pub struct UnknownPriceRange(pub String);

impl FromStr for PriceRange {
    type Err = UnknownPriceRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '–' || c == '~' { '-' } else { c })
            .collect();
        let compact = compact.trim_end_matches("만원");

        match compact {
            "100만원이하" | "≤100" | "<=100" => Ok(PriceRange::UpTo100),
            "100-200" => Ok(PriceRange::From100To200),
            "200-300" => Ok(PriceRange::From200To300),
            "300만원이상" | "≥300" | ">=300" => Ok(PriceRange::From300),
            _ => Err(UnknownPriceRange(s.to_string())),
        }
    }
}

impl TryFrom<String> for PriceRange {
    type Error = UnknownPriceRange;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PriceRange> for String {
    fn from(range: PriceRange) -> Self {
        range.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Care needs collected by the extended search form.
///
/// Facilities carry nothing to compare these against yet, so they ride along
/// in [`FilterCriteria`] without narrowing results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareProfile {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub mobility_level: Option<String>,
    pub care_level: Option<String>,
    #[serde(default)]
    pub diseases: Vec<String>,
    #[serde(default)]
    pub medication_management: bool,
    #[serde(default)]
    pub meal_management: bool,
}

/// The user's current filter selection. Empty fields accept everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub region: Option<String>,
    pub district: Option<String>,
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub care_profile: Option<CareProfile>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selecting a region resets the district, whose choices depend on it.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = non_empty(region.into());
        self.district = None;
        self
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = non_empty(district.into());
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    /// Adds the amenity if missing, removes it otherwise (checkbox behaviour).
    pub fn toggle_amenity(mut self, amenity: &str) -> Self {
        if let Some(idx) = self.amenities.iter().position(|a| a == amenity) {
            self.amenities.remove(idx);
        } else {
            self.amenities.push(amenity.to_string());
        }
        self
    }

    pub fn with_care_profile(mut self, profile: CareProfile) -> Self {
        self.care_profile = Some(profile);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none()
            && self.district.is_none()
            && self.price_range.is_none()
            && self.amenities.is_empty()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// First run of digits in a price string such as `"월 150만원~"`.
pub fn extract_price(price: &str) -> Option<u64> {
    FIRST_NUMBER
        .find(price)
        .and_then(|m| m.as_str().parse().ok())
}

/// Does `facility` satisfy every active rule in `criteria`?
pub fn matches(facility: &Facility, criteria: &FilterCriteria) -> bool {
    if let Some(region) = &criteria.region {
        if !facility.location.contains(region.as_str()) {
            return false;
        }
    }

    if let Some(district) = &criteria.district {
        if !facility.location.contains(district.as_str()) {
            return false;
        }
    }

    if let Some(range) = criteria.price_range {
        // unparseable prices are let through
        if let Some(price) = extract_price(&facility.price) {
            if !range.contains(price) {
                return false;
            }
        }
    }

    criteria
        .amenities
        .iter()
        .all(|required| facility.amenities.iter().any(|a| a == required))
}

/// Case-insensitive match against title, location or description. Only the
/// empty string disables the search; whitespace is searched for literally.
pub fn matches_search_term(facility: &Facility, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let needle = term.to_lowercase();
    [&facility.title, &facility.location, &facility.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Position;

    fn facility(price: &str, amenities: &[&str]) -> Facility {
        Facility {
            id: 1,
            title: "행복한 실버타운".to_string(),
            location: "서울시 강남구 역삼동".to_string(),
            types: vec!["실버타운".to_string()],
            price: price.to_string(),
            image: String::new(),
            description: "Premium Silver Town with 24h medical care".to_string(),
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
            position: Position::new(37.5012, 127.0396),
        }
    }

    #[test]
    fn empty_criteria_accept_everything() {
        let criteria = FilterCriteria::new();
        assert!(criteria.is_empty());
        assert!(matches(&facility("월 150만원~", &[]), &criteria));
        assert!(matches(&facility("상담 문의", &["정원"]), &criteria));
    }

    #[test]
    fn region_and_district_are_substring_rules() {
        let f = facility("월 150만원~", &[]);

        assert!(matches(&f, &FilterCriteria::new().with_region("서울")));
        assert!(!matches(&f, &FilterCriteria::new().with_region("경기")));

        let criteria = FilterCriteria::new().with_region("서울").with_district("강남구");
        assert!(matches(&f, &criteria));
        let criteria = FilterCriteria::new().with_region("서울").with_district("서초구");
        assert!(!matches(&f, &criteria));
    }

    #[test]
    fn changing_region_clears_district() {
        let criteria = FilterCriteria::new()
            .with_region("서울")
            .with_district("강남구")
            .with_region("경기");
        assert_eq!(criteria.region.as_deref(), Some("경기"));
        assert_eq!(criteria.district, None);
    }

    #[test]
    fn boundary_prices_match_both_brackets() {
        let f = facility("월 200만원", &[]);
        let low = FilterCriteria::new().with_price_range(PriceRange::From100To200);
        let high = FilterCriteria::new().with_price_range(PriceRange::From200To300);
        assert!(matches(&f, &low));
        assert!(matches(&f, &high));

        assert!(PriceRange::UpTo100.contains(100));
        assert!(PriceRange::From100To200.contains(100));
        assert!(PriceRange::From200To300.contains(300));
        assert!(PriceRange::From300.contains(300));
        assert!(!PriceRange::From300.contains(299));
    }

    #[test]
    fn price_outside_bracket_is_rejected() {
        let f = facility("월 150만원~", &[]);
        assert!(!matches(&f, &FilterCriteria::new().with_price_range(PriceRange::From300)));
        assert!(!matches(&f, &FilterCriteria::new().with_price_range(PriceRange::UpTo100)));
    }

    #[test]
    fn price_without_number_is_lenient() {
        let f = facility("가격 문의", &[]);
        for range in PriceRange::ALL {
            assert!(matches(&f, &FilterCriteria::new().with_price_range(range)));
        }
        // too large to parse counts as no number
        let huge = facility("월 99999999999999999999999만원", &[]);
        assert!(matches(&huge, &FilterCriteria::new().with_price_range(PriceRange::UpTo100)));
    }

    #[test]
    fn extract_price_takes_first_number() {
        assert_eq!(extract_price("월 150만원~"), Some(150));
        assert_eq!(extract_price("보증금 3000, 월 120"), Some(3000));
        assert_eq!(extract_price("문의"), None);
    }

    #[test]
    fn amenities_require_all_labels() {
        let f = facility("월 150만원~", &["수영장", "헬스장", "정원"]);
        assert!(matches(&f, &FilterCriteria::new().with_amenities(["수영장", "정원"])));
        assert!(!matches(&f, &FilterCriteria::new().with_amenities(["수영장", "사우나"])));
    }

    #[test]
    fn toggle_amenity_adds_then_removes() {
        let criteria = FilterCriteria::new().toggle_amenity("정원");
        assert_eq!(criteria.amenities, vec!["정원".to_string()]);
        let criteria = criteria.toggle_amenity("정원");
        assert!(criteria.amenities.is_empty());
    }

    #[test]
    fn care_profile_does_not_narrow_results() {
        let profile = CareProfile {
            name: Some("홍길동".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1940, 5, 1),
            gender: Some(Gender::Male),
            mobility_level: Some("wheelchair".to_string()),
            care_level: Some("3등급".to_string()),
            diseases: vec!["치매".to_string()],
            medication_management: true,
            meal_management: true,
        };
        let criteria = FilterCriteria::new().with_care_profile(profile);
        assert!(matches(&facility("월 150만원~", &[]), &criteria));
    }

    #[test]
    fn search_term_is_case_insensitive_across_fields() {
        let f = facility("월 150만원~", &[]);
        assert!(matches_search_term(&f, "강남"));
        assert!(matches_search_term(&f, "행복한"));
        assert!(matches_search_term(&f, "silver town"));
        assert!(!matches_search_term(&f, "인천"));
    }

    #[test]
    fn blank_search_term_is_still_a_search() {
        let f = facility("월 150만원~", &[]);
        assert!(matches_search_term(&f, ""));
        assert!(!matches_search_term(&f, "   "));
        assert!(matches_search_term(&f, " "));
    }

    #[test]
    fn unknown_price_range_names_the_input() {
        let err = "500-600".parse::<PriceRange>().unwrap_err();
        assert_eq!(err, UnknownPriceRange("500-600".to_string()));
        assert_eq!(err.to_string(), "unknown price range: 500-600");
    }

    #[test]
    fn full_width_digits_are_skipped() {
        assert_eq!(extract_price("월 １５０만원 (할인 350)"), Some(350));
        assert_eq!(extract_price("월 １５０만원"), None);

        let f = facility("월 １５０만원 (할인 350)", &[]);
        let cheap = FilterCriteria::new().with_price_range(PriceRange::UpTo100);
        let premium = FilterCriteria::new().with_price_range(PriceRange::From300);
        assert!(!matches(&f, &cheap));
        assert!(matches(&f, &premium));
    }

    #[test]
    fn price_range_parses_labels_and_compact_forms() {
        assert_eq!("100-200만원".parse::<PriceRange>(), Ok(PriceRange::From100To200));
        assert_eq!("100–200".parse::<PriceRange>(), Ok(PriceRange::From100To200));
        assert_eq!("≤100".parse::<PriceRange>(), Ok(PriceRange::UpTo100));
        assert_eq!("100만원 이하".parse::<PriceRange>(), Ok(PriceRange::UpTo100));
        assert_eq!("300만원 이상".parse::<PriceRange>(), Ok(PriceRange::From300));
        assert_eq!("≥300".parse::<PriceRange>(), Ok(PriceRange::From300));
        assert!("50-60".parse::<PriceRange>().is_err());

        let json = serde_json::to_string(&PriceRange::From200To300).unwrap();
        assert_eq!(json, "\"200-300만원\"");
    }
}
