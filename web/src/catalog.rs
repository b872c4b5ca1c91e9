//! Fixed choices offered by the navigation and the filter panel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityType {
    SilverTown,
    NursingHome,
    ElderlyHome,
}

impl FacilityType {
    pub const ALL: [FacilityType; 3] = [
        FacilityType::SilverTown,
        FacilityType::NursingHome,
        FacilityType::ElderlyHome,
    ];

    /// Route segment, e.g. `/facilities/silver-town`.
    pub fn slug(self) -> &'static str {
        match self {
            FacilityType::SilverTown => "silver-town",
            FacilityType::NursingHome => "nursing-home",
            FacilityType::ElderlyHome => "elderly-home",
        }
    }

    /// Label stored in `Facility::types`.
    pub fn label(self) -> &'static str {
        match self {
            FacilityType::SilverTown => "실버타운",
            FacilityType::NursingHome => "요양원",
            FacilityType::ElderlyHome => "양로원",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FacilityType::SilverTown => "독립적인 생활이 가능한 노인을 위한 주거 시설",
            FacilityType::NursingHome => "전문적인 간호 서비스가 제공되는 요양 시설",
            FacilityType::ElderlyHome => "일상생활 지원이 필요한 노인을 위한 주거 시설",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FacilityType {
    type Err = String;

    /// Accepts either the route slug or the Korean label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.slug() == s || t.label() == s)
            .ok_or_else(|| format!("unknown facility type: {s}"))
    }
}

/// Category tabs on the home page: everything, or one facility type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeCategory {
    #[default]
    All,
    Only(FacilityType),
}

impl HomeCategory {
    pub const ALL_LABEL: &'static str = "전체";

    pub fn parse(label: &str) -> Option<Self> {
        if label == Self::ALL_LABEL {
            Some(HomeCategory::All)
        } else {
            FacilityType::from_label(label).map(HomeCategory::Only)
        }
    }

    pub fn type_filter(self) -> Option<&'static str> {
        match self {
            HomeCategory::All => None,
            HomeCategory::Only(t) => Some(t.label()),
        }
    }
}

pub const REGIONS: [(&str, &[&str]); 3] = [
    ("서울", &["강남구", "서초구"]),
    ("경기", &["고양시", "성남시", "용인시"]),
    ("인천", &["연수구"]),
];

pub fn regions() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(region, _)| *region)
}

/// Districts selectable once `region` is chosen; empty for unknown regions.
pub fn districts(region: &str) -> &'static [&'static str] {
    REGIONS
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, districts)| *districts)
        .unwrap_or(&[])
}

/// Amenity checkboxes in display order.
pub const AMENITIES: [&str; 17] = [
    "수영장", "헬스장", "도서관", "정원", "의료실", "카페", "영화관", "사우나", "텃밭",
    "산책로", "식당", "물리치료실", "작업치료실", "언어치료실", "수치료실", "문화센터", "취미실",
];

pub fn amenities() -> &'static [&'static str] {
    &AMENITIES
}
