use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{Facility, Position};
use tracing::debug;

use super::entities::{FacilityDetail, Program, Review, RoomType};
use crate::error::RepositoryError;

type RepoResult<T> = Result<T, RepositoryError>;

/// Source of facility listings. The app only talks to this trait, so a
/// network-backed implementation can replace the mock without touching the
/// listing or favorites code.
#[async_trait]
pub trait FacilityRepository: Send + Sync {
    async fn list_facilities(&self) -> RepoResult<Vec<Facility>>;

    async fn facility_detail(&self, id: u32) -> RepoResult<Option<FacilityDetail>>;

    /// First `limit` facilities, for the home page cards.
    async fn recommended(&self, limit: usize) -> RepoResult<Vec<Facility>> {
        let mut facilities = self.list_facilities().await?;
        facilities.truncate(limit);
        Ok(facilities)
    }
}

/// The built-in demo dataset.
#[derive(Debug, Clone)]
pub struct MockFacilityRepository {
    details: Vec<FacilityDetail>,
}

impl Default for MockFacilityRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFacilityRepository {
    pub fn new() -> Self {
        let details = seed_facilities()
            .into_iter()
            .map(|facility| match facility.id {
                1 => happy_silver_town_detail(facility),
                _ => FacilityDetail::bare(facility),
            })
            .collect();
        Self { details }
    }
}

#[async_trait]
impl FacilityRepository for MockFacilityRepository {
    async fn list_facilities(&self) -> RepoResult<Vec<Facility>> {
        Ok(self.details.iter().map(|d| d.facility.clone()).collect())
    }

    async fn facility_detail(&self, id: u32) -> RepoResult<Option<FacilityDetail>> {
        Ok(self.details.iter().find(|d| d.facility.id == id).cloned())
    }
}

/// Facilities loaded once from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFacilityRepository {
    facilities: Vec<Facility>,
}

impl JsonFacilityRepository {
    pub fn load(path: impl AsRef<Path>) -> RepoResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let facilities = Self::parse(&raw)?;
        debug!(
            "Loaded {} facilities from {}",
            facilities.len(),
            path.as_ref().display()
        );
        Ok(Self { facilities })
    }

    /// Decodes a dataset, rejecting repeated ids and records without a type.
    pub fn parse(raw: &str) -> RepoResult<Vec<Facility>> {
        let facilities: Vec<Facility> = serde_json::from_str(raw)?;

        let mut seen = HashSet::with_capacity(facilities.len());
        for facility in &facilities {
            if !seen.insert(facility.id) {
                return Err(RepositoryError::Invalid(format!(
                    "duplicate facility id {}",
                    facility.id
                )));
            }
            if facility.types.is_empty() {
                return Err(RepositoryError::Invalid(format!(
                    "facility {} has no type",
                    facility.id
                )));
            }
        }
        Ok(facilities)
    }
}

#[async_trait]
impl FacilityRepository for JsonFacilityRepository {
    async fn list_facilities(&self) -> RepoResult<Vec<Facility>> {
        Ok(self.facilities.clone())
    }

    async fn facility_detail(&self, id: u32) -> RepoResult<Option<FacilityDetail>> {
        Ok(self
            .facilities
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .map(FacilityDetail::bare))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Six demo listings, two of each facility type.
pub fn seed_facilities() -> Vec<Facility> {
    vec![
        Facility {
            id: 1,
            title: "행복한 실버타운".to_string(),
            location: "서울시 강남구 역삼동".to_string(),
            types: strings(&["실버타운"]),
            price: "월 150만원~".to_string(),
            image: "/facility-1.jpg".to_string(),
            description: "최신 시설을 갖춘 프리미엄 실버타운입니다. 24시간 의료 서비스와 다양한 여가 프로그램을 제공합니다.".to_string(),
            amenities: strings(&["수영장", "헬스장", "도서관", "정원", "의료실"]),
            position: Position::new(37.5012, 127.0396),
        },
        Facility {
            id: 2,
            title: "편안한 요양원".to_string(),
            location: "서울시 서초구 반포동".to_string(),
            types: strings(&["요양원"]),
            price: "월 180만원~".to_string(),
            image: "/facility-2.jpg".to_string(),
            description: "전문 간호사가 상주하는 고품격 요양원입니다. 개인 맞춤형 케어 서비스를 제공합니다.".to_string(),
            amenities: strings(&["물리치료실", "작업치료실", "정원", "의료실", "식당"]),
            position: Position::new(37.5087, 127.0218),
        },
        Facility {
            id: 3,
            title: "푸른 양로원".to_string(),
            location: "경기도 고양시 일산동구".to_string(),
            types: strings(&["양로원"]),
            price: "월 120만원~".to_string(),
            image: "/facility-3.jpg".to_string(),
            description: "자연 친화적 환경에서 편안한 노후를 보낼 수 있는 양로원입니다. 다양한 문화 프로그램을 운영합니다.".to_string(),
            amenities: strings(&["텃밭", "산책로", "문화센터", "식당", "의료실"]),
            position: Position::new(37.6618, 126.7722),
        },
        Facility {
            id: 4,
            title: "햇살 실버타운".to_string(),
            location: "경기도 성남시 분당구".to_string(),
            types: strings(&["실버타운"]),
            price: "월 160만원~".to_string(),
            image: "/facility-4.jpg".to_string(),
            description: "넓은 개인 공간과 다양한 커뮤니티 시설을 갖춘 실버타운입니다. 활기찬 노후 생활을 지원합니다.".to_string(),
            amenities: strings(&["카페", "영화관", "헬스장", "사우나", "정원"]),
            position: Position::new(37.3784, 127.1129),
        },
        Facility {
            id: 5,
            title: "건강한 요양원".to_string(),
            location: "인천시 연수구 송도동".to_string(),
            types: strings(&["요양원"]),
            price: "월 170만원~".to_string(),
            image: "/facility-5.jpg".to_string(),
            description: "최신 의료 장비와 전문 의료진이 상주하는 요양원입니다. 개인별 맞춤 케어 플랜을 제공합니다.".to_string(),
            amenities: strings(&["물리치료실", "작업치료실", "언어치료실", "수치료실", "정원"]),
            position: Position::new(37.3824, 126.6582),
        },
        Facility {
            id: 6,
            title: "평화로운 양로원".to_string(),
            location: "경기도 용인시 수지구".to_string(),
            types: strings(&["양로원"]),
            price: "월 130만원~".to_string(),
            image: "/facility-6.jpg".to_string(),
            description: "조용하고 평화로운 환경에서 편안한 노후를 보낼 수 있는 양로원입니다. 넓은 정원과 산책로가 있습니다.".to_string(),
            amenities: strings(&["정원", "산책로", "도서관", "취미실", "식당"]),
            position: Position::new(37.3224, 127.0892),
        },
    ]
}

fn happy_silver_town_detail(facility: Facility) -> FacilityDetail {
    let mut facility = facility;
    // the detail page lists a few services the card omits
    facility
        .amenities
        .extend(strings(&["식당", "카페", "미용실"]));

    FacilityDetail {
        facility,
        address: Some("서울특별시 강남구 역삼동 123-45".to_string()),
        contact: Some("02-1234-5678".to_string()),
        opening_hours: Some("평일 09:00 - 18:00, 주말 10:00 - 17:00".to_string()),
        website: Some("https://example.com/happy-silver".to_string()),
        rooms: vec![
            RoomType {
                name: "스탠다드".to_string(),
                size: "33㎡ (10평)".to_string(),
                price: "월 150만원".to_string(),
                features: strings(&["싱글 침대", "개인 화장실", "소형 주방"]),
            },
            RoomType {
                name: "디럭스".to_string(),
                size: "49.5㎡ (15평)".to_string(),
                price: "월 200만원".to_string(),
                features: strings(&["더블 침대", "개인 화장실", "주방", "거실"]),
            },
            RoomType {
                name: "프리미엄".to_string(),
                size: "66㎡ (20평)".to_string(),
                price: "월 250만원".to_string(),
                features: strings(&["킹 침대", "개인 화장실", "주방", "거실", "테라스"]),
            },
        ],
        programs: vec![
            Program {
                name: "건강 체조".to_string(),
                schedule: "매일 오전 10시".to_string(),
                description: "전문 강사와 함께하는 노인 맞춤형 건강 체조 프로그램".to_string(),
            },
            Program {
                name: "미술 교실".to_string(),
                schedule: "매주 화, 목 오후 2시".to_string(),
                description: "다양한 미술 활동을 통한 창의력 향상 및 정서 안정 프로그램".to_string(),
            },
            Program {
                name: "음악 치료".to_string(),
                schedule: "매주 수, 금 오후 3시".to_string(),
                description: "음악을 통한 인지 기능 향상 및 정서 안정 프로그램".to_string(),
            },
        ],
        reviews: [
            ("김OO", 5, (2025, 3, 15), "시설이 깨끗하고 직원들이 친절해요. 부모님이 매우 만족하며 지내고 계십니다."),
            ("이OO", 4, (2025, 2, 20), "프로그램이 다양하고 식사가 맛있어요. 다만 주차 공간이 조금 부족한 점이 아쉬워요."),
            ("박OO", 5, (2025, 1, 10), "의료 서비스가 체계적이고 24시간 케어해주셔서 안심하고 맡길 수 있어요."),
        ]
        .into_iter()
        .filter_map(|(author, rating, (y, m, d), content)| {
            Some(Review {
                author: author.to_string(),
                rating,
                date: NaiveDate::from_ymd_opt(y, m, d)?,
                content: content.to_string(),
            })
        })
        .collect(),
    }
}
