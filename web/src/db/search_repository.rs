use serde::{Deserialize, Serialize};
use shared_types::{Facility, Position};
use tracing::debug;

use crate::filters::{matches, matches_search_term, FilterCriteria};
use crate::map::util::{map_center, MapMarker};

/// What the list page renders: the cards, their map markers and where the map
/// opens.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Listing {
    pub facilities: Vec<Facility>,
    pub markers: Vec<MapMarker>,
    pub center: Position,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

/// Narrows `dataset` by facility type, search term and filter criteria, in
/// that order, and derives the map view. Pure: the same inputs always give
/// the same listing.
pub fn assemble(
    dataset: &[Facility],
    type_filter: Option<&str>,
    search_term: &str,
    criteria: &FilterCriteria,
) -> Listing {
    let facilities: Vec<Facility> = dataset
        .iter()
        .filter(|f| type_filter.map_or(true, |label| f.has_type(label)))
        .filter(|f| matches_search_term(f, search_term))
        .filter(|f| matches(f, criteria))
        .cloned()
        .collect();

    debug!(
        "Assembled {} of {} facilities (type: {:?}, search: {:?})",
        facilities.len(),
        dataset.len(),
        type_filter,
        search_term
    );

    let markers = facilities.iter().map(MapMarker::from).collect();
    let center = map_center(&facilities);

    Listing {
        facilities,
        markers,
        center,
    }
}
