use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use shared_types::{Facility, FavoriteEntry};
use tracing::{debug, warn};

use super::store::{read_json, write_json, DurableStore, FAVORITES_KEY};
use crate::filters::extract_price;

/// What `add_favorite` does when the id is already saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Adding a saved facility again changes nothing.
    #[default]
    Ignore,
    /// Every add appends a card, even for a saved id.
    Allow,
}

/// Orderings offered on the favorites page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoritesSort {
    /// Highest id first.
    #[default]
    Recent,
    PriceAsc,
    PriceDesc,
}

impl FavoritesSort {
    pub fn as_str(self) -> &'static str {
        match self {
            FavoritesSort::Recent => "recent",
            FavoritesSort::PriceAsc => "price-asc",
            FavoritesSort::PriceDesc => "price-desc",
        }
    }
}

impl FromStr for FavoritesSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(FavoritesSort::Recent),
            "price-asc" => Ok(FavoritesSort::PriceAsc),
            "price-desc" => Ok(FavoritesSort::PriceDesc),
            other => Err(format!("unknown favorites sort: {other}")),
        }
    }
}

// Entries without a readable price go last in both price orders.
fn by_price(a: Option<u64>, b: Option<u64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The visitor's favorites list, mirrored to the `favorites` key after every
/// change.
pub struct FavoritesState {
    store: Arc<dyn DurableStore>,
    favorites: Vec<FavoriteEntry>,
    policy: DuplicatePolicy,
}

impl FavoritesState {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self::with_policy(store, DuplicatePolicy::default())
    }

    /// Reads the stored list once. A value that fails to decode is dropped
    /// from the store and the list starts empty.
    pub fn with_policy(store: Arc<dyn DurableStore>, policy: DuplicatePolicy) -> Self {
        let favorites = match read_json::<Vec<FavoriteEntry>>(store.as_ref(), FAVORITES_KEY) {
            Ok(Some(favorites)) => favorites,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to parse favorites from store: {}", e);
                if let Err(e) = store.remove(FAVORITES_KEY) {
                    warn!("Failed to clear corrupt favorites: {}", e);
                }
                Vec::new()
            }
        };
        debug!("Restored {} favorites", favorites.len());

        Self {
            store,
            favorites,
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    /// A sorted view of the list; the stored order is untouched. Ties keep
    /// insertion order.
    pub fn sorted(&self, sort: FavoritesSort) -> Vec<&FavoriteEntry> {
        let mut view: Vec<&FavoriteEntry> = self.favorites.iter().collect();
        match sort {
            FavoritesSort::Recent => view.sort_by(|a, b| b.id.cmp(&a.id)),
            FavoritesSort::PriceAsc | FavoritesSort::PriceDesc => {
                let descending = sort == FavoritesSort::PriceDesc;
                view.sort_by(|a, b| {
                    by_price(extract_price(&a.price), extract_price(&b.price), descending)
                });
            }
        }
        view
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn is_favorite(&self, facility_id: u32) -> bool {
        self.favorites.iter().any(|f| f.id == facility_id)
    }

    /// Saves a snapshot of `facility`. Returns whether the list changed.
    pub fn add_favorite(&mut self, facility: &Facility) -> bool {
        if self.policy == DuplicatePolicy::Ignore && self.is_favorite(facility.id) {
            debug!("Facility {} already favorited", facility.id);
            return false;
        }

        self.favorites.push(FavoriteEntry::from(facility));
        self.persist();
        true
    }

    /// Drops every entry with `facility_id`. Returns whether anything was
    /// removed.
    pub fn remove_favorite(&mut self, facility_id: u32) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != facility_id);
        if self.favorites.len() == before {
            return false;
        }

        self.persist();
        true
    }

    /// Flips the saved state, returning the new one.
    pub fn toggle_favorite(&mut self, facility: &Facility) -> bool {
        if self.is_favorite(facility.id) {
            self.remove_favorite(facility.id);
            false
        } else {
            self.add_favorite(facility);
            true
        }
    }

    pub fn clear(&mut self) {
        self.favorites.clear();
        self.persist();
    }

    // The in-memory list stays authoritative when the write fails.
    fn persist(&self) {
        if let Err(e) = write_json(self.store.as_ref(), FAVORITES_KEY, &self.favorites) {
            warn!("Failed to save favorites: {}", e);
        }
    }
}
