use serde::{Deserialize, Serialize};
use shared_types::{Facility, Position};

/// Seoul city hall, used when there is nothing to center on.
pub const FALLBACK_CENTER: Position = Position::new(37.5665, 126.978);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapMarker {
    pub id: u32,
    pub title: String,
    pub position: Position,
}

impl From<&Facility> for MapMarker {
    fn from(facility: &Facility) -> Self {
        Self {
            id: facility.id,
            title: facility.title.clone(),
            position: facility.position,
        }
    }
}

/// The first facility's position, or [`FALLBACK_CENTER`].
pub fn map_center(facilities: &[Facility]) -> Position {
    facilities
        .first()
        .map(|f| f.position)
        .unwrap_or(FALLBACK_CENTER)
}

pub fn get_geographic_center(markers: &[MapMarker]) -> Option<Position> {
    if markers.is_empty() {
        return None;
    }

    let (mut x_total, mut y_total, mut z_total) = (0.0, 0.0, 0.0);
    markers.iter().for_each(|marker| {
        let lat_rad = marker.position.lat.to_radians();
        let lng_rad = marker.position.lng.to_radians();

        x_total += lat_rad.cos() * lng_rad.cos();
        y_total += lat_rad.cos() * lng_rad.sin();
        z_total += lat_rad.sin();
    });

    let count = markers.len() as f64;
    let x_avg = x_total / count;
    let y_avg = y_total / count;
    let z_avg = z_total / count;

    let lng = y_avg.atan2(x_avg).to_degrees();
    let hyp = (x_avg.powi(2) + y_avg.powi(2)).sqrt();
    let lat = z_avg.atan2(hyp).to_degrees();

    Some(Position::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: u32, lat: f64, lng: f64) -> MapMarker {
        MapMarker {
            id,
            title: format!("#{id}"),
            position: Position::new(lat, lng),
        }
    }

    #[test]
    fn empty_list_centers_on_fallback() {
        assert_eq!(map_center(&[]), FALLBACK_CENTER);
        assert_eq!(get_geographic_center(&[]), None);
    }

    #[test]
    fn geographic_center_of_one_marker_is_itself() {
        let center = get_geographic_center(&[marker(1, 37.5012, 127.0396)]).unwrap();
        assert!((center.lat - 37.5012).abs() < 1e-9);
        assert!((center.lng - 127.0396).abs() < 1e-9);
    }

    #[test]
    fn geographic_center_sits_between_markers() {
        let center =
            get_geographic_center(&[marker(1, 37.0, 127.0), marker(2, 38.0, 127.0)]).unwrap();
        assert!((center.lat - 37.5).abs() < 0.01);
        assert!((center.lng - 127.0).abs() < 1e-9);
    }
}
