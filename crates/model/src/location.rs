use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS84 coordinates in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().clamp(0.0, 1.0).asin()
    }
}

/// A named place, optionally resolved to coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Some(GeoPoint::new(lat, lon));
        self
    }

    /// Coordinates usable for distance computation.
    pub fn resolved(&self) -> Option<GeoPoint> {
        self.coordinates.filter(GeoPoint::is_valid)
    }

    /// Same place by name (case-insensitive), ignoring surrounding whitespace.
    pub fn same_place(&self, other: &Location) -> bool {
        let a = self.name.trim();
        !a.is_empty() && a.eq_ignore_ascii_case(other.name.trim())
    }

    /// Distance to `other` when both sides resolve to coordinates.
    pub fn distance_km(&self, other: &Location) -> Option<f64> {
        match (self.resolved(), other.resolved()) {
            (Some(a), Some(b)) => Some(a.distance_km(&b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paris_to_london_is_about_344_km() {
        let paris = Location::named("Paris").with_coordinates(48.8566, 2.3522);
        let london = Location::named("London").with_coordinates(51.5074, -0.1278);
        let d = paris.distance_km(&london).expect("both resolved");
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn distance_is_none_without_coordinates() {
        let a = Location::named("Berlin");
        let b = Location::named("Berlin").with_coordinates(52.52, 13.405);
        assert!(a.distance_km(&b).is_none());
        assert!(a.same_place(&b));
    }

    #[test]
    fn invalid_coordinates_do_not_resolve() {
        let bogus = Location::named("Nowhere").with_coordinates(120.0, 0.0);
        assert!(bogus.resolved().is_none());
    }

    #[test]
    fn empty_names_never_match() {
        assert!(!Location::named("").same_place(&Location::named("")));
    }
}
