//! Great-circle distance between fixed-point coordinates.
//!
//! Coordinates are stored as `Decimal` degrees (6 fractional digits) and
//! converted to `f64` only for the haversine computation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fractional digits kept for stored coordinates.
pub const COORDINATE_SCALE: u32 = 6;

#[derive(Error, Debug, PartialEq)]
pub enum GeoError {
    #[error("Latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(Decimal),

    #[error("Longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(Decimal),
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coordinate {
    latitude: Decimal,
    longitude: Decimal,
}

impl Coordinate {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Result<Self, GeoError> {
        if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude: latitude.round_dp(COORDINATE_SCALE),
            longitude: longitude.round_dp(COORDINATE_SCALE),
        })
    }

    /// Build an origin only when both components are present.
    pub fn from_parts(
        latitude: Option<Decimal>,
        longitude: Option<Decimal>,
    ) -> Result<Option<Self>, GeoError> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            _ => Ok(None),
        }
    }

    pub fn latitude(&self) -> Decimal {
        self.latitude
    }

    pub fn longitude(&self) -> Decimal {
        self.longitude
    }

    /// Distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance_km(self, other)
    }

    /// Smallest degree box holding every point within `radius_km`.
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        BoundingBox::around(degrees(self.latitude), degrees(self.longitude), radius_km)
    }
}

/// Degree bounds used to pre-filter rows before the exact haversine check.
///
/// `min_lng > max_lng` means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

// Absorbs the difference between SQLite's text-to-REAL cast and `to_f64`.
const BOX_PADDING_DEG: f64 = 1e-6;

impl BoundingBox {
    pub const WORLD: BoundingBox = BoundingBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lng: -180.0,
        max_lng: 180.0,
    };

    fn around(lat: f64, lng: f64, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let d_lat = angular.to_degrees() + BOX_PADDING_DEG;
        let min_lat = lat - d_lat;
        let max_lat = lat + d_lat;

        // A box touching a pole spans every longitude.
        if min_lat <= -90.0 || max_lat >= 90.0 {
            return Self {
                min_lat: min_lat.max(-90.0),
                max_lat: max_lat.min(90.0),
                ..Self::WORLD
            };
        }

        let d_lng =
            (angular.sin() / lat.to_radians().cos()).asin().to_degrees() + BOX_PADDING_DEG;
        if d_lng >= 180.0 {
            return Self { min_lat, max_lat, ..Self::WORLD };
        }

        Self {
            min_lat,
            max_lat,
            min_lng: wrap_longitude(lng - d_lng),
            max_lng: wrap_longitude(lng + d_lng),
        }
    }

    /// The box's longitude span as two inclusive ranges; both are the same
    /// range unless the box crosses the antimeridian.
    pub fn longitude_ranges(&self) -> [(f64, f64); 2] {
        if self.min_lng <= self.max_lng {
            [(self.min_lng, self.max_lng); 2]
        } else {
            [(self.min_lng, 180.0), (-180.0, self.max_lng)]
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat
            && lat <= self.max_lat
            && self
                .longitude_ranges()
                .iter()
                .any(|&(lo, hi)| lng >= lo && lng <= hi)
    }
}

fn wrap_longitude(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}

/// Haversine distance between two coordinates, in kilometres.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_km(
        degrees(a.latitude),
        degrees(a.longitude),
        degrees(b.latitude),
        degrees(b.longitude),
    )
}

/// Haversine distance over raw degree values.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

// Values inside the coordinate range always fit in f64.
fn degrees(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(
            Decimal::try_from(lat).unwrap(),
            Decimal::try_from(lng).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let points = [
            (0.0, 0.0),
            (40.0, -74.0),
            (-33.8688, 151.2093),
            (90.0, 180.0),
            (-90.0, -180.0),
        ];
        for (lat, lng) in points {
            let p = coord(lat, lng);
            assert_eq!(distance_km(&p, &p), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (coord(40.0, -74.0), coord(41.0, -74.0)),
            (coord(51.5074, -0.1278), coord(48.8566, 2.3522)),
            (coord(-33.8688, 151.2093), coord(35.6762, 139.6503)),
            (coord(10.0, 179.9), coord(10.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_km(&a, &b), distance_km(&b, &a));
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(&coord(40.0, -74.0), &coord(41.0, -74.0));
        assert!((d - 111.19).abs() < 0.05, "got {d}");
    }

    #[test]
    fn london_to_paris() {
        let d = distance_km(&coord(51.5074, -0.1278), &coord(48.8566, 2.3522));
        assert!((d - 343.5).abs() < 1.0, "got {d}");
    }

    #[test]
    fn antimeridian_crossing_is_short() {
        let d = distance_km(&coord(0.0, 179.5), &coord(0.0, -179.5));
        assert!(d < 112.0, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = distance_km(&coord(0.0, 0.0), &coord(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert_eq!(
            Coordinate::new(Decimal::from(91), Decimal::ZERO),
            Err(GeoError::LatitudeOutOfRange(Decimal::from(91)))
        );
        assert_eq!(
            Coordinate::new(Decimal::ZERO, Decimal::from(-181)),
            Err(GeoError::LongitudeOutOfRange(Decimal::from(-181)))
        );
    }

    #[test]
    fn origin_requires_both_components() {
        assert_eq!(Coordinate::from_parts(Some(Decimal::ONE), None), Ok(None));
        assert_eq!(Coordinate::from_parts(None, Some(Decimal::ONE)), Ok(None));
        assert!(Coordinate::from_parts(Some(Decimal::ONE), Some(Decimal::ONE))
            .unwrap()
            .is_some());
    }

    #[test]
    fn stored_precision_is_six_digits() {
        let p = Coordinate::new(
            Decimal::new(407127753, 7), // 40.7127753
            Decimal::new(-740059728, 7),
        )
        .unwrap();
        assert_eq!(p.latitude().to_string(), "40.712775");
        assert_eq!(p.longitude().to_string(), "-74.005973");
    }

    #[test]
    fn bounding_box_holds_points_on_the_radius() {
        let origin = coord(40.0, -74.0);
        let area = origin.bounding_box(10.0);
        // Due east, north and south at just under 10 km.
        for (lat, lng) in [(40.0, -73.8827), (40.0899, -74.0), (39.9101, -74.0)] {
            assert!(origin.distance_km(&coord(lat, lng)) <= 10.0);
            assert!(area.contains(lat, lng));
        }
        assert!(!area.contains(40.0, -73.7));
        assert!(!area.contains(-40.0, 100.0));
    }

    #[test]
    fn bounding_box_wraps_the_antimeridian() {
        let area = coord(0.0, 179.99).bounding_box(50.0);
        assert!(area.min_lng > area.max_lng);
        assert!(area.contains(0.0, -179.9));
        assert!(area.contains(0.0, 179.9));
        assert!(!area.contains(0.0, 0.0));
    }

    #[test]
    fn bounding_box_near_a_pole_spans_all_longitudes() {
        let area = coord(89.99, 0.0).bounding_box(10.0);
        assert_eq!(area.min_lng, -180.0);
        assert_eq!(area.max_lng, 180.0);
        assert_eq!(area.max_lat, 90.0);
        assert!(area.contains(89.95, 179.0));
    }

    #[test]
    fn huge_radius_is_the_whole_world() {
        assert_eq!(coord(10.0, 10.0).bounding_box(30_000.0), BoundingBox::WORLD);
    }
}
