use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// Tolerance used when deciding whether a point sits on a ring edge.
const EDGE_EPSILON: f64 = 1e-12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Malformed coordinate: {0}")]
    MalformedCoordinate(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Unsupported region: {0}")]
    UnsupportedRegion(String),
}

/// A validated latitude/longitude pair. Both components are finite and
/// within the conventional WGS84 value ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GeoError::MalformedCoordinate(format!(
                "coordinate components must be finite, got ({}, {})",
                lat, lng
            )));
        }
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(GeoError::MalformedCoordinate(format!(
                "latitude {} outside [{}, {}]",
                lat, MIN_LAT, MAX_LAT
            )));
        }
        if !(MIN_LNG..=MAX_LNG).contains(&lng) {
            return Err(GeoError::MalformedCoordinate(format!(
                "longitude {} outside [{}, {}]",
                lng, MIN_LNG, MAX_LNG
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Parse a raw `"lat,lng"` query string value. Exactly two
    /// comma-separated decimal tokens are accepted.
    pub fn parse(raw: &str) -> Result<Self, GeoError> {
        let tokens: Vec<&str> = raw.split(',').collect();
        if tokens.len() != 2 {
            return Err(GeoError::MalformedCoordinate(format!(
                "expected \"lat,lng\", got {:?}",
                raw
            )));
        }
        let lat: f64 = tokens[0].trim().parse().map_err(|_| {
            GeoError::MalformedCoordinate(format!("latitude {:?} is not a number", tokens[0]))
        })?;
        let lng: f64 = tokens[1].trim().parse().map_err(|_| {
            GeoError::MalformedCoordinate(format!("longitude {:?} is not a number", tokens[1]))
        })?;
        Self::new(lat, lng)
    }
}

/// Axis-aligned lat/lng extent of a polygon, used by stores as a cheap
/// SQL range prefilter before the exact containment test runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// A closed counter-clockwise rectangle ring built from two opposite
/// corner coordinates. Five points, first repeated last.
///
/// The rectangle lives in raw lat/lng space; boxes crossing the
/// antimeridian are rejected rather than silently mis-wound.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingPolygon {
    ring: Vec<Coordinate>,
}

impl BoundingPolygon {
    pub fn from_corners(top_right: Coordinate, bottom_left: Coordinate) -> Result<Self, GeoError> {
        if top_right.lat < bottom_left.lat {
            return Err(GeoError::InvalidBounds(format!(
                "top-right latitude {} is below bottom-left latitude {}",
                top_right.lat, bottom_left.lat
            )));
        }
        if top_right == bottom_left {
            return Err(GeoError::InvalidBounds(
                "corners are identical, box has zero area".to_string(),
            ));
        }
        if top_right.lng < bottom_left.lng {
            return Err(GeoError::UnsupportedRegion(
                "bounding box crosses the antimeridian".to_string(),
            ));
        }

        let ring = vec![
            bottom_left,
            Coordinate { lat: bottom_left.lat, lng: top_right.lng },
            top_right,
            Coordinate { lat: top_right.lat, lng: bottom_left.lng },
            bottom_left,
        ];
        Ok(Self { ring })
    }

    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    pub fn extent(&self) -> Extent {
        let mut ext = Extent {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lng: f64::MAX,
            max_lng: f64::MIN,
        };
        for c in &self.ring {
            ext.min_lat = ext.min_lat.min(c.lat);
            ext.max_lat = ext.max_lat.max(c.lat);
            ext.min_lng = ext.min_lng.min(c.lng);
            ext.max_lng = ext.max_lng.max(c.lng);
        }
        ext
    }

    /// Boundary-inclusive point-in-polygon test: points on a ring edge
    /// count as contained, interior points are resolved with an even-odd
    /// ray cast.
    pub fn contains(&self, point: Coordinate) -> bool {
        for edge in self.ring.windows(2) {
            if on_segment(edge[0], edge[1], point) {
                return true;
            }
        }

        let mut inside = false;
        for edge in self.ring.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let crossing_lng = a.lng + (point.lat - a.lat) * (b.lng - a.lng) / (b.lat - a.lat);
                if point.lng < crossing_lng {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn on_segment(a: Coordinate, b: Coordinate, p: Coordinate) -> bool {
    let cross = (b.lng - a.lng) * (p.lat - a.lat) - (b.lat - a.lat) * (p.lng - a.lng);
    if cross.abs() > EDGE_EPSILON {
        return false;
    }
    let within_lat = p.lat >= a.lat.min(b.lat) && p.lat <= a.lat.max(b.lat);
    let within_lng = p.lng >= a.lng.min(b.lng) && p.lng <= a.lng.max(b.lng);
    within_lat && within_lng
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn parses_valid_coordinate() {
        let c = Coordinate::parse("61.5,23.7").unwrap();
        assert_eq!(c, Coordinate { lat: 61.5, lng: 23.7 });
    }

    #[test]
    fn parses_with_surrounding_whitespace() {
        let c = Coordinate::parse(" -10.25 , 140.0 ").unwrap();
        assert_eq!(c, Coordinate { lat: -10.25, lng: 140.0 });
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(matches!(
            Coordinate::parse("200,10"),
            Err(GeoError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(matches!(
            Coordinate::parse("10,181"),
            Err(GeoError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(matches!(
            Coordinate::parse("10"),
            Err(GeoError::MalformedCoordinate(_))
        ));
        assert!(matches!(
            Coordinate::parse("10,20,30"),
            Err(GeoError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        assert!(matches!(
            Coordinate::parse("abc,10"),
            Err(GeoError::MalformedCoordinate(_))
        ));
        assert!(matches!(
            Coordinate::parse("10,NaN"),
            Err(GeoError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn builds_closed_five_point_ring() {
        let tr = coord(62.0, 24.0);
        let bl = coord(61.0, 23.0);
        let poly = BoundingPolygon::from_corners(tr, bl).unwrap();
        let ring = poly.ring();

        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[0], bl);
        assert_eq!(ring[1], Coordinate { lat: 61.0, lng: 24.0 });
        assert_eq!(ring[2], tr);
        assert_eq!(ring[3], Coordinate { lat: 62.0, lng: 23.0 });
    }

    #[test]
    fn ring_extent_matches_corners() {
        let tr = coord(10.0, 50.0);
        let bl = coord(-5.0, 40.0);
        let ext = BoundingPolygon::from_corners(tr, bl).unwrap().extent();
        assert_eq!(ext.min_lat, -5.0);
        assert_eq!(ext.max_lat, 10.0);
        assert_eq!(ext.min_lng, 40.0);
        assert_eq!(ext.max_lng, 50.0);
    }

    #[test]
    fn inverted_latitude_is_invalid_bounds() {
        let tr = coord(10.0, 50.0);
        let bl = coord(20.0, 40.0);
        assert!(matches!(
            BoundingPolygon::from_corners(tr, bl),
            Err(GeoError::InvalidBounds(_))
        ));
    }

    #[test]
    fn identical_corners_are_invalid_bounds() {
        let c = coord(10.0, 10.0);
        assert!(matches!(
            BoundingPolygon::from_corners(c, c),
            Err(GeoError::InvalidBounds(_))
        ));
    }

    #[test]
    fn antimeridian_crossing_is_unsupported() {
        // Box "from" 170E "to" 170W would wrap; rejected outright.
        let tr = coord(10.0, -170.0);
        let bl = coord(-10.0, 170.0);
        assert!(matches!(
            BoundingPolygon::from_corners(tr, bl),
            Err(GeoError::UnsupportedRegion(_))
        ));
    }

    #[test]
    fn contains_interior_point() {
        let poly = BoundingPolygon::from_corners(coord(10.0, 10.0), coord(0.0, 0.0)).unwrap();
        assert!(poly.contains(coord(5.0, 5.0)));
    }

    #[test]
    fn excludes_exterior_point() {
        let poly = BoundingPolygon::from_corners(coord(10.0, 10.0), coord(0.0, 0.0)).unwrap();
        assert!(!poly.contains(coord(10.5, 5.0)));
        assert!(!poly.contains(coord(5.0, -0.1)));
    }

    #[test]
    fn boundary_points_are_contained() {
        let poly = BoundingPolygon::from_corners(coord(10.0, 10.0), coord(0.0, 0.0)).unwrap();
        // Edge midpoints
        assert!(poly.contains(coord(0.0, 5.0)));
        assert!(poly.contains(coord(10.0, 5.0)));
        assert!(poly.contains(coord(5.0, 0.0)));
        assert!(poly.contains(coord(5.0, 10.0)));
        // Corners
        assert!(poly.contains(coord(0.0, 0.0)));
        assert!(poly.contains(coord(10.0, 10.0)));
    }
}
