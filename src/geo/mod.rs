use serde::{Deserialize, Serialize};

/// A latitude/longitude pair as it arrives on the wire: `"lat,lng"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(',');
        let lat = parts.next()?.trim().parse::<f64>().ok()?;
        let lng = parts.next()?.trim().parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }
}

/// GeoJSON point. Coordinates are [lng, lat].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Point")]
pub struct Point {
    pub coordinates: [f64; 2],
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { coordinates: [lng, lat] }
    }

    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }
}

/// GeoJSON polygon with a single exterior ring. Ring coordinates are
/// [lng, lat]; the ring is closed (first point repeated last).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Polygon")]
pub struct Polygon {
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    pub fn exterior_ring(&self) -> &[[f64; 2]] {
        self.coordinates.first().map(|r| r.as_slice()).unwrap_or(&[])
    }
}

/// Build a closed rectangular polygon from two opposite corners.
///
/// Corner order matches the rectangle walked from the top-right corner:
/// top-right, top-left, bottom-left, bottom-right, then back to top-right to
/// close the ring.
pub fn rectangle_bounds(top_right: LatLng, bottom_left: LatLng) -> Polygon {
    let ring = vec![
        [top_right.lng, top_right.lat],
        [bottom_left.lng, top_right.lat],
        [bottom_left.lng, bottom_left.lat],
        [top_right.lng, bottom_left.lat],
        [top_right.lng, top_right.lat],
    ];
    Polygon { coordinates: vec![ring] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lng_pairs() {
        let p = LatLng::parse("60.1699,24.9384").unwrap();
        assert_eq!(p.lat, 60.1699);
        assert_eq!(p.lng, 24.9384);

        assert!(LatLng::parse("60.1699").is_none());
        assert!(LatLng::parse("not,numbers").is_none());
        assert!(LatLng::parse("91.0,0.0").is_none());
        assert!(LatLng::parse("0.0,181.0").is_none());
        assert!(LatLng::parse("1,2,3").is_none());
    }

    #[test]
    fn rectangle_ring_is_closed_and_encloses_corners() {
        let polygon = rectangle_bounds(LatLng { lat: 10.0, lng: 10.0 }, LatLng { lat: 0.0, lng: 0.0 });
        let ring = polygon.exterior_ring();

        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());

        let lngs: Vec<f64> = ring.iter().map(|p| p[0]).collect();
        let lats: Vec<f64> = ring.iter().map(|p| p[1]).collect();
        let (min_lng, max_lng) = (lngs.iter().cloned().fold(f64::MAX, f64::min), lngs.iter().cloned().fold(f64::MIN, f64::max));
        let (min_lat, max_lat) = (lats.iter().cloned().fold(f64::MAX, f64::min), lats.iter().cloned().fold(f64::MIN, f64::max));

        // cat at (5,5) falls inside the rectangle, (20,20) outside
        assert!(min_lng <= 5.0 && 5.0 <= max_lng && min_lat <= 5.0 && 5.0 <= max_lat);
        assert!(!(min_lng <= 20.0 && 20.0 <= max_lng && min_lat <= 20.0 && 20.0 <= max_lat));
    }

    #[test]
    fn point_serializes_as_geojson() {
        let point = Point::new(24.9384, 60.1699);
        let value = serde_json::to_value(point).unwrap();
        assert_eq!(value["type"], "Point");
        assert_eq!(value["coordinates"][0], 24.9384);
        assert_eq!(value["coordinates"][1], 60.1699);
    }
}
