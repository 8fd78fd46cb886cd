use serde::{Deserialize, Serialize};

use crate::Position;

// Mean earth radius in meters, spherical model.
const EARTH_RADIUS: f64 = 6_371_000.0;

pub fn degrees_lat_per_meter(lat_deg: f64) -> f64 {
    let lat = lat_deg.to_radians();
    1.0 / (111_132.954 - 559.822 * (2.0 * lat).cos() + 1.175 * (4.0 * lat).cos())
}

pub fn degrees_lon_per_meter(lat_deg: f64) -> f64 {
    let lat = lat_deg.to_radians();
    1.0 / (111_132.954 * lat.cos())
}

pub fn lla_to_xyz(pos: &Position) -> [f64; 3] {
    let lat = pos.lat.to_radians();
    let lon = pos.lon.to_radians();
    [
        EARTH_RADIUS * lat.cos() * lon.cos(),
        EARTH_RADIUS * lat.cos() * lon.sin(),
        EARTH_RADIUS * lat.sin(),
    ]
}

pub fn dist_squared_xyz(a: &Position, b: &Position) -> f64 {
    let pa = lla_to_xyz(a);
    let pb = lla_to_xyz(b);
    let dx = pa[0] - pb[0];
    let dy = pa[1] - pb[1];
    let dz = pa[2] - pb[2];
    dx * dx + dy * dy + dz * dz
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct BoundingRect {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingRect {
    pub fn center(&self) -> Position {
        Position::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

// Ring of lon/lat vertices, implicitly closed.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct GeoPolygon {
    pub ring: Vec<Position>,
}

impl GeoPolygon {
    pub fn new(ring: Vec<Position>) -> GeoPolygon {
        GeoPolygon { ring }
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn bounding_rect(&self) -> BoundingRect {
        let mut rect = match self.ring.first() {
            Some(p) => BoundingRect {
                min_lon: p.lon,
                min_lat: p.lat,
                max_lon: p.lon,
                max_lat: p.lat,
            },
            None => return BoundingRect::default(),
        };
        for p in self.ring.iter().skip(1) {
            rect.min_lon = rect.min_lon.min(p.lon);
            rect.min_lat = rect.min_lat.min(p.lat);
            rect.max_lon = rect.max_lon.max(p.lon);
            rect.max_lat = rect.max_lat.max(p.lat);
        }
        rect
    }

    // Even-odd fill rule.
    pub fn contains(&self, p: &Position) -> bool {
        let n = self.ring.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = &self.ring[i];
            let b = &self.ring[j];
            if (a.lat > p.lat) != (b.lat > p.lat) {
                let t = (p.lat - a.lat) / (b.lat - a.lat);
                let crossing_lon = a.lon + t * (b.lon - a.lon);
                if p.lon < crossing_lon {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}
