//! Service-area bounding box.

use parking_spotter_camera_models::GeoCoordinate;

/// An axis-aligned latitude/longitude rectangle.
///
/// Containment is inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

/// New York City, the only area the camera backend covers.
pub const NYC_BOUNDS: Bounds = Bounds {
    lat_min: 40.4774,
    lat_max: 40.9176,
    lng_min: -74.2591,
    lng_max: -73.7004,
};

impl Bounds {
    /// Whether the rectangle has a positive extent on both axes.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.lat_min < self.lat_max && self.lng_min < self.lng_max
    }

    /// Whether `coordinate` lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, coordinate: GeoCoordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&coordinate.lat)
            && (self.lng_min..=self.lng_max).contains(&coordinate.lng)
    }
}
