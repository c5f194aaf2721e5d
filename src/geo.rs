use crate::graph::NodeId;
use ordered_float::OrderedFloat;

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the globe, in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` using the haversine formula, in meters.
    pub fn haversine_meters(self, other: Coord) -> f64 {
        let (lat1, lon1) = (self.lat.to_radians(), self.lon.to_radians());
        let (lat2, lon2) = (other.lat.to_radians(), other.lon.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

/// A* heuristic over an indexed graph whose edge weights are haversine
/// lengths: the straight-line distance from a node to `target`. Never
/// overestimates, since no road is shorter than the great circle. Nodes
/// without a coordinate get 0.
pub fn straight_line_to(coords: &[Coord], target: Coord) -> impl Fn(&NodeId) -> OrderedFloat<f64> + '_ {
    move |&node: &NodeId| OrderedFloat(coords.get(node).map_or(0.0, |c| c.haversine_meters(target)))
}
