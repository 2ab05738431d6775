//! Central London commute endpoints.
//!
//! The commute fixtures run due east along a single parallel so that hazard
//! distances are easy to reason about in tests.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> commute_planner::models::Coordinate {
        commute_planner::models::Coordinate::new(self.lat, self.lng)
    }
}

/// Near Trafalgar Square.
pub const ORIGIN: Location = Location::new("Charing Cross", 51.5080, -0.1240);

/// Near Liverpool Street, moved onto the origin's parallel.
pub const DESTINATION: Location = Location::new("Liverpool Street", 51.5080, -0.0840);
