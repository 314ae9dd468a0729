//! Spherical geometry primitives.
//!
//! Every distance in the optimization core is an angular great-circle
//! distance on the unit sphere, expressed in radians. [`Coord`] is the
//! per-fix trigonometric form ([`crate::track::Track::preprocess`] derives
//! it once from the raw [`crate::point::Trkpt`] lat/lon), and [`delta`] is
//! the only place `acos` is called.

/// Mean Earth radius in kilometres, used to convert angular distances to
/// user-facing kilometre values. A single fixed value, as used throughout
/// this crate's source material (WGS-84 mean radius, rounded).
pub const R: f64 = 6371.0;

/// Precomputed trigonometric form of a fix's latitude/longitude, immutable
/// once built by [`crate::track::Track::preprocess`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coord {
    pub sin_lat: f64,
    pub cos_lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Builds a `Coord` from latitude/longitude in radians.
    pub fn from_radians(lat: f64, lon: f64) -> Self {
        Coord {
            sin_lat: lat.sin(),
            cos_lat: lat.cos(),
            lon,
        }
    }

    /// Builds a `Coord` from the IGC integer representation: signed units
    /// of 1/60000 of a degree.
    pub fn from_igc_units(lat: i32, lon: i32) -> Self {
        let lat = std::f64::consts::PI * lat as f64 / (180.0 * 60000.0);
        let lon = std::f64::consts::PI * lon as f64 / (180.0 * 60000.0);
        Coord::from_radians(lat, lon)
    }
}

/// Converts a signed IGC 1/60000-degree integer to decimal degrees, for
/// output at the result-serialization boundary (GPX/KML want decimal
/// degrees, not the core's internal integer units).
pub fn igc_units_to_degrees(units: i32) -> f64 {
    units as f64 / 60000.0
}

/// Great-circle angular distance (radians) between two coordinates.
///
/// The argument to `acos` can drift slightly past 1.0 for near-identical
/// points due to floating point error; clamping avoids a NaN. Clamping at
/// -1 is not required for realistic tracks (antipodal fixes never occur
/// in a single flight) but is applied for robustness against malformed
/// input, per the no-validation-in-the-core contract.
pub fn coord_delta(a: &Coord, b: &Coord) -> f64 {
    let x = a.sin_lat * b.sin_lat + a.cos_lat * b.cos_lat * (a.lon - b.lon).cos();
    x.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let c = Coord::from_radians(0.5, 1.2);
        assert_eq!(coord_delta(&c, &c), 0.0);
    }

    #[test]
    fn quarter_circle_at_the_equator() {
        let a = Coord::from_radians(0.0, 0.0);
        let b = Coord::from_radians(0.0, std::f64::consts::FRAC_PI_2);
        assert_approx_eq::assert_approx_eq!(coord_delta(&a, &b), std::f64::consts::FRAC_PI_2, 1e-9);
    }

    #[test]
    fn clamp_guards_against_numeric_overshoot() {
        // sin/cos products that land a hair above 1.0 from rounding must
        // not make acos return NaN.
        let c = Coord {
            sin_lat: 1.0,
            cos_lat: 1e-10,
            lon: 0.0,
        };
        assert_eq!(coord_delta(&c, &c), 0.0);
    }
}
