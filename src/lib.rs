//! Cross-country flight route optimization.
//!
//! Given a flight track (from an IGC file, or built directly from fixes),
//! this crate searches for the best-scoring routes under a handful of
//! league scoring rules: open distance with zero to three turnpoints,
//! out-and-return, FAI triangle, and flat triangle. Every distance is a
//! great-circle distance on a sphere of [`geometry::R`] kilometres.
//!
//! The optimization core (`preprocess`, the search primitives, the league
//! pipelines) never fails: a degenerate or too-short track just yields an
//! empty route list. Fallibility lives entirely at the IGC parsing
//! boundary, surfaced as [`error::Error`].
//!
//! ```no_run
//! use xcscore::{league::League, track::Track};
//!
//! # fn main() -> Result<(), xcscore::error::Error> {
//! let bytes = std::fs::read("flight.igc")?;
//! let mut track = Track::from_igc("flight.igc", &bytes)?;
//! track.preprocess();
//! let routes = xcscore::league::optimize(&mut track, League::Frcfd, -1, None);
//! for route in &routes {
//!     println!("{}: {:.2} km (x{})", route.route_type, route.distance_km, route.multiplier);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod geometry;
pub mod igc;
pub mod league;
pub mod parallel;
pub mod point;
pub mod query;
pub mod search;
pub mod serialize;
pub mod track;

pub use error::Error;
pub use league::{League, Route};
pub use track::Track;
