//! Search routines over a preprocessed [`crate::track::Track`]: open
//! distance for 0..=3 intermediate turnpoints, and the three circuit
//! shapes (out-and-return, FAI triangle, flat triangle).

pub mod circuit;
pub mod open;
