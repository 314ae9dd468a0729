//! The central data structure: a preprocessed flight track plus the
//! derived tables (`before`/`after` limits, and optionally `last_finish`/
//! `best_start` circuit tables) that the search routines consume.

use crate::geometry::{coord_delta, Coord};
use crate::parallel::{opt_join, opt_par_iter};
use crate::point::{Trkpt, Wpt};
use crate::query::{delta, fast_backward};
use log::{trace, warn};

/// `(index, distance)` pair: the fix furthest from some reference fix,
/// and how far away it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Limit {
    pub index: usize,
    pub distance: f64,
}

/// An owned, preprocessed flight track.
///
/// Built once (`from_igc` or `from_trkpts`), preprocessed once, queried
/// many times by the search routines in [`crate::search`], then dropped.
/// Everything but the on-demand circuit tables is immutable after
/// [`Track::preprocess`] returns.
pub struct Track {
    pub trkpts: Vec<Trkpt>,
    pub task_waypoints: Vec<Wpt>,
    pub coords: Vec<Coord>,
    pub sigma_delta: Vec<f64>,
    pub max_delta: f64,
    pub before: Vec<Limit>,
    pub after: Vec<Limit>,
    pub last_finish: Option<Vec<usize>>,
    pub best_start: Option<Vec<usize>>,
    igc_bytes: Vec<u8>,
}

impl Track {
    /// Builds an unpreprocessed track from raw fixes. [`Track::preprocess`]
    /// must be called before any search routine runs.
    pub fn from_trkpts(trkpts: Vec<Trkpt>) -> Self {
        Track {
            trkpts,
            task_waypoints: Vec::new(),
            coords: Vec::new(),
            sigma_delta: Vec::new(),
            max_delta: 0.0,
            before: Vec::new(),
            after: Vec::new(),
            last_finish: None,
            best_start: None,
            igc_bytes: Vec::new(),
        }
    }

    /// Parses raw IGC bytes (B records for fixes, C records for task
    /// declaration waypoints, H record for the flight date) into an
    /// unpreprocessed track.
    ///
    /// IGC parsing is an external collaborator to the optimization core
    /// by design (see the crate's top-level docs); this constructor is
    /// the boundary where that collaborator's output becomes a `Track`.
    pub fn from_igc(name: &str, bytes: &[u8]) -> Result<Self, crate::error::Error> {
        crate::igc::parse(name, bytes)
    }

    pub fn len(&self) -> usize {
        self.trkpts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trkpts.is_empty()
    }

    /// Converts fixes to `Coord`, then derives `sigma_delta`, `max_delta`,
    /// and the `before`/`after` limit tables. Idempotent: calling this
    /// twice recomputes the same arrays (up to floating-point determinism
    /// of the parallel reduction).
    pub fn preprocess(&mut self) {
        trace!("preprocess: start, n={} fixes", self.trkpts.len());
        self.coords = opt_par_iter(&self.trkpts)
            .map(|t| Coord::from_igc_units(t.lat, t.lon))
            .collect();

        let n = self.coords.len();
        let mut sigma_delta = vec![0.0; n];
        let mut max_delta = 0.0_f64;
        for i in 1..n {
            let d = coord_delta(&self.coords[i - 1], &self.coords[i]);
            sigma_delta[i] = sigma_delta[i - 1] + d;
            if d > max_delta {
                max_delta = d;
            }
        }
        self.sigma_delta = sigma_delta;
        self.max_delta = max_delta;

        if n == 0 {
            self.before = Vec::new();
            self.after = Vec::new();
            trace!("preprocess: done, n=0, no tables to build");
            return;
        }

        let (before, after) = opt_join(|| build_before(self), || build_after(self));
        self.before = before;
        self.after = after;
        trace!("preprocess: done, max_delta={:.6} rad", self.max_delta);
    }

    /// Allocates the circuit tables for a closure radius `epsilon`
    /// (radians). Must be recomputed whenever `epsilon` changes.
    pub fn compute_circuit_tables(&mut self, epsilon: f64) {
        trace!("compute_circuit_tables: start, epsilon={epsilon:.6} rad");
        let n = self.len();
        let mut last_finish = vec![0usize; n];
        let mut best_start = vec![0usize; n];
        let mut current_best_start = 0usize;

        for i in 0..n {
            let mut j = (n as i64) - 1;
            last_finish[i] = loop {
                let error = delta(self, i, j as usize);
                if error < epsilon {
                    break j as usize;
                }
                if j <= i as i64 {
                    // Floor: j == i gives delta(i,i) == 0, which only fails
                    // the `< epsilon` test for a non-positive epsilon. Settle
                    // for i itself rather than walking off the front of the
                    // track, matching the "epsilon too small" contract.
                    break i;
                }
                j = fast_backward(self, j, error - epsilon).max(i as i64);
            };
            if last_finish[i] > last_finish[current_best_start] {
                current_best_start = i;
            }
            if last_finish[current_best_start] < i {
                current_best_start = 0;
                for j in 1..=i {
                    if last_finish[j] > last_finish[current_best_start] {
                        current_best_start = j;
                    }
                }
            }
            best_start[i] = current_best_start;
        }

        if n > 1 && last_finish.iter().enumerate().all(|(i, &j)| j == i) {
            warn!(
                "compute_circuit_tables: epsilon={epsilon:.6} rad admits no closure anywhere on this track; circuit searches will find nothing"
            );
        }
        trace!("compute_circuit_tables: done, n={n}");

        self.last_finish = Some(last_finish);
        self.best_start = Some(best_start);
    }
}

/// `before[i] = (index, distance)` of the fix in `[0,i]` furthest from `i`.
/// Seeded forward from `before[i-1].distance - max_delta`: adding a new
/// candidate `j = i` to the search range can only increase the running
/// max, so that prior bound minus one step's worth of slack is always a
/// safe (non-over-estimating) starting point for the skip search.
fn build_before(track: &Track) -> Vec<Limit> {
    trace!("build_before: start, n={}", track.len());
    let n = track.len();
    let mut before = vec![Limit::default(); n];
    for i in 1..n {
        let seed = before[i - 1].distance - track.max_delta;
        match crate::query::furthest_from(track, i, 0, i, seed) {
            (Some(index), distance) => before[i] = Limit { index, distance },
            // Unreachable per the seeding lemma above: the true maximum is
            // always >= seed, so furthest_from always improves on it.
            (None, _) => before[i] = before[i - 1],
        }
    }
    before
}

/// Symmetric to [`build_before`]: `after[i] = (index, distance)` of the fix
/// in `(i,n)` furthest from `i`.
fn build_after(track: &Track) -> Vec<Limit> {
    trace!("build_after: start, n={}", track.len());
    let n = track.len();
    let mut after = vec![Limit::default(); n];
    if n == 0 {
        return after;
    }
    match crate::query::furthest_from(track, 0, 1, n, 0.0) {
        (Some(index), distance) => after[0] = Limit { index, distance },
        (None, _) => after[0] = Limit { index: 0, distance: 0.0 },
    }
    for i in 1..n.saturating_sub(1) {
        let seed = after[i - 1].distance - track.max_delta;
        match crate::query::furthest_from(track, i, i + 1, n, seed) {
            (Some(index), distance) => after[i] = Limit { index, distance },
            (None, _) => after[i] = after[i - 1],
        }
    }
    after[n - 1] = Limit {
        index: n - 1,
        distance: 0.0,
    };
    after
}

impl Track {
    pub(crate) fn igc_bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.igc_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Validity;

    fn trkpt(lat: i32, lon: i32) -> Trkpt {
        Trkpt {
            time: 0,
            lat,
            lon,
            val: Validity::Valid,
            alt: 0,
            ele: 0,
        }
    }

    fn straight_line(n: i32, step: i32) -> Track {
        let pts: Vec<Trkpt> = (0..n).map(|i| trkpt(0, i * step)).collect();
        let mut track = Track::from_trkpts(pts);
        track.preprocess();
        track
    }

    #[test]
    fn sigma_delta_upper_bounds_chord_distance() {
        let track = straight_line(50, 600);
        for i in 0..track.len() {
            for j in i..track.len() {
                let chord = delta(&track, i, j);
                assert!(chord <= track.sigma_delta[j] - track.sigma_delta[i] + 1e-12);
            }
        }
    }

    #[test]
    fn sigma_delta_is_monotone() {
        let track = straight_line(50, 600);
        for i in 1..track.len() {
            assert!(track.sigma_delta[i] >= track.sigma_delta[i - 1]);
        }
    }

    #[test]
    fn max_delta_bounds_every_step() {
        let track = straight_line(50, 600);
        for i in 0..track.len() - 1 {
            assert!(delta(&track, i, i + 1) <= track.max_delta + 1e-12);
        }
    }

    #[test]
    fn before_matches_brute_force() {
        let track = straight_line(60, 600);
        for i in 0..track.len() {
            let expected = (0..=i)
                .map(|k| delta(&track, k, i))
                .fold(0.0_f64, f64::max);
            assert_approx_eq::assert_approx_eq!(track.before[i].distance, expected, 1e-9);
        }
    }

    #[test]
    fn after_matches_brute_force() {
        let track = straight_line(60, 600);
        let n = track.len();
        for i in 0..n {
            let expected = (i..n).map(|k| delta(&track, k, i)).fold(0.0_f64, f64::max);
            assert_approx_eq::assert_approx_eq!(track.after[i].distance, expected, 1e-9);
        }
    }

    #[test]
    fn circuit_tables_respect_closure_radius() {
        let mut track = straight_line(200, 60);
        let eps = 100.0 * 60.0 * std::f64::consts::PI / (180.0 * 60000.0);
        track.compute_circuit_tables(eps);
        let last_finish = track.last_finish.as_ref().unwrap();
        let n = track.len();
        for i in 0..n {
            let j = last_finish[i];
            assert!(delta(&track, i, j) <= eps);
            for k in (j + 1)..n {
                assert!(delta(&track, i, k) > eps);
            }
        }
    }

    #[test]
    fn best_start_realises_the_running_maximum() {
        let mut track = straight_line(200, 60);
        let eps = 100.0 * 60.0 * std::f64::consts::PI / (180.0 * 60000.0);
        track.compute_circuit_tables(eps);
        let last_finish = track.last_finish.as_ref().unwrap();
        let best_start = track.best_start.as_ref().unwrap();
        for i in 0..track.len() {
            let expected = (0..=i).max_by_key(|&s| last_finish[s]).unwrap();
            assert_eq!(last_finish[best_start[i]], last_finish[expected]);
        }
    }

    #[test]
    fn idempotent_preprocess() {
        let mut track = straight_line(40, 600);
        let sigma_before = track.sigma_delta.clone();
        track.preprocess();
        assert_eq!(sigma_before, track.sigma_delta);
    }

    #[test]
    fn degenerate_single_fix_track_has_no_tables() {
        let mut track = Track::from_trkpts(vec![trkpt(0, 0)]);
        track.preprocess();
        assert_eq!(track.before.len(), 1);
        assert_eq!(track.after.len(), 1);
        assert_eq!(track.before[0].distance, 0.0);
        assert_eq!(track.after[0].distance, 0.0);
    }
}
