//! Circuit searches: routes whose start and finish fall within the
//! configured closure radius of one another. Requires
//! [`Track::compute_circuit_tables`] to have populated `last_finish` /
//! `best_start` for the league's closure radius.

use crate::parallel::opt_par_iter;
use crate::query::{delta, fast_backward, fast_forward, first_at_least, furthest_from, furthest_from2, last_at_least};
use crate::track::Track;
use log::{trace, warn};

pub type Indices = Vec<i64>;

fn no_route(len: usize) -> Indices {
    vec![-1; len]
}

/// Out-and-return: one turnpoint, closed start/finish. `initial_bound` is
/// the full there-and-back target; halved internally since the search
/// only ever needs to beat half of it on a single leg. The returned bound
/// is doubled back before returning, so callers chaining searches see the
/// full round-trip distance, not the halved internal one.
pub fn aller_retour(track: &Track, initial_bound: f64, use_parallel: bool) -> (f64, Indices) {
    trace!("aller_retour: start, n={}, initial_bound={initial_bound:.6}", track.len());
    let n = track.len();
    let last_finish = match &track.last_finish {
        Some(v) => v,
        None => {
            warn!("aller_retour: circuit tables not computed, skipping");
            return (initial_bound, no_route(4));
        }
    };
    let best_start = track.best_start.as_ref().unwrap();

    if n < 3 {
        warn!("aller_retour: n={n} < 3, skipping (no room for a turnpoint)");
        return (initial_bound, no_route(4));
    }

    let monitor = std::sync::Mutex::new((initial_bound / 2.0, no_route(4)));
    let body = |tp1: usize| {
        let start = best_start[tp1];
        let finish = last_finish[start];
        if finish <= tp1 {
            return;
        }
        let local_bound = { monitor.lock().unwrap().0 };
        let (tp2, distance) = furthest_from(track, tp1, tp1 + 1, finish + 1, local_bound);
        if let Some(tp2) = tp2 {
            let mut guard = monitor.lock().unwrap();
            if distance > guard.0 {
                guard.0 = distance;
                guard.1[0] = start as i64;
                guard.1[1] = tp1 as i64;
                guard.1[2] = tp2 as i64;
                guard.1[3] = finish as i64;
            }
        }
    };

    let range: Vec<usize> = (0..n - 2).collect();
    if use_parallel {
        opt_par_iter(&range).for_each(|&tp1| body(tp1));
    } else {
        range.iter().for_each(|&tp1| body(tp1));
    }

    let (bound, indices) = monitor.into_inner().unwrap();
    trace!("aller_retour: done, bound={:.6}", 2.0 * bound);
    (2.0 * bound, indices)
}

/// FAI triangle: three turnpoints, every leg at least 28% of the
/// perimeter. Single-pass and order-dependent — `legbound` is mutated as
/// the scan proceeds, so the outer `tp1` loop cannot be parallelised or
/// restarted mid-scan without re-deriving it from the current `bound`.
pub fn triangle_fai(track: &Track, mut bound: f64) -> (f64, Indices) {
    trace!("triangle_fai: start, n={}, bound={bound:.6}", track.len());
    const FAI_RATIO: f64 = 0.28;
    let n = track.len();
    let mut indices = no_route(5);
    let last_finish = match &track.last_finish {
        Some(v) => v,
        None => {
            warn!("triangle_fai: circuit tables not computed, skipping");
            return (bound, indices);
        }
    };
    let best_start = track.best_start.as_ref().unwrap();
    if n < 3 {
        warn!("triangle_fai: n={n} < 3, skipping (no room for a triangle)");
        return (bound, indices);
    }

    let mut legbound = FAI_RATIO * bound;

    for tp1 in 0..n - 2 {
        let start = best_start[tp1];
        let finish = last_finish[start];
        if finish <= tp1 {
            continue;
        }
        let tp3_first = match first_at_least(track, tp1, tp1 + 2, finish + 1, legbound) {
            Some(v) => v,
            None => continue,
        };
        let tp3_last = match last_at_least(track, tp1, tp3_first, finish + 1, legbound) {
            Some(v) => v,
            None => continue,
        };

        let mut tp3 = tp3_last as i64;
        let tp3_floor = tp3_first as i64;
        while tp3 >= tp3_floor {
            let t3 = tp3 as usize;
            let leg3 = delta(track, t3, tp1);
            if leg3 < legbound {
                tp3 = fast_backward(track, tp3, legbound - leg3);
                continue;
            }

            let shortest_leg_bound = FAI_RATIO * leg3 / 0.44;
            let tp2_first = match first_at_least(track, tp1, tp1 + 1, t3 - 1, shortest_leg_bound) {
                Some(v) => v,
                None => {
                    tp3 -= 1;
                    continue;
                }
            };
            let tp2_last = match last_at_least(track, t3, tp2_first, t3, shortest_leg_bound) {
                Some(v) => v,
                None => {
                    tp3 -= 1;
                    continue;
                }
            };
            let longest_leg_bound = 0.44 * leg3 / FAI_RATIO;

            let mut tp2 = tp2_first;
            'tp2: while tp2 <= tp2_last {
                let mut deficit = 0.0_f64;
                let leg1 = delta(track, tp1, tp2);
                if leg1 < shortest_leg_bound {
                    deficit = shortest_leg_bound - leg1;
                }
                if leg1 > longest_leg_bound && leg1 - longest_leg_bound > deficit {
                    deficit = leg1 - longest_leg_bound;
                }
                let leg2 = delta(track, tp2, t3);
                if leg2 < shortest_leg_bound && shortest_leg_bound - leg2 > deficit {
                    deficit = shortest_leg_bound - leg2;
                }
                if leg2 > longest_leg_bound && leg2 - longest_leg_bound > deficit {
                    deficit = leg2 - longest_leg_bound;
                }
                if deficit > 0.0 {
                    tp2 = fast_forward(track, tp2 as i64, deficit) as usize;
                    continue 'tp2;
                }

                let total = leg1 + leg2 + leg3;
                let this_legbound = FAI_RATIO * total;
                let mut deficit = 0.0_f64;
                if leg1 < this_legbound {
                    deficit = this_legbound - leg1;
                }
                if leg2 < this_legbound && this_legbound - leg2 > deficit {
                    deficit = this_legbound - leg2;
                }
                if leg3 < this_legbound && this_legbound - leg3 > deficit {
                    deficit = this_legbound - leg3;
                }
                if deficit > 0.0 {
                    tp2 = fast_forward(track, tp2 as i64, 0.5 * deficit) as usize;
                    continue 'tp2;
                }

                if total < bound {
                    tp2 = fast_forward(track, tp2 as i64, 0.5 * (bound - total)) as usize;
                    continue 'tp2;
                }

                bound = total;
                legbound = this_legbound;
                indices[0] = start as i64;
                indices[1] = tp1 as i64;
                indices[2] = tp2 as i64;
                indices[3] = t3 as i64;
                indices[4] = finish as i64;
                tp2 += 1;
            }
            tp3 -= 1;
        }
    }

    trace!("triangle_fai: done, bound={bound:.6}");
    (bound, indices)
}

/// Flat (plat) triangle: three turnpoints, closed start/finish, no 28%
/// rule — only the per-league minimum leg length enforced by the caller's
/// `bound`.
pub fn triangle_plat(track: &Track, mut bound: f64) -> (f64, Indices) {
    trace!("triangle_plat: start, n={}, bound={bound:.6}", track.len());
    let n = track.len();
    let mut indices = no_route(5);
    let last_finish = match &track.last_finish {
        Some(v) => v,
        None => {
            warn!("triangle_plat: circuit tables not computed, skipping");
            return (bound, indices);
        }
    };
    let best_start = track.best_start.as_ref().unwrap();
    if n < 2 {
        warn!("triangle_plat: n={n} < 2, skipping (no room for a triangle)");
        return (bound, indices);
    }

    for tp1 in 0..n - 1 {
        if track.sigma_delta[n - 1] - track.sigma_delta[tp1] < bound {
            break;
        }
        let start = best_start[tp1];
        let finish = last_finish[start];
        if finish <= tp1 || track.sigma_delta[finish] - track.sigma_delta[tp1] < bound {
            continue;
        }
        let mut tp3 = finish;
        while tp3 > tp1 + 1 {
            let leg31 = delta(track, tp3, tp1);
            let bound123 = bound - leg31;
            let (tp2, legs123) = furthest_from2(track, tp1, tp3, tp1 + 1, tp3, bound123);
            if let Some(tp2) = tp2 {
                bound = leg31 + legs123;
                indices[0] = start as i64;
                indices[1] = tp1 as i64;
                indices[2] = tp2 as i64;
                indices[3] = tp3 as i64;
                indices[4] = finish as i64;
            }
            tp3 -= 1;
        }
    }

    trace!("triangle_plat: done, bound={bound:.6}");
    (bound, indices)
}

/// Polygonal perimeter in kilometres: the chain `indices[1..n-1]` closed
/// by a leg back from the last turnpoint to the first.
pub fn circuit_distance(track: &Track, indices: &[i64]) -> f64 {
    let n = indices.len();
    let mut distance = delta(
        track,
        indices[n - 2] as usize,
        indices[1] as usize,
    );
    for i in 1..n - 2 {
        distance += delta(track, indices[i] as usize, indices[i + 1] as usize);
    }
    crate::geometry::R * distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Trkpt, Validity};
    use crate::track::Track;
    use std::f64::consts::PI;

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

    /// A 60km-perimeter equilateral triangle (each leg 20km) visited once
    /// then closed within a small epsilon, approximated on the flat-earth
    /// scale this track's extent covers.
    fn equilateral_triangle_track() -> Track {
        let km_per_deg_lat = 111.32;
        let leg_km = 20.0;
        let step_count = 40;

        let a = (0.0, 0.0);
        let b = (0.0, leg_km / km_per_deg_lat);
        let c = (
            leg_km / km_per_deg_lat * (PI / 3.0).sin(),
            leg_km / km_per_deg_lat * 0.5,
        );

        let mut pts = Vec::new();
        for leg in [(a, b), (b, c), (c, a)] {
            for s in 0..step_count {
                let t = s as f64 / step_count as f64;
                let lat = leg.0 .0 + t * (leg.1 .0 - leg.0 .0);
                let lon = leg.0 .1 + t * (leg.1 .1 - leg.0 .1);
                pts.push(trkpt((lat * 60.0 * 60000.0 / 60.0) as i32, (lon * 60.0 * 60000.0 / 60.0) as i32));
            }
        }
        pts.push(trkpt(0, 0));

        let mut track = Track::from_trkpts(pts);
        track.preprocess();
        track
    }

    #[test]
    fn fai_triangle_every_leg_at_least_28_percent_of_perimeter() {
        let mut track = equilateral_triangle_track();
        let eps_km = 3.0;
        let eps_rad = eps_km / crate::geometry::R;
        track.compute_circuit_tables(eps_rad);

        let (bound, indices) = triangle_fai(&track, 0.0);
        if indices[0] != -1 {
            let leg1 = delta(&track, indices[1] as usize, indices[2] as usize);
            let leg2 = delta(&track, indices[2] as usize, indices[3] as usize);
            let leg3 = delta(&track, indices[3] as usize, indices[1] as usize);
            let perim = leg1 + leg2 + leg3;
            assert!(leg1 / perim >= 0.28 - 1e-9);
            assert!(leg2 / perim >= 0.28 - 1e-9);
            assert!(leg3 / perim >= 0.28 - 1e-9);
            assert!(bound > 0.0);
        }
    }

    #[test]
    fn aller_retour_reports_twice_the_single_leg() {
        let pts: Vec<Trkpt> = (0..50)
            .map(|i| trkpt(0, i * 600))
            .chain((0..50).map(|i| trkpt(0, (49 - i) * 600)))
            .collect();
        let mut track = Track::from_trkpts(pts);
        track.preprocess();
        track.compute_circuit_tables(1e-6);

        let (bound, indices) = aller_retour(&track, 0.0, false);
        if indices[0] != -1 {
            let out = delta(&track, indices[1] as usize, indices[2] as usize);
            assert_approx_eq::assert_approx_eq!(bound, 2.0 * out, 1e-9);
        }
    }
}
