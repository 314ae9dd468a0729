//! Open-distance searches: the chain of `k+2` fixes (`k` intermediate
//! turnpoints, `k` in `{0,1,2,3}`) maximizing summed great-circle legs.
//!
//! Every search takes and returns a running `bound`, so a league pipeline
//! can chain them — each successive search starts already tightened by
//! the previous one's result.

use crate::parallel::opt_par_iter;
use crate::query::{fast_forward, furthest_from};
use crate::track::Track;
use log::{trace, warn};

/// `indices[0] != -1` signals a route was found; `-1` fills the unused
/// slots otherwise. Mirrors the sentinel convention of the monotone-skip
/// search family this module is built on.
pub type Indices = Vec<i64>;

fn no_route(len: usize) -> Indices {
    vec![-1; len]
}

/// k=0: the straight open-distance leg, no intermediate turnpoints.
pub fn open_distance0(track: &Track, mut bound: f64) -> (f64, Indices) {
    trace!("open_distance0: start, n={}, bound={bound:.6}", track.len());
    let n = track.len();
    let mut indices = no_route(2);
    if n < 2 {
        warn!("open_distance0: n={n} < 2, skipping (no leg possible)");
        return (bound, indices);
    }
    for start in 0..n - 1 {
        let (finish, new_bound) = furthest_from(track, start, start + 1, n, bound);
        bound = new_bound;
        if let Some(finish) = finish {
            // The bound already enforces monotonicity (furthest_from only
            // ever improves it), so taking this iteration's result
            // unconditionally as the new best is semantically equivalent
            // to re-checking `new_bound > previous bound` here.
            indices[0] = start as i64;
            indices[1] = finish as i64;
        }
    }
    trace!("open_distance0: done, bound={bound:.6}");
    (bound, indices)
}

/// k=1: one intermediate turnpoint, read off the `before`/`after` tables.
pub fn open_distance1(track: &Track, mut bound: f64) -> (f64, Indices) {
    trace!("open_distance1: start, n={}, bound={bound:.6}", track.len());
    let n = track.len();
    let mut indices = no_route(3);
    if n < 3 {
        warn!("open_distance1: n={n} < 3, skipping (no room for an intermediate turnpoint)");
        return (bound, indices);
    }
    let mut tp1 = 1_i64;
    let end = (n - 1) as i64;
    while tp1 < end {
        let t = tp1 as usize;
        let total = track.before[t].distance + track.after[t].distance;
        if total > bound {
            indices[0] = track.before[t].index as i64;
            indices[1] = tp1;
            indices[2] = track.after[t].index as i64;
            bound = total;
            tp1 += 1;
        } else {
            tp1 = fast_forward(track, tp1, 0.5 * (bound - total));
        }
    }
    trace!("open_distance1: done, bound={bound:.6}");
    (bound, indices)
}

/// k=2: two intermediate turnpoints. The outer `tp1` loop is parallelised
/// (dynamic-scheduling in spirit: `rayon`'s work-stealing `par_iter`); the
/// shared `(bound, indices)` pair is a mutex-protected monitor. A reader
/// that loses the race to a concurrent writer just does strictly more
/// work — `bound` is monotone non-decreasing and every skip primitive
/// stays correct under an understated bound.
pub fn open_distance2(track: &Track, bound: f64, use_parallel: bool) -> (f64, Indices) {
    trace!("open_distance2: start, n={}, bound={bound:.6}", track.len());
    let n = track.len();
    if n < 4 {
        warn!("open_distance2: n={n} < 4, skipping (no room for two intermediate turnpoints)");
        return (bound, no_route(4));
    }
    let monitor = std::sync::Mutex::new((bound, no_route(4)));
    let body = |tp1: usize| {
        let leg1 = track.before[tp1].distance;
        let mut tp2 = (tp1 + 1) as i64;
        let end = (n - 1) as i64;
        while tp2 < end {
            let t2 = tp2 as usize;
            let distance = leg1 + crate::query::delta(track, tp1, t2) + track.after[t2].distance;
            let local_bound = { monitor.lock().unwrap().0 };
            if distance > local_bound {
                let mut guard = monitor.lock().unwrap();
                if distance > guard.0 {
                    guard.0 = distance;
                    guard.1[0] = track.before[tp1].index as i64;
                    guard.1[1] = tp1 as i64;
                    guard.1[2] = tp2;
                    guard.1[3] = track.after[t2].index as i64;
                }
                tp2 += 1;
            } else {
                tp2 = fast_forward(track, tp2, 0.5 * (local_bound - distance));
            }
        }
    };

    let range: Vec<usize> = (1..n - 2).collect();
    if use_parallel {
        opt_par_iter(&range).for_each(|&tp1| body(tp1));
    } else {
        range.iter().for_each(|&tp1| body(tp1));
    }

    let (bound, indices) = monitor.into_inner().unwrap();
    trace!("open_distance2: done, bound={bound:.6}");
    (bound, indices)
}

/// k=3: three intermediate turnpoints, same monitor-based parallel outer
/// loop as `open_distance2`.
pub fn open_distance3(track: &Track, bound: f64, use_parallel: bool) -> (f64, Indices) {
    trace!("open_distance3: start, n={}, bound={bound:.6}", track.len());
    let n = track.len();
    if n < 5 {
        warn!("open_distance3: n={n} < 5, skipping (no room for three intermediate turnpoints)");
        return (bound, no_route(5));
    }
    let monitor = std::sync::Mutex::new((bound, no_route(5)));
    let body = |tp1: usize| {
        let leg1 = track.before[tp1].distance;
        for tp2 in (tp1 + 1)..(n - 2) {
            let leg2 = crate::query::delta(track, tp1, tp2);
            let mut tp3 = (tp2 + 1) as i64;
            let end = (n - 1) as i64;
            while tp3 < end {
                let t3 = tp3 as usize;
                let distance =
                    leg1 + leg2 + crate::query::delta(track, tp2, t3) + track.after[t3].distance;
                let local_bound = { monitor.lock().unwrap().0 };
                if distance > local_bound {
                    let mut guard = monitor.lock().unwrap();
                    if distance > guard.0 {
                        guard.0 = distance;
                        guard.1[0] = track.before[tp1].index as i64;
                        guard.1[1] = tp1 as i64;
                        guard.1[2] = tp2 as i64;
                        guard.1[3] = tp3;
                        guard.1[4] = track.after[t3].index as i64;
                    }
                    tp3 += 1;
                } else {
                    tp3 = fast_forward(track, tp3, 0.5 * (local_bound - distance));
                }
            }
        }
    };

    let range: Vec<usize> = (1..n - 3).collect();
    if use_parallel {
        opt_par_iter(&range).for_each(|&tp1| body(tp1));
    } else {
        range.iter().for_each(|&tp1| body(tp1));
    }

    let (bound, indices) = monitor.into_inner().unwrap();
    trace!("open_distance3: done, bound={bound:.6}");
    (bound, indices)
}
