//! Monotone-skip search primitives over a preprocessed [`crate::track::Track`].
//!
//! Every primitive here exploits the same fact: for adjacent fixes `j` and
//! `j+k`, `|delta(i,j) - delta(i,j+k)| <= sigma_delta[j+k] - sigma_delta[j]
//! <= k * max_delta`. So once a candidate at `j` is short of a target bound
//! by `d`, advancing fewer than `d / max_delta` steps cannot possibly reach
//! it, and the loop can jump instead of scanning one index at a time. This
//! turns what would be O(n) (or O(n^2), O(n^3)...) linear scans into
//! amortized sub-linear ones for the realistic case where the bound rarely
//! needs to move far to find the next improvement.
//!
//! Indices are carried as `i64` through this module (not `usize`) because
//! the skip step can legitimately walk a cursor past the end (or before
//! the start) of the valid range; that overshoot is the loop's exit
//! condition, not an error.

use crate::track::Track;
use log::trace;

#[inline]
fn step_forward(max_delta: f64, i: i64, d: f64) -> i64 {
    let step = (d / max_delta) as i64;
    if step > 0 {
        i + step
    } else {
        i + 1
    }
}

#[inline]
fn step_backward(max_delta: f64, i: i64, d: f64) -> i64 {
    let step = (d / max_delta) as i64;
    if step > 0 {
        i - step
    } else {
        i - 1
    }
}

/// Advances `i` by at least one step, and by enough steps that the
/// cumulative arc length could plausibly cover `d` more radians, without
/// ever stepping past a fix that might still beat the current bound.
pub(crate) fn fast_forward(track: &Track, i: i64, d: f64) -> i64 {
    let n = track.len() as i64;
    if i >= n {
        return i;
    }
    let target = track.sigma_delta[i as usize] + d;
    let mut j = step_forward(track.max_delta, i, d);
    while j < n {
        let error = target - track.sigma_delta[j as usize];
        if error <= 0.0 {
            return j;
        }
        j = step_forward(track.max_delta, j, error);
    }
    j
}

/// Symmetric to [`fast_forward`], walking toward index 0.
pub(crate) fn fast_backward(track: &Track, i: i64, d: f64) -> i64 {
    if i < 0 {
        return i;
    }
    let target = track.sigma_delta[i as usize] - d;
    let mut j = step_backward(track.max_delta, i, d);
    while j >= 0 {
        let error = track.sigma_delta[j as usize] - target;
        if error <= 0.0 {
            return j;
        }
        j = step_backward(track.max_delta, j, error);
    }
    j
}

/// Angular distance between fixes `i` and `j`.
pub fn delta(track: &Track, i: usize, j: usize) -> f64 {
    crate::geometry::coord_delta(&track.coords[i], &track.coords[j])
}

/// Finds the fix in `[begin, end)` furthest from `i`, provided it beats
/// `bound`. Returns the running bound alongside the index so the caller
/// can chain searches, each one tightening the next.
///
/// Ties are broken toward the first index that reaches the current best:
/// later fixes at the same distance do not replace it.
pub(crate) fn furthest_from(
    track: &Track,
    i: usize,
    begin: usize,
    end: usize,
    mut bound: f64,
) -> (Option<usize>, f64) {
    trace!("furthest_from: i={i}, range=[{begin},{end}), bound={bound:.6}");
    let mut result = None;
    let mut j = begin as i64;
    let end = end as i64;
    while j < end {
        let d = delta(track, i, j as usize);
        if d > bound {
            bound = d;
            result = Some(j as usize);
            j += 1;
        } else {
            j = fast_forward(track, j, bound - d);
        }
    }
    (result, bound)
}

/// Finds the fix in `[begin, end)` nearest to `i`, provided it beats
/// (is closer than) `bound`.
pub(crate) fn nearest_to(
    track: &Track,
    i: usize,
    begin: usize,
    end: usize,
    mut bound: f64,
) -> (Option<usize>, f64) {
    trace!("nearest_to: i={i}, range=[{begin},{end}), bound={bound:.6}");
    let mut result = None;
    let mut j = begin as i64;
    let end = end as i64;
    while j < end {
        let d = delta(track, i, j as usize);
        if d < bound {
            result = Some(j as usize);
            bound = d;
            j += 1;
        } else {
            j = fast_forward(track, j, d - bound);
        }
    }
    (result, bound)
}

/// Finds the fix `k` in `[begin, end)` maximizing `delta(i,k) + delta(k,j)`,
/// provided it beats `bound`. The skip step halves the shortfall because
/// each unit step can change each of the two legs by at most `max_delta`,
/// so it can change their sum by at most `2 * max_delta`.
pub(crate) fn furthest_from2(
    track: &Track,
    i: usize,
    j: usize,
    begin: usize,
    end: usize,
    mut bound: f64,
) -> (Option<usize>, f64) {
    trace!("furthest_from2: i={i}, j={j}, range=[{begin},{end}), bound={bound:.6}");
    let mut result = None;
    let mut k = begin as i64;
    let end = end as i64;
    while k < end {
        let d = delta(track, i, k as usize) + delta(track, k as usize, j);
        if d > bound {
            result = Some(k as usize);
            bound = d;
            k += 1;
        } else {
            k = fast_forward(track, k, (bound - d) / 2.0);
        }
    }
    (result, bound)
}

/// First index in `[begin, end)` whose distance from `i` exceeds `bound`.
pub(crate) fn first_at_least(
    track: &Track,
    i: usize,
    begin: usize,
    end: usize,
    bound: f64,
) -> Option<usize> {
    trace!("first_at_least: i={i}, range=[{begin},{end}), bound={bound:.6}");
    let mut j = begin as i64;
    let end = end as i64;
    while j < end {
        let d = delta(track, i, j as usize);
        if d > bound {
            return Some(j as usize);
        }
        j = fast_forward(track, j, bound - d);
    }
    None
}

/// Last index in `[begin, end)` whose distance from `i` exceeds `bound`.
pub(crate) fn last_at_least(
    track: &Track,
    i: usize,
    begin: usize,
    end: usize,
    bound: f64,
) -> Option<usize> {
    trace!("last_at_least: i={i}, range=[{begin},{end}), bound={bound:.6}");
    let mut j = end as i64 - 1;
    let begin = begin as i64;
    while j >= begin {
        let d = delta(track, i, j as usize);
        if d > bound {
            return Some(j as usize);
        }
        j = fast_backward(track, j, bound - d);
    }
    None
}

/// First index in `[begin, end)` within `radius` of an arbitrary `coord`
/// (not necessarily a fix on the track). Used by task-declaration cylinder
/// queries.
pub fn first_inside(
    track: &Track,
    coord: &crate::geometry::Coord,
    radius: f64,
    begin: usize,
    end: usize,
) -> Option<usize> {
    trace!("first_inside: range=[{begin},{end}), radius={radius:.6}");
    let mut i = begin as i64;
    let end = end as i64;
    while i < end {
        let d = crate::geometry::coord_delta(coord, &track.coords[i as usize]);
        if d <= radius {
            return Some(i as usize);
        }
        i = step_forward_for_radius(track, i, d - radius);
    }
    None
}

/// First index in `[begin, end)` outside `radius` of an arbitrary `coord`.
pub fn first_outside(
    track: &Track,
    coord: &crate::geometry::Coord,
    radius: f64,
    begin: usize,
    end: usize,
) -> Option<usize> {
    trace!("first_outside: range=[{begin},{end}), radius={radius:.6}");
    let mut i = begin as i64;
    let end = end as i64;
    while i < end {
        let d = crate::geometry::coord_delta(coord, &track.coords[i as usize]);
        if d > radius {
            return Some(i as usize);
        }
        i = step_forward_for_radius(track, i, d - radius);
    }
    None
}

#[inline]
fn step_forward_for_radius(track: &Track, i: i64, d: f64) -> i64 {
    step_forward(track.max_delta, i, d)
}
