//! League orchestrators: deterministic per-league pipelines, each step
//! consuming and tightening a shared bound so later searches prune
//! aggressively.

use crate::geometry::R;
use crate::point::Trkpt;
use crate::search::{circuit, open};
use crate::track::Track;
use itertools::Itertools;
use log::{debug, warn};
use ord_subset::OrdSubsetSliceExt;
use ordered_float::OrderedFloat;

/// A scored candidate route, as produced by a league pipeline.
#[derive(Clone, Debug)]
pub struct Route {
    pub league: &'static str,
    pub route_type: &'static str,
    pub distance_km: f64,
    pub multiplier: f64,
    pub circuit: bool,
    pub waypoints: Vec<(Trkpt, &'static str)>,
}

impl Route {
    pub fn scored_distance_km(&self) -> f64 {
        self.distance_km * self.multiplier
    }

    fn new(
        league: &'static str,
        route_type: &'static str,
        distance_km: f64,
        multiplier: f64,
        circuit: bool,
        track: &Track,
        indices: &[i64],
        names: &[&'static str],
    ) -> Self {
        let waypoints = indices
            .iter()
            .zip(names.iter())
            .map(|(&idx, &name)| (track.trkpts[idx as usize], name))
            .collect();
        Route {
            league,
            route_type,
            distance_km,
            multiplier,
            circuit,
            waypoints,
        }
    }
}

/// The three recognized leagues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum League {
    /// FFVL Coupe Fédérale de Distance (France).
    Frcfd,
    /// UK National XC League.
    Uknxcl,
    /// UK Cross Country League.
    Ukxcl,
}

impl std::str::FromStr for League {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frcfd" => Ok(League::Frcfd),
            "uknxcl" => Ok(League::Uknxcl),
            "ukxcl" => Ok(League::Ukxcl),
            other => Err(crate::error::Error::UnknownLeague(other.to_string())),
        }
    }
}

impl League {
    pub fn name(&self) -> &'static str {
        match self {
            League::Frcfd => "Coupe Fédérale de Distance (France)",
            League::Uknxcl => "UK National XC League",
            League::Ukxcl => "Cross Country League (United Kingdom)",
        }
    }
}

/// `complexity` of `-1` means "run the league's full pipeline"; any other
/// value cuts it off after the documented gate.
fn gate(complexity: i32, min: i32) -> bool {
    complexity == -1 || complexity >= min
}

/// Runs `league`'s scoring pipeline over `track`, producing the routes it
/// finds. `complexity` truncates the pipeline (`-1` runs everything);
/// `declaration` is accepted for interface stability but not consulted —
/// integrating declared-task cylinders into scoring is future work (see
/// DESIGN.md). Uses each league's documented closure radius; see
/// [`optimize_with_epsilon`] to override it.
pub fn optimize(
    track: &mut Track,
    league: League,
    complexity: i32,
    declaration: Option<&[crate::point::Wpt]>,
) -> Vec<Route> {
    optimize_with_epsilon(track, league, complexity, declaration, None)
}

/// Same as [`optimize`], but `epsilon_km` overrides the league's documented
/// closure radius (FFVL 3 km, UK National 0.4 km) when present. Ignored by
/// `Ukxcl`, which has no closure-based routes.
pub fn optimize_with_epsilon(
    track: &mut Track,
    league: League,
    complexity: i32,
    _declaration: Option<&[crate::point::Wpt]>,
    epsilon_km: Option<f64>,
) -> Vec<Route> {
    let mut routes = match league {
        League::Frcfd => optimize_frcfd(track, complexity, epsilon_km),
        League::Uknxcl => optimize_uknxcl(track, complexity, epsilon_km),
        League::Ukxcl => optimize_ukxcl(track, complexity),
    };

    // Best-scored first: a league pipeline naturally yields its routes in
    // search order (open distance, then circuits), not in scoring order.
    routes.ord_subset_sort_by_key(|r| std::cmp::Reverse(OrderedFloat(r.scored_distance_km())));

    log::debug!(
        "{}: found {}",
        league.name(),
        routes.iter().map(|r| r.route_type).join(", ")
    );

    routes
}

fn optimize_frcfd(track: &mut Track, complexity: i32, epsilon_km: Option<f64>) -> Vec<Route> {
    let league = League::Frcfd;
    let name = league.name();
    let mut routes = Vec::new();

    let (mut bound, indices) = open::open_distance0(track, 0.0);
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "distance libre sans point de contournement",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["BD", "BA"],
        ));
    }
    debug!("{name}: open0 done, bound={bound:.6}");
    if !gate(complexity, 1) {
        warn!("{name}: complexity={complexity} gates out step 1 (open1), stopping after open0");
        return routes;
    }

    let (new_bound, indices) = open::open_distance1(track, bound);
    bound = new_bound;
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "distance libre avec un point de contournement",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["BD", "B1", "BA"],
        ));
    }
    debug!("{name}: open1 done, bound={bound:.6}");
    if !gate(complexity, 2) {
        warn!("{name}: complexity={complexity} gates out step 2 (open2), stopping after open1");
        return routes;
    }

    let (new_bound, indices) = open::open_distance2(track, bound, true);
    bound = new_bound;
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "distance libre avec deux points de contournement",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["BD", "B1", "B2", "BA"],
        ));
    }
    debug!("{name}: open2 done, bound={bound:.6}");

    track.compute_circuit_tables(epsilon_km.unwrap_or(3.0) / R);

    let (new_bound, indices) = circuit::aller_retour(track, 15.0 / R, true);
    bound = new_bound;
    if indices[0] != -1 {
        let distance = circuit::circuit_distance(track, &indices);
        routes.push(Route::new(
            name,
            "parcours en aller-retour",
            distance,
            1.2,
            true,
            track,
            &indices,
            &["BD", "B1", "B2", "BA"],
        ));
    }
    debug!("{name}: aller_retour done, bound={bound:.6}");
    if !gate(complexity, 3) {
        warn!("{name}: complexity={complexity} gates out step 3 (triangles), stopping after aller_retour");
        return routes;
    }

    let (new_bound, indices) = circuit::triangle_fai(track, bound);
    bound = new_bound;
    if indices[0] != -1 {
        let distance = circuit::circuit_distance(track, &indices);
        routes.push(Route::new(
            name,
            "triangle FAI",
            distance,
            1.4,
            true,
            track,
            &indices,
            &["BD", "B1", "B2", "B3", "BA"],
        ));
    }
    debug!("{name}: triangle_fai done, bound={bound:.6}");

    let (_bound, indices) = circuit::triangle_plat(track, bound);
    if indices[0] != -1 {
        let distance = circuit::circuit_distance(track, &indices);
        routes.push(Route::new(
            name,
            "triangle plat",
            distance,
            1.2,
            true,
            track,
            &indices,
            &["BD", "B1", "B2", "B3", "BA"],
        ));
    }
    debug!("{name}: triangle_plat done, bound={_bound:.6}");

    // FFVL quadrilatère is out of scope (same TODO the scoring engine this
    // is modeled on leaves unimplemented).

    routes
}

fn optimize_uknxcl(track: &mut Track, complexity: i32, epsilon_km: Option<f64>) -> Vec<Route> {
    let league = League::Uknxcl;
    let name = league.name();
    let mut routes = Vec::new();

    let (mut bound, indices) = open::open_distance0(track, 0.0);
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "open distance",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["Start", "Finish"],
        ));
    }
    debug!("{name}: open0 done, bound={bound:.6}");
    if !gate(complexity, 1) {
        warn!("{name}: complexity={complexity} gates out step 1 (open1), stopping after open0");
        return routes;
    }

    let (new_bound, indices) = open::open_distance1(track, bound);
    bound = new_bound;
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "open distance via a turnpoint",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["Start", "TP1", "Finish"],
        ));
    }
    debug!("{name}: open1 done, bound={bound:.6}");
    if !gate(complexity, 2) {
        warn!("{name}: complexity={complexity} gates out step 2 (open2), stopping after open1");
        return routes;
    }

    let (new_bound, indices) = open::open_distance2(track, bound, true);
    bound = new_bound;
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "open distance via two turnpoints",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["Start", "TP1", "TP2", "Finish"],
        ));
    }
    debug!("{name}: open2 done, bound={bound:.6}");

    track.compute_circuit_tables(epsilon_km.unwrap_or(0.4) / R);

    let (new_bound, indices) = circuit::aller_retour(track, 15.0 / R, true);
    bound = new_bound;
    if indices[0] != -1 {
        let distance = circuit::circuit_distance(track, &indices);
        routes.push(Route::new(
            name,
            "out and return via a turnpoint",
            distance,
            2.0,
            true,
            track,
            &indices,
            &["Start", "TP1", "TP2", "Finish"],
        ));
    }
    debug!("{name}: aller_retour done, bound={bound:.6}");
    if !gate(complexity, 3) {
        warn!("{name}: complexity={complexity} gates out step 3 (triangles), stopping after aller_retour");
        return routes;
    }

    let (new_bound, indices) = circuit::triangle_fai(track, bound);
    bound = new_bound;
    if indices[0] != -1 {
        let distance = circuit::circuit_distance(track, &indices);
        routes.push(Route::new(
            name,
            "FAI triangle",
            distance,
            2.5,
            true,
            track,
            &indices,
            &["Start", "TP1", "TP2", "TP3", "Finish"],
        ));
    }
    debug!("{name}: triangle_fai done, bound={bound:.6}");

    let (_bound, indices) = circuit::triangle_plat(track, bound);
    if indices[0] != -1 {
        let distance = circuit::circuit_distance(track, &indices);
        routes.push(Route::new(
            name,
            "flat triangle",
            distance,
            2.0,
            true,
            track,
            &indices,
            &["Start", "TP1", "TP2", "TP3", "Finish"],
        ));
    }
    debug!("{name}: triangle_plat done, bound={_bound:.6}");

    routes
}

fn optimize_ukxcl(track: &mut Track, complexity: i32) -> Vec<Route> {
    let league = League::Ukxcl;
    let name = league.name();
    let mut routes = Vec::new();

    let (mut bound, indices) = open::open_distance0(track, 10.0 / R);
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "open distance",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["Start", "Finish"],
        ));
    }
    debug!("{name}: open0 done, bound={bound:.6}");
    if !gate(complexity, 3) {
        warn!("{name}: complexity={complexity} gates out the turnpoint-flight step, stopping after open0");
        return routes;
    }

    if bound < 15.0 / R {
        bound = 15.0 / R;
    }
    let (bound, indices) = open::open_distance3(track, bound, true);
    if indices[0] != -1 {
        routes.push(Route::new(
            name,
            "turnpoint flight",
            R * bound,
            1.0,
            false,
            track,
            &indices,
            &["Start", "TP1", "TP2", "TP3", "Finish"],
        ));
    }
    debug!("{name}: open3 done, bound={bound:.6}");

    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Trkpt, Validity};

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

    fn two_fixes_10km() -> Track {
        // 10.000 km apart along a meridian: 10 / R radians of latitude.
        let delta_lat_units = (10.0 / R) * (180.0 * 60000.0) / std::f64::consts::PI;
        let pts = vec![trkpt(0, 0), trkpt(delta_lat_units.round() as i32, 0)];
        let mut track = Track::from_trkpts(pts);
        track.preprocess();
        track
    }

    #[test]
    fn single_fix_yields_empty_result() {
        let mut track = Track::from_trkpts(vec![trkpt(0, 0)]);
        track.preprocess();
        let routes = optimize(&mut track, League::Frcfd, -1, None);
        assert!(routes.is_empty());
    }

    #[test]
    fn two_fixes_ten_km_scores_open_distance() {
        let mut track = two_fixes_10km();
        let routes = optimize(&mut track, League::Frcfd, -1, None);
        assert_eq!(routes.len(), 1);
        assert_approx_eq::assert_approx_eq!(routes[0].distance_km, 10.0, 0.01);
        assert_eq!(routes[0].multiplier, 1.0);
        assert!(!routes[0].circuit);
    }

    #[test]
    fn complexity_gate_stops_pipeline_early() {
        let mut track = two_fixes_10km();
        let routes = optimize(&mut track, League::Frcfd, 0, None);
        // open1/open2/circuits never run past an open0-only gate, but
        // open0 itself still reports.
        assert_eq!(routes.len(), 1);
    }
}
