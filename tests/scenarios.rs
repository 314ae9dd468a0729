//! End-to-end scenarios exercised through the public API, built on
//! synthetic tracks rather than recorded IGC fixtures.

use std::f64::consts::PI;
use xcscore::geometry::R;
use xcscore::league::{self, League};
use xcscore::point::{Trkpt, Validity};
use xcscore::track::Track;

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

fn units_per_km_at_equator() -> f64 {
    // One km of latitude, in 1/60000-degree units.
    (1.0 / R) * (180.0 * 60000.0) / PI
}

/// S1: a single-fix track scores nothing, for any league.
#[test]
fn s1_single_fix_yields_empty_result() {
    let mut track = Track::from_trkpts(vec![trkpt(0, 0)]);
    track.preprocess();
    for league in [League::Frcfd, League::Uknxcl, League::Ukxcl] {
        let routes = league::optimize(&mut track, league, -1, None);
        assert!(routes.is_empty());
    }
}

/// S2: two fixes 10 km apart score as a single open-distance leg under FFVL.
#[test]
fn s2_two_fixes_ten_km_apart_score_open_distance() {
    let step = (10.0 * units_per_km_at_equator()).round() as i32;
    let mut track = Track::from_trkpts(vec![trkpt(0, 0), trkpt(step, 0)]);
    track.preprocess();

    let routes = league::optimize(&mut track, League::Frcfd, -1, None);
    assert_eq!(routes.len(), 1);
    assert_approx_eq::assert_approx_eq!(routes[0].distance_km, 10.0, 0.01);
    assert_eq!(routes[0].multiplier, 1.0);
    assert!(!routes[0].circuit);
}

/// S3: on a straight 100 km line, two intermediate turnpoints on the great
/// circle add nothing over the plain open-distance leg, and no FAI triangle
/// is found (there is no closure).
#[test]
fn s3_straight_line_open2_matches_open0_no_triangle() {
    let n = 500;
    let total_km = 100.0;
    let step = (total_km / (n as f64 - 1.0) * units_per_km_at_equator()).round() as i32;
    let pts: Vec<Trkpt> = (0..n).map(|i| trkpt(0, i * step)).collect();
    let mut track = Track::from_trkpts(pts);
    track.preprocess();

    let (bound0, _) = xcscore::search::open::open_distance0(&track, 0.0);
    let (bound2, _) = xcscore::search::open::open_distance2(&track, bound0, false);
    assert_approx_eq::assert_approx_eq!(bound0, bound2, 1e-9);

    track.compute_circuit_tables(3.0 / R);
    let (_, indices) = xcscore::search::circuit::triangle_fai(&track, bound0);
    assert_eq!(indices[0], -1);
}

/// S4: an equilateral triangle with 20 km legs, closing within 3 km, scores
/// as an FFVL FAI triangle with each leg at exactly a third of the
/// perimeter.
#[test]
fn s4_equilateral_triangle_scores_fai() {
    let mut track = equilateral_triangle_track(20.0);
    let routes = league::optimize(&mut track, League::Frcfd, -1, None);

    let fai = routes.iter().find(|r| r.route_type == "triangle FAI");
    let fai = fai.expect("FAI triangle should be found on a closing equilateral triangle");
    assert_approx_eq::assert_approx_eq!(fai.distance_km, 60.0, 0.5);
    assert_eq!(fai.multiplier, 1.4);
}

/// S5: an out-and-return with a 25 km leg and a 100 m closure scores as
/// 50 km at the UK National 2.0x multiplier.
#[test]
fn s5_out_and_return_scores_under_uk_national() {
    let step = (25.0 * units_per_km_at_equator() / 100.0).round() as i32;
    let pts: Vec<Trkpt> = (0..=100)
        .map(|i| trkpt(0, i * step))
        .chain((0..100).map(|i| trkpt(0, (99 - i) * step)))
        .collect();
    let mut track = Track::from_trkpts(pts);
    track.preprocess();

    let routes = league::optimize(&mut track, League::Uknxcl, -1, None);
    let oar = routes
        .iter()
        .find(|r| r.route_type.starts_with("out and return"))
        .expect("out-and-return should be found");
    assert_approx_eq::assert_approx_eq!(oar.distance_km, 50.0, 0.2);
    assert_eq!(oar.multiplier, 2.0);
    assert_approx_eq::assert_approx_eq!(oar.scored_distance_km(), 100.0, 0.4);
}

/// S6: capping the pipeline at complexity=1 on the S4 track never reaches
/// the triangle stages.
#[test]
fn s6_complexity_one_stops_before_triangle() {
    let mut track = equilateral_triangle_track(20.0);
    let routes = league::optimize(&mut track, League::Frcfd, 1, None);
    assert!(routes.iter().all(|r| !r.circuit));
}

fn equilateral_triangle_track(leg_km: f64) -> Track {
    let km_per_deg_lat = 111.32;
    let step_count = 60;

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
            pts.push(trkpt(
                (lat * 60.0 * 60000.0 / 60.0) as i32,
                (lon * 60.0 * 60000.0 / 60.0) as i32,
            ));
        }
    }
    pts.push(trkpt(0, 0));

    let mut track = Track::from_trkpts(pts);
    track.preprocess();
    track
}
