use criterion::{criterion_group, criterion_main, Criterion};
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

/// A synthetic meandering track, long enough to exercise every search
/// routine's skip-primitive path rather than its degenerate short-track
/// fallback.
fn meandering_track(n: usize) -> Track {
    let mut pts = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64 * 0.01;
        let lat = (2000.0 * t.sin()) as i32;
        let lon = (i as i32) * 60 + (1500.0 * (t * 0.3).cos()) as i32;
        pts.push(trkpt(lat, lon));
    }
    let mut track = Track::from_trkpts(pts);
    track.preprocess();
    track
}

fn bench_frcfd(c: &mut Criterion) {
    let mut group = c.benchmark_group("league::optimize_frcfd");
    for n in [1_000usize, 10_000] {
        group.bench_function(format!("n={n}"), |b| {
            b.iter_batched(
                || meandering_track(n),
                |mut track| league::optimize(&mut track, League::Frcfd, -1, None),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frcfd);
criterion_main!(benches);
