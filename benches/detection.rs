use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fracwatch::detector::EventDetector;
use fracwatch::record::{Dataset, WellReading};
use fracwatch::settings::DetectionSettings;
use fracwatch::signature::slopes_in_window;

fn ts(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::seconds(secs)
}

/// A pumping run with a mild periodic rate wobble and occasional spikes.
fn synthetic_run(n: usize) -> Dataset {
    let readings = (0..n)
        .map(|i| {
            let wobble = ((i % 60) as f64 / 60.0 - 0.5) * 0.2;
            let rate = if i % 500 == 250 { 10.6 } else { 10.0 + wobble };
            WellReading {
                time: ts(i as i64),
                treating_pressure: 5000.0 + wobble * 100.0,
                annulus_pressure: 200.0,
                bottomhole_pressure: 6000.0 + wobble * 50.0,
                slurry_rate: rate,
                clean_fluid_rate: 9.5,
                proppant_conc: 1.2,
                bottomhole_proppant_conc: 1.1,
                net_pressure: 800.0,
                total_b600_3050: None,
                total_proppant: i as f64,
                total_clean_fluid: i as f64,
                total_slurry: i as f64,
                b525_conc: 0.0,
                b534_conc: 0.0,
                j604_conc: 0.0,
                u028_conc: 0.0,
                j627_conc: 0.0,
                pcm_guar_conc: 0.0,
                j475_conc: 0.0,
                j218_conc: 0.0,
            }
        })
        .collect();
    Dataset::new("bench", readings)
}

/// Benchmark the physics detector over growing series lengths
fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("breakdown_detection");
    let detector = EventDetector::new(DetectionSettings::default());

    for n in [10_000, 50_000, 200_000] {
        let data = synthetic_run(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{n}samples")), &data, |b, data| {
            b.iter(|| black_box(detector.detect(data)));
        });
    }

    group.finish();
}

/// Benchmark slope fitting over typical trend-window sizes
fn bench_window_slopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_slopes");
    let data = synthetic_run(300);

    for window in [30, 60, 120] {
        let slice = &data.readings()[..window];
        group.throughput(Throughput::Elements(window as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{window}s")), &slice, |b, slice| {
            b.iter(|| black_box(slopes_in_window(slice)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detection, bench_window_slopes);
criterion_main!(benches);
