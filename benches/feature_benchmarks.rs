use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iclabel_features::processing::features::{eeg_autocorr_fftw, eeg_rpsd, render_topography};
use iclabel_features::processing::resample_poly;
use iclabel_features::{FeatureAssembler, FeatureConfig, IcaInput, MixingGeometry};
use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

const SAMPLE_RATES: &[usize] = &[128, 250, 500];
const COMPONENT_COUNTS: &[usize] = &[4, 16, 32];
const N_CHANNELS: usize = 32;

fn activations(n_components: usize, pnts: usize, trials: usize, srate: usize) -> Array3<f64> {
    Array3::from_shape_fn((n_components, pnts, trials), |(c, t, e)| {
        let time = (t + e * pnts) as f64 / srate as f64;
        (2.0 * PI * (4.0 + c as f64) * time).sin() + 0.2 * (2.0 * PI * 50.0 * time).sin()
    })
}

fn montage(n_components: usize) -> (Array2<f64>, Vec<f64>, Vec<f64>) {
    let theta: Vec<f64> = (0..N_CHANNELS).map(|ch| ch as f64 * 360.0 / N_CHANNELS as f64 - 180.0).collect();
    let rho: Vec<f64> = (0..N_CHANNELS).map(|ch| 0.15 + 0.3 * ((ch % 4) as f64 / 3.0)).collect();
    let inverse_mixing = Array2::from_shape_fn((N_CHANNELS, n_components), |(ch, c)| ((ch * (c + 1)) as f64 * 0.37).sin());
    (inverse_mixing, theta, rho)
}

fn benchmark_topography(c: &mut Criterion) {
    let mut group = c.benchmark_group("topography");
    let (inverse_mixing, theta, rho) = montage(1);
    let geometry = MixingGeometry::new(inverse_mixing.view(), &theta, &rho).unwrap();
    let plot_channels = geometry.plot_channels();

    group.bench_function("render_32ch", |b| {
        b.iter(|| render_topography(black_box(&geometry), 0, &plot_channels).unwrap())
    });
    group.finish();
}

fn benchmark_spectral_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectrum");

    for &srate in SAMPLE_RATES {
        let acts = activations(8, srate * 10, 1, srate);
        group.throughput(Throughput::Elements((8 * srate * 10) as u64));
        group.bench_with_input(BenchmarkId::new("rpsd", format!("{}hz", srate)), &srate, |b, &srate| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| eeg_rpsd(black_box(acts.view()), srate, None, 100, &mut rng).unwrap())
        });
    }
    group.finish();
}

fn benchmark_autocorrelation(c: &mut Criterion) {
    let mut group = c.benchmark_group("autocorrelation");

    for &srate in SAMPLE_RATES {
        let acts = activations(8, srate * 10, 1, srate);
        group.bench_with_input(BenchmarkId::new("fftw", format!("{}hz", srate)), &srate, |b, &srate| {
            b.iter(|| eeg_autocorr_fftw(black_box(acts.view()), srate).unwrap())
        });

        let lags: Vec<f64> = (0..=srate).map(|k| (-(k as f64) / 40.0).exp()).collect();
        group.bench_with_input(BenchmarkId::new("resample", format!("{}hz", srate)), &srate, |b, &srate| {
            b.iter(|| resample_poly(black_box(&lags), 100, srate).unwrap())
        });
    }
    group.finish();
}

fn benchmark_assembler(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembler");
    group.sample_size(10);

    for &n_components in COMPONENT_COUNTS {
        let acts = activations(n_components, 250 * 4, 2, 250);
        let (inverse_mixing, theta, rho) = montage(n_components);
        let geometry = MixingGeometry::new(inverse_mixing.view(), &theta, &rho).unwrap();
        let input = IcaInput::new(acts.view(), geometry, 250);

        for parallel in [false, true] {
            let assembler = FeatureAssembler::new(FeatureConfig {
                parallel,
                ..FeatureConfig::default()
            })
            .unwrap();
            let label = if parallel { "parallel" } else { "sequential" };

            group.bench_with_input(BenchmarkId::new(label, n_components), &n_components, |b, _| {
                let mut rng = StdRng::seed_from_u64(42);
                b.iter(|| assembler.extract_with_rng(black_box(&input), &mut rng).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_topography,
    benchmark_spectral_features,
    benchmark_autocorrelation,
    benchmark_assembler
);
criterion_main!(benches);
