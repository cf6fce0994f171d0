// Integration tests for end-to-end feature extraction

use iclabel_features::processing::features::{eeg_autocorr_fftw, eeg_autocorr_welch, eeg_rpsd};
use iclabel_features::{AutocorrMethod, FeatureAssembler, FeatureConfig, IcaInput, MixingGeometry};
use ndarray::{s, Array2, Array3, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

/// Three components mixed onto four scalp channels
fn four_channel_recording(pnts: usize, trials: usize, srate: usize) -> (Array3<f64>, Array2<f64>, Vec<f64>, Vec<f64>) {
    let activations = Array3::from_shape_fn((3, pnts, trials), |(c, t, e)| {
        let time = (t + e * pnts) as f64 / srate as f64;
        match c {
            0 => (2.0 * PI * 10.0 * time).sin(),
            1 => (2.0 * PI * 37.0 * time).sin() + 0.5 * (2.0 * PI * 3.0 * time).cos(),
            _ => ((t * 7919 + e * 104_729) % 97) as f64 / 97.0 - 0.5,
        }
    });
    let inverse_mixing = Array2::from_shape_vec(
        (4, 3),
        vec![
            1.0, 0.2, -0.4, //
            0.5, -1.0, 0.3, //
            -0.3, 0.6, 1.0, //
            0.8, 0.1, -0.7,
        ],
    )
    .unwrap();
    let theta = vec![-36.0, 36.0, 144.0, -144.0];
    let rho = vec![0.42, 0.42, 0.42, 0.42];
    (activations, inverse_mixing, theta, rho)
}

#[test]
fn test_end_to_end_single_epoch() {
    let (activations, inverse_mixing, theta, rho) = four_channel_recording(256, 1, 128);
    let geometry = MixingGeometry::new(inverse_mixing.view(), &theta, &rho).unwrap();
    let input = IcaInput::new(activations.view(), geometry, 128);

    let features = FeatureAssembler::default()
        .extract_with_rng(&input, &mut StdRng::seed_from_u64(2024))
        .unwrap();

    assert_eq!(features.topography.dim(), (32, 32, 1, 3));
    assert_eq!(features.spectrum.dim(), (1, 100, 1, 3));
    assert_eq!(features.autocorrelation.dim(), (1, 100, 1, 3));
    assert!(features.topography.iter().all(|v| v.is_finite()));
    assert!(features.spectrum.iter().all(|v| v.is_finite()));
    assert!(features.autocorrelation.iter().all(|v| v.is_finite()));
}

#[test]
fn test_masked_topography_cells_are_zero() {
    let (activations, inverse_mixing, theta, rho) = four_channel_recording(256, 1, 128);
    let geometry = MixingGeometry::new(inverse_mixing.view(), &theta, &rho).unwrap();
    let input = IcaInput::new(activations.view(), geometry, 128);
    let features = FeatureAssembler::default().extract(&input).unwrap();

    for c in 0..3usize {
        let map: ArrayView2<f64> = features.topography.slice(s![.., .., 0usize, c]);
        // Corners lie outside the head disk
        assert_eq!(map[[0, 0]], 0.0);
        assert_eq!(map[[0, 31]], 0.0);
        assert_eq!(map[[31, 0]], 0.0);
        assert_eq!(map[[31, 31]], 0.0);
        let peak = map.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        assert!((peak - 0.99).abs() < 1e-12);
    }
}

#[test]
fn test_sinusoid_component_spectrum_peak() {
    let (activations, _, _, _) = four_channel_recording(1024, 1, 128);
    let spectrum = eeg_rpsd(activations.view(), 128, None, 100, &mut StdRng::seed_from_u64(1)).unwrap();

    // Component 0 is a 10 Hz sine; column i holds (i + 1) Hz
    let column = spectrum.slice(s![0, .., 0, 0]);
    let peak = column
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert!((peak as i64 - 9).abs() <= 1, "peak column {}", peak);
    assert!(column.iter().all(|v| v.abs() <= 1.0 + 1e-12));
}

#[test]
fn test_multi_epoch_recording() {
    let (activations, inverse_mixing, theta, rho) = four_channel_recording(250, 4, 250);
    let geometry = MixingGeometry::new(inverse_mixing.view(), &theta, &rho).unwrap();
    let input = IcaInput::new(activations.view(), geometry, 250).with_pct_data(50);

    let features = FeatureAssembler::default()
        .extract_with_rng(&input, &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert_eq!(features.n_components(), 3);
    assert!(features.spectrum.iter().all(|v| v.is_finite()));
}

#[test]
fn test_welch_and_fft_agree_on_periodic_signal() {
    let (activations, _, _, _) = four_channel_recording(1280, 1, 128);
    let fft = eeg_autocorr_fftw(activations.view(), 128).unwrap();
    let welch = eeg_autocorr_welch(activations.view(), 128).unwrap();

    // 10 Hz sine: one period is 10 lags on the 100 Hz axis, lag 10 is column 9
    assert!(fft[[0, 9, 0, 0]] > 0.8);
    assert!(welch[[0, 9, 0, 0]] > 0.8);
    assert!(fft[[0, 4, 0, 0]] < -0.8);
    assert!(welch[[0, 4, 0, 0]] < -0.8);
}

#[test]
fn test_auto_method_runs_welch_on_long_recordings() {
    let (activations, inverse_mixing, theta, rho) = four_channel_recording(128 * 6, 1, 128);
    let geometry = MixingGeometry::new(inverse_mixing.view(), &theta, &rho).unwrap();
    let input = IcaInput::new(activations.view(), geometry, 128);

    let auto = FeatureAssembler::new(FeatureConfig {
        autocorr_method: AutocorrMethod::Auto,
        ..FeatureConfig::default()
    })
    .unwrap();
    let welch = FeatureAssembler::new(FeatureConfig {
        autocorr_method: AutocorrMethod::Welch,
        ..FeatureConfig::default()
    })
    .unwrap();

    let subset = [0, 1, 2];
    let input = input.with_subset(&subset);
    let mut rng = StdRng::seed_from_u64(8);
    let a = auto.extract_with_rng(&input, &mut rng).unwrap();
    let w = welch.extract_with_rng(&input, &mut rng).unwrap();
    assert_eq!(a.autocorrelation, w.autocorrelation);
}
