// src/processing/pipeline.rs
//! Feature assembly for a whole ICA decomposition
//!
//! The assembler validates the full input contract before any computation,
//! then renders topographies (in parallel when configured), spectra and
//! autocorrelations, and returns the three tensors the classifier expects.

use crate::config::constants::topography::GRID_SCALE;
use crate::config::FeatureConfig;
use crate::error::{FeatureError, FeatureResult};
use crate::processing::features::autocorrelation::resample_lags;
use crate::processing::features::{render_topography, AutocorrExtractor, MixingGeometry, SpectralExtractor};
use crate::utils::validation::{validate_activation_shape, validate_equal_lengths, validate_pct_data, validate_sample_rate};
use ndarray::{s, Array2, Array4, ArrayView3, Axis};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

/// One ICA decomposition to featurize
#[derive(Debug, Clone, Copy)]
pub struct IcaInput<'a> {
    /// Component activations, shape (n_components, pnts, trials)
    pub activations: ArrayView3<'a, f64>,
    /// Inverse mixing matrix and channel locations
    pub geometry: MixingGeometry<'a>,
    /// Sample rate in Hz
    pub srate: usize,
    /// Declared component count
    pub n_components: usize,
    /// Declared samples per epoch
    pub pnts: usize,
    /// Declared epoch count
    pub trials: usize,
    /// Explicit spectral segment indices; overrides `pct_data`
    pub subset: Option<&'a [usize]>,
    /// Percentage of segments to draw when no subset is given; falls back to the config
    pub pct_data: Option<u8>,
}

impl<'a> IcaInput<'a> {
    /// Input whose declared dimensions are taken from the activation tensor
    pub fn new(activations: ArrayView3<'a, f64>, geometry: MixingGeometry<'a>, srate: usize) -> Self {
        let (n_components, pnts, trials) = activations.dim();
        Self {
            activations,
            geometry,
            srate,
            n_components,
            pnts,
            trials,
            subset: None,
            pct_data: None,
        }
    }

    /// Use exactly these segments for the spectrum
    pub fn with_subset(mut self, subset: &'a [usize]) -> Self {
        self.subset = Some(subset);
        self
    }

    /// Override the configured `pct_data`
    pub fn with_pct_data(mut self, pct_data: u8) -> Self {
        self.pct_data = Some(pct_data);
        self
    }
}

/// Feature tensors with the component axis last
#[derive(Debug, Clone, PartialEq)]
pub struct IcaFeatures {
    /// Shape (32, 32, 1, C)
    pub topography: Array4<f64>,
    /// Shape (1, 100, 1, C)
    pub spectrum: Array4<f64>,
    /// Shape (1, 100, 1, C)
    pub autocorrelation: Array4<f64>,
}

impl IcaFeatures {
    /// Size of the trailing component axis
    pub fn n_components(&self) -> usize {
        self.topography.len_of(Axis(3))
    }
}

/// Features of a single component, already scaled
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentFeatures {
    /// 32x32 scalp map
    pub topography: Array2<f64>,
    /// 100 spectrum bins
    pub spectrum: Vec<f64>,
    /// 100 autocorrelation lags
    pub autocorrelation: Vec<f64>,
}

/// Everything derived from the input contract before any feature is computed
struct ExtractionPlan {
    plot_channels: Vec<usize>,
    spectral: SpectralExtractor,
    segments: Vec<usize>,
    autocorr: AutocorrExtractor,
}

/// Computes ICLabel feature tensors
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    config: FeatureConfig,
}

impl FeatureAssembler {
    /// Validates `config` before accepting it
    pub fn new(config: FeatureConfig) -> FeatureResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract all features, drawing random segments from the thread RNG
    pub fn extract(&self, input: &IcaInput<'_>) -> FeatureResult<IcaFeatures> {
        self.extract_with_rng(input, &mut rand::thread_rng())
    }

    /// Extract all features with an injected RNG for segment selection
    pub fn extract_with_rng<R: Rng + ?Sized>(&self, input: &IcaInput<'_>, rng: &mut R) -> FeatureResult<IcaFeatures> {
        let plan = self.plan(input, rng)?;
        debug!(
            components = input.n_components,
            srate = input.srate,
            pnts = input.pnts,
            trials = input.trials,
            autocorr_method = ?plan.autocorr.method(),
            parallel = self.config.parallel,
            "assembling ICLabel features"
        );

        let mut topography = self.render_topographies(input, &plan.plot_channels)?;
        let mut spectrum = plan.spectral.extract_segments(input.activations, &plan.segments);
        let mut autocorrelation = plan.autocorr.extract(input.activations)?;

        let scale = self.config.output_scale;
        topography.mapv_inplace(|v| v * scale);
        spectrum.mapv_inplace(|v| v * scale);
        autocorrelation.mapv_inplace(|v| v * scale);

        Ok(IcaFeatures {
            topography,
            spectrum,
            autocorrelation,
        })
    }

    /// Features of one component, for callers that schedule components themselves.
    ///
    /// Segment selection follows the same rules as [`FeatureAssembler::extract_with_rng`];
    /// pass an explicit subset for results identical to the batch call.
    pub fn compute_component_features<R: Rng + ?Sized>(
        &self,
        input: &IcaInput<'_>,
        component: usize,
        rng: &mut R,
    ) -> FeatureResult<ComponentFeatures> {
        let plan = self.plan(input, rng)?;
        if component >= input.n_components {
            return Err(FeatureError::mismatch(
                "component",
                "component index out of range",
                format!("< {}", input.n_components),
                component,
            ));
        }

        let scale = self.config.output_scale;
        let activation = input.activations.index_axis(Axis(0), component);

        let mut topography = render_topography(&input.geometry, component, &plan.plot_channels)?;
        topography.mapv_inplace(|v| v * scale);

        let spectrum = plan
            .spectral
            .component_spectrum(&activation, &plan.segments)
            .into_iter()
            .map(|v| v * scale)
            .collect();

        let lags = plan.autocorr.component_lags(&activation);
        let autocorrelation = resample_lags(&lags, input.srate)?
            .into_iter()
            .map(|v| v * scale)
            .collect();

        Ok(ComponentFeatures {
            topography,
            spectrum,
            autocorrelation,
        })
    }

    /// Check the whole input contract and build the per-call extractors
    fn plan<R: Rng + ?Sized>(&self, input: &IcaInput<'_>, rng: &mut R) -> FeatureResult<ExtractionPlan> {
        validate_sample_rate(input.srate)?;
        validate_activation_shape(&input.activations, input.n_components, input.pnts, input.trials)?;
        validate_equal_lengths("inverse-mixing columns", input.n_components, input.geometry.n_components())?;

        let pct_data = input.pct_data.unwrap_or(self.config.pct_data);
        validate_pct_data(pct_data)?;

        let plot_channels = input.geometry.plot_channels();
        if plot_channels.is_empty() {
            return Err(FeatureError::invalid_input("theta", "no channel has a defined location"));
        }

        let autocorr = AutocorrExtractor::new(self.config.autocorr_method, input.srate, input.pnts, input.trials)?;
        let spectral = SpectralExtractor::new(input.srate, input.pnts, input.trials, &self.config.line_noise)?;
        let segments = spectral.select_segments(input.subset, pct_data, rng)?;

        Ok(ExtractionPlan {
            plot_channels,
            spectral,
            segments,
            autocorr,
        })
    }

    fn render_topographies(&self, input: &IcaInput<'_>, plot_channels: &[usize]) -> FeatureResult<Array4<f64>> {
        let render = |component: usize| {
            trace!(component, "rendering topography");
            render_topography(&input.geometry, component, plot_channels)
        };

        let maps: Vec<Array2<f64>> = if self.config.parallel {
            (0..input.n_components)
                .into_par_iter()
                .map(render)
                .collect::<FeatureResult<_>>()?
        } else {
            (0..input.n_components).map(render).collect::<FeatureResult<_>>()?
        };

        let mut out = Array4::<f64>::zeros((GRID_SCALE, GRID_SCALE, 1, input.n_components));
        for (component, map) in maps.into_iter().enumerate() {
            out.slice_mut(s![.., .., 0, component]).assign(&map);
        }
        Ok(out)
    }
}
