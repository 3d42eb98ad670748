use crate::scoring::ModelParams;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub setup: Setup,
    pub model: ModelParams,
    pub output: Output,
}

/// Input generation parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Setup {
    /// Number of communities.
    pub n_comm: usize,
    /// Number of invaders.
    pub n_inv: usize,

    /// Seed of the environment value draws.
    pub seed_env: u64,
    /// Seed of the propagule pressure draws.
    pub seed_press: u64,
    /// Seed of the trait distance draws.
    pub seed_trait: u64,
    /// Seed of the trait jitter draws.
    pub seed_jitter: u64,

    /// Upper bound of the uniform environment values.
    pub env_max: f64,
    /// Upper bound of the uniform trait distances.
    pub trait_max: f64,

    /// Mean of the log of the propagule pressures.
    pub press_log_mean: f64,
    /// Standard deviation of the log of the propagule pressures.
    pub press_log_sd: f64,

    /// Standard deviation of the trait measurement jitter.
    pub std_dev_jit: f64,
}

/// Output parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Output {
    /// Number of grid points per trait axis of the score surface.
    pub grid_points: usize,
    /// Default community index of the score surface.
    pub surface_comm: usize,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.setup.n_comm, 1..10_000).context("invalid number of communities")?;
        check_num(self.setup.n_inv, 1..10_000).context("invalid number of invaders")?;

        check_pos(self.setup.env_max).context("invalid environment upper bound")?;
        check_pos(self.setup.trait_max).context("invalid trait upper bound")?;

        check_num(self.setup.press_log_mean, -100.0..100.0)
            .context("invalid propagule pressure log mean")?;
        check_num(self.setup.press_log_sd, 0.0..100.0)
            .context("invalid propagule pressure log standard deviation")?;

        check_num(self.setup.std_dev_jit, 0.0..1.0)
            .context("invalid jitter standard deviation")?;

        check_num(self.model.alpha_f, 0.0..).context("invalid threshold gate steepness")?;
        check_num(self.model.mism_max, 0.0..).context("invalid threshold gate mismatch")?;

        // All environment-dependent parameters are linear in E, so checking
        // both endpoints of the environment range covers the whole range.
        for env in [0.0, self.setup.env_max] {
            check_num(self.model.beta_f(env), 0.0..)
                .with_context(|| format!("invalid functional steepness at E = {env}"))?;
            check_num(self.model.beta_p(env), 0.0..)
                .with_context(|| format!("invalid phylogenetic steepness at E = {env}"))?;

            let comp = self.model.competition.index(env);
            if comp <= -1.0 {
                bail!("competition index must satisfy 1 + C(E) > 0, but C({env}) = {comp}");
            }
        }

        check_num(self.output.grid_points, 2..10_000).context("invalid number of grid points")?;
        check_num(self.output.surface_comm, 0..self.setup.n_comm)
            .context("invalid surface community index")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_pos(num: f64) -> Result<()> {
    if !(num > 0.0) {
        bail!("number must be positive, but is {num:?}");
    }
    Ok(())
}
