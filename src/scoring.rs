use serde::{Deserialize, Serialize};

/// Competitive resistance of the resident community.
///
/// The reference model uses a fixed index, but the pressure factor of the
/// score admits any index that varies linearly with the environment, so the
/// functional form is a configuration choice rather than a code change.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    /// Constant index, independent of the environment.
    Fixed(f64),
    /// Index varying linearly with the environment value.
    Linear { c0: f64, c1: f64 },
}

impl Competition {
    /// Competition index `C(E)` at environment value `env`.
    pub fn index(&self, env: f64) -> f64 {
        match self {
            Self::Fixed(comp) => *comp,
            Self::Linear { c0, c1 } => c0 + c1 * env,
        }
    }
}

/// Parameters of the invasion score model.
///
/// All environment-dependent quantities are linear in the environment value:
/// an intercept field (suffix `0`) plus a slope field (suffix `1`).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    /// Environmental scaling intercept and slope.
    pub a0: f64,
    pub a1: f64,

    /// Functional optimum distance intercept and slope.
    pub opt_f0: f64,
    pub opt_f1: f64,
    /// Functional mismatch steepness intercept and slope.
    pub beta_f0: f64,
    pub beta_f1: f64,

    /// Phylogenetic optimum distance intercept and slope.
    pub opt_p0: f64,
    pub opt_p1: f64,
    /// Phylogenetic mismatch steepness intercept and slope.
    pub beta_p0: f64,
    pub beta_p1: f64,

    /// Coupling of the functional and phylogenetic mismatches.
    pub lambda: f64,

    /// Steepness of the threshold gate.
    pub alpha_f: f64,
    /// Absolute functional mismatch at which the gate equals one half.
    pub mism_max: f64,

    /// Competition index of the pressure factor.
    pub competition: Competition,
}

impl ModelParams {
    /// Functional optimum distance at environment value `env`.
    pub fn opt_f(&self, env: f64) -> f64 {
        self.opt_f0 + self.opt_f1 * env
    }

    /// Phylogenetic optimum distance at environment value `env`.
    pub fn opt_p(&self, env: f64) -> f64 {
        self.opt_p0 + self.opt_p1 * env
    }

    /// Functional mismatch steepness at environment value `env`.
    pub fn beta_f(&self, env: f64) -> f64 {
        self.beta_f0 + self.beta_f1 * env
    }

    /// Phylogenetic mismatch steepness at environment value `env`.
    pub fn beta_p(&self, env: f64) -> f64 {
        self.beta_p0 + self.beta_p1 * env
    }

    /// Invasion score of one invader in one community.
    ///
    /// Product of four factors: the environmental scaling, a bivariate
    /// Gaussian penalty on the trait mismatches, the propagule pressure
    /// divided by one plus the competition index, and a logistic gate on the
    /// absolute functional mismatch. Non-negative for any finite inputs with
    /// `press >= 0` and `1 + C(env) > 0`.
    pub fn score(&self, env: f64, dist_f: f64, dist_p: f64, press: f64) -> f64 {
        let scale = self.a0 + self.a1 * env;

        let mism_f = dist_f - self.opt_f(env);
        let mism_p = dist_p - self.opt_p(env);
        let penalty = (-self.beta_f(env) * mism_f.powi(2)
            - self.beta_p(env) * mism_p.powi(2)
            - self.lambda * mism_f * mism_p)
            .exp();

        let pressure = press / (1.0 + self.competition.index(env));

        let gate = 1.0 / (1.0 + (self.alpha_f * (mism_f.abs() - self.mism_max)).exp());

        scale * penalty * pressure * gate
    }

    /// Evaluate [`ModelParams::score`] over a dense trait grid.
    ///
    /// Returns one row per `grid_p` value, one column per `grid_f` value.
    pub fn score_grid(
        &self,
        env: f64,
        press: f64,
        grid_f: &[f64],
        grid_p: &[f64],
    ) -> Vec<Vec<f64>> {
        grid_p
            .iter()
            .map(|&dist_p| {
                grid_f
                    .iter()
                    .map(|&dist_f| self.score(env, dist_f, dist_p, press))
                    .collect()
            })
            .collect()
    }
}

/// Evenly spaced values from `lo` to `hi` inclusive.
///
/// Requires `n >= 2`. Both endpoints are reproduced exactly.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|idx| {
            let frac = idx as f64 / (n - 1) as f64;
            lo * (1.0 - frac) + hi * frac
        })
        .collect()
}
