use crate::config::Config;
use crate::model::{Community, Inputs, Invader, Record, Surface};
use crate::scoring::linspace;
use crate::stats;
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{LogNormal, Normal, Uniform};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Simulation engine.
///
/// Holds the configuration and provides the generation, scoring, labeling
/// and surface evaluation stages of one run.
pub struct Engine {
    cfg: Config,
}

/// Inputs checkpoint of one run.
///
/// Stores the configuration alongside the inputs so later stages can detect
/// a configuration mismatch.
#[derive(Serialize, Deserialize)]
struct InputsCheckpoint {
    cfg: Config,
    inputs: Inputs,
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Generate the random inputs of run `run_idx`.
    ///
    /// Each generation stage draws from its own seeded generator, on the
    /// ChaCha stream selected by `run_idx`, so the environment, pressure and
    /// trait draws stay independent of each other and runs are reproducible.
    pub fn generate_inputs(&self, run_idx: usize) -> Result<Inputs> {
        let setup = &self.cfg.setup;

        let mut rng = stage_rng(setup.seed_env, run_idx);
        let env_dist = Uniform::new(0.0, setup.env_max)?;
        let comm_vec = (0..setup.n_comm)
            .map(|i_comm| Community {
                name: format!("comm-{i_comm:03}"),
                env: env_dist.sample(&mut rng),
            })
            .collect();

        let mut rng = stage_rng(setup.seed_press, run_idx);
        let press_dist = LogNormal::new(setup.press_log_mean, setup.press_log_sd)?;
        let press_mat = (0..setup.n_comm)
            .map(|_| (0..setup.n_inv).map(|_| press_dist.sample(&mut rng)).collect())
            .collect();

        let mut rng = stage_rng(setup.seed_trait, run_idx);
        let trait_dist = Uniform::new(0.0, setup.trait_max)?;
        let inv_vec = (0..setup.n_inv)
            .map(|i_inv| Invader {
                name: format!("inv-{i_inv:03}"),
                dist_f: trait_dist.sample(&mut rng),
                dist_p: trait_dist.sample(&mut rng),
            })
            .collect();

        Ok(Inputs {
            comm_vec,
            inv_vec,
            press_mat,
        })
    }

    /// Score every (community, invader) pair.
    ///
    /// Records are appended community-major, but row order carries no
    /// meaning for downstream consumers.
    pub fn assemble_records(&self, inputs: &Inputs) -> Vec<Record> {
        let mut rec_vec = Vec::with_capacity(inputs.comm_vec.len() * inputs.inv_vec.len());

        for (i_comm, comm) in inputs.comm_vec.iter().enumerate() {
            for (i_inv, inv) in inputs.inv_vec.iter().enumerate() {
                let press = inputs.press_mat[i_comm][i_inv];
                let score = self.cfg.model.score(comm.env, inv.dist_f, inv.dist_p, press);

                rec_vec.push(Record {
                    community: comm.name.clone(),
                    invader: inv.name.clone(),
                    env: comm.env,
                    dist_f: inv.dist_f,
                    dist_p: inv.dist_p,
                    press,
                    score,
                    established: 0,
                });
            }
        }

        rec_vec
    }

    /// Label records by a global median split over the scores.
    ///
    /// Records tied with the median count as failures. Requires the complete
    /// dataset and must be rerun if records are added or removed.
    pub fn label_records(rec_vec: &mut [Record]) {
        let scores: Vec<f64> = rec_vec.iter().map(|rec| rec.score).collect();
        let median = stats::median(&scores);

        for rec in rec_vec {
            rec.established = u8::from(rec.score > median);
        }
    }

    /// Perturb the trait columns with measurement jitter.
    ///
    /// Runs strictly after labeling: the scores and labels keep the exact
    /// trait values. The jitter keeps duplicate traits from degenerating the
    /// downstream covariance structure.
    pub fn jitter_records(&self, rec_vec: &mut [Record], run_idx: usize) -> Result<()> {
        let mut rng = stage_rng(self.cfg.setup.seed_jitter, run_idx);
        let jit_dist = Normal::new(0.0, self.cfg.setup.std_dev_jit)?;

        for rec in rec_vec {
            rec.dist_f += jit_dist.sample(&mut rng);
            rec.dist_p += jit_dist.sample(&mut rng);
        }

        Ok(())
    }

    /// Produce the labeled, jittered dataset of run `run_idx`.
    pub fn generate_dataset(&self, inputs: &Inputs, run_idx: usize) -> Result<Vec<Record>> {
        let mut rec_vec = self.assemble_records(inputs);

        Self::label_records(&mut rec_vec);

        self.jitter_records(&mut rec_vec, run_idx)
            .context("failed to jitter records")?;

        Ok(rec_vec)
    }

    /// Evaluate the score surface of community `i_comm`.
    ///
    /// The trait grids span the generated trait distances, one unit beyond
    /// their range on each side, with the environment held at the
    /// community's value and the pressure at the mean across the community's
    /// invaders.
    pub fn evaluate_surface(&self, inputs: &Inputs, i_comm: usize) -> Result<Surface> {
        let comm = inputs
            .comm_vec
            .get(i_comm)
            .with_context(|| format!("no community with index {i_comm}"))?;

        let (min_f, max_f) = trait_range(inputs.inv_vec.iter().map(|inv| inv.dist_f));
        let (min_p, max_p) = trait_range(inputs.inv_vec.iter().map(|inv| inv.dist_p));

        let n_grid = self.cfg.output.grid_points;
        let grid_f = linspace(min_f - 1.0, max_f + 1.0, n_grid);
        let grid_p = linspace(min_p - 1.0, max_p + 1.0, n_grid);

        let press_row = &inputs.press_mat[i_comm];
        let press = press_row.iter().sum::<f64>() / press_row.len() as f64;

        let score_mat = self.cfg.model.score_grid(comm.env, press, &grid_f, &grid_p);

        Ok(Surface {
            community: comm.name.clone(),
            env: comm.env,
            press,
            grid_f,
            grid_p,
            score_mat,
        })
    }

    /// Save the inputs checkpoint of a run.
    pub fn save_inputs<P: AsRef<Path>>(&self, inputs: &Inputs, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let checkpoint = InputsCheckpoint {
            cfg: self.cfg.clone(),
            inputs: inputs.clone(),
        };
        encode::write(&mut writer, &checkpoint).context("failed to serialize inputs")?;
        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    /// Load a previously saved inputs checkpoint.
    pub fn load_inputs<P: AsRef<Path>>(&self, file: P) -> Result<Inputs> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        let checkpoint: InputsCheckpoint =
            decode::from_read(&mut reader).context("failed to deserialize inputs")?;
        if checkpoint.cfg != self.cfg {
            bail!("checkpoint config differs from the current config");
        }

        Ok(checkpoint.inputs)
    }
}

fn stage_rng(seed: u64, run_idx: usize) -> ChaCha12Rng {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    rng.set_stream(run_idx as u64);
    rng
}

fn trait_range(vals: impl Iterator<Item = f64>) -> (f64, f64) {
    vals.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), val| {
        (min.min(val), max.max(val))
    })
}
