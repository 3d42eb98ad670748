use crate::analysis::Analyzer;
use crate::config::Config;
use crate::engine::Engine;
use crate::model::{read_dataset, write_dataset, write_surface};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn create_run(&self) -> Result<()> {
        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let engine = Engine::new(self.cfg.clone());

        let inputs = engine
            .generate_inputs(run_idx)
            .context("failed to generate inputs")?;
        engine
            .save_inputs(&inputs, self.inputs_file(run_idx))
            .context("failed to save inputs")?;

        let rec_vec = engine
            .generate_dataset(&inputs, run_idx)
            .context("failed to generate dataset")?;
        write_dataset(&rec_vec, self.dataset_file(run_idx)).context("failed to write dataset")?;
        log::info!("generated {} records", rec_vec.len());

        Ok(())
    }

    pub fn evaluate_surface(&self, run_idx: usize, comm_idx: Option<usize>) -> Result<()> {
        let engine = Engine::new(self.cfg.clone());

        let inputs_file = self.inputs_file(run_idx);
        let inputs = engine
            .load_inputs(&inputs_file)
            .with_context(|| format!("failed to load {inputs_file:?}"))?;

        let i_comm = comm_idx.unwrap_or(self.cfg.output.surface_comm);
        let surface = engine
            .evaluate_surface(&inputs, i_comm)
            .context("failed to evaluate surface")?;

        write_surface(&surface, self.surface_file(run_idx, i_comm))
            .context("failed to write surface")?;
        log::info!("evaluated surface of community {i_comm}");

        Ok(())
    }

    pub fn analyze_sim(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;

        for run_idx in 0..n_runs {
            let mut analyzer = Analyzer::new();

            analyzer
                .add_file(self.dataset_file(run_idx))
                .context("failed to add file")?;

            analyzer
                .save_results(self.results_file(run_idx))
                .context("failed to save results")?;
        }

        Ok(())
    }

    pub fn export_run(&self, run_idx: usize) -> Result<()> {
        let rec_vec = read_dataset(self.dataset_file(run_idx)).context("failed to read dataset")?;

        let csv_file = self.csv_file(run_idx);
        let file =
            File::create(&csv_file).with_context(|| format!("failed to create {csv_file:?}"))?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "community,invader,E,d_f,d_p,PP,invasiveness,invasion_success"
        )?;
        for rec in &rec_vec {
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                rec.community,
                rec.invader,
                rec.env,
                rec.dist_f,
                rec.dist_p,
                rec.press,
                rec.score,
                rec.established
            )?;
        }
        writer.flush().context("failed to flush writer stream")?;
        log::info!("exported {csv_file:?}");

        Ok(())
    }

    pub fn clean_sim(&self) -> Result<()> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        for run_dir in glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|path| path.is_dir())
        {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }

        Ok(())
    }

    fn count_run_dirs(&self) -> Result<usize> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|path| path.is_dir())
            .count();
        Ok(count)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn inputs_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("inputs.msgpack")
    }

    fn dataset_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("dataset.msgpack")
    }

    fn surface_file(&self, run_idx: usize, i_comm: usize) -> PathBuf {
        self.run_dir(run_idx)
            .join(format!("surface-{i_comm:04}.msgpack"))
    }

    fn csv_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("dataset.csv")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.json")
    }
}
