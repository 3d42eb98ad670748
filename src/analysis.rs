use crate::model::{Record, read_dataset};
use crate::stats::Accumulator;
use anyhow::{Context, Result};
use std::{fs::File, io::BufWriter, path::Path};

pub trait Obs {
    fn update(&mut self, rec_vec: &[Record]) -> Result<()>;
    fn report(&self) -> serde_json::Value;
}

pub struct EstabRate {
    acc: Accumulator,
}

impl EstabRate {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for EstabRate {
    fn update(&mut self, rec_vec: &[Record]) -> Result<()> {
        for rec in rec_vec {
            self.acc.add(f64::from(rec.established));
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "estab_rate": self.acc.report() })
    }
}

pub struct ScoreStats {
    acc: Accumulator,
}

impl ScoreStats {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for ScoreStats {
    fn update(&mut self, rec_vec: &[Record]) -> Result<()> {
        for rec in rec_vec {
            self.acc.add(rec.score);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "score": self.acc.report() })
    }
}

pub struct PressStats {
    acc: Accumulator,
}

impl PressStats {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for PressStats {
    fn update(&mut self, rec_vec: &[Record]) -> Result<()> {
        for rec in rec_vec {
            self.acc.add(rec.press);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "press": self.acc.report() })
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new() -> Self {
        let mut obs_ptr_vec: Vec<Box<dyn Obs>> = Vec::new();
        obs_ptr_vec.push(Box::new(EstabRate::new()));
        obs_ptr_vec.push(Box::new(ScoreStats::new()));
        obs_ptr_vec.push(Box::new(PressStats::new()));
        Self { obs_ptr_vec }
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let rec_vec = read_dataset(file).context("failed to read dataset")?;
        for obs in &mut self.obs_ptr_vec {
            obs.update(&rec_vec).context("failed to update observable")?;
        }
        Ok(())
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        let reports: Vec<_> = self.obs_ptr_vec.iter().map(|obs| obs.report()).collect();
        serde_json::to_writer_pretty(writer, &reports)?;
        Ok(())
    }
}
