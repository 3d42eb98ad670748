//! Simulation data types.

use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Resident community with its environment value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub name: String,
    pub env: f64,
}

/// Invader species with its trait distances to the resident community norm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invader {
    pub name: String,
    /// Functional distance.
    pub dist_f: f64,
    /// Phylogenetic distance.
    pub dist_p: f64,
}

/// Generated random inputs of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    pub comm_vec: Vec<Community>,
    pub inv_vec: Vec<Invader>,

    /// Propagule pressure matrix (`n_comm x n_inv`).
    pub press_mat: Vec<Vec<f64>>,
}

/// One row of the output dataset.
///
/// Serialized field names follow the column names expected by the downstream
/// model fitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub community: String,
    pub invader: String,

    #[serde(rename = "E")]
    pub env: f64,
    #[serde(rename = "d_f")]
    pub dist_f: f64,
    #[serde(rename = "d_p")]
    pub dist_p: f64,
    #[serde(rename = "PP")]
    pub press: f64,

    #[serde(rename = "invasiveness")]
    pub score: f64,
    #[serde(rename = "invasion_success")]
    pub established: u8,
}

/// Dense score surface over trait space for one community.
#[derive(Debug, Serialize, Deserialize)]
pub struct Surface {
    pub community: String,
    pub env: f64,
    /// Mean propagule pressure across the community's invaders.
    pub press: f64,

    pub grid_f: Vec<f64>,
    pub grid_p: Vec<f64>,

    /// Scores indexed `[i_p][i_f]`.
    pub score_mat: Vec<Vec<f64>>,
}

pub fn write_dataset<P: AsRef<Path>>(rec_vec: &[Record], file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, rec_vec).context("failed to serialize dataset")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

pub fn read_dataset<P: AsRef<Path>>(file: P) -> Result<Vec<Record>> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let rec_vec = decode::from_read(&mut reader).context("failed to deserialize dataset")?;
    Ok(rec_vec)
}

pub fn write_surface<P: AsRef<Path>>(surface: &Surface, file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, surface).context("failed to serialize surface")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
