//! JSON matrix file format used at the CLI boundary.
//!
//! `flipflop-core` knows nothing about serialization; this module is the
//! only place in the workspace that turns a [`Matrix`] into bytes or back.

use anyhow::{Context, Result};
use flipflop_core::Matrix;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Row-major matrix on the wire: `{"rows": .., "cols": .., "data": [..]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixFile {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl From<&Matrix> for MatrixFile {
    fn from(m: &Matrix) -> Self {
        Self {
            rows: m.rows(),
            cols: m.cols(),
            data: m.as_slice().to_vec(),
        }
    }
}

impl TryFrom<MatrixFile> for Matrix {
    type Error = anyhow::Error;

    fn try_from(f: MatrixFile) -> Result<Self> {
        anyhow::ensure!(
            f.data.len() == f.rows * f.cols,
            "matrix file data length {} does not match rows*cols ({}*{})",
            f.data.len(),
            f.rows,
            f.cols
        );
        Ok(Matrix::from_vec(f.rows, f.cols, f.data))
    }
}

/// Read a [`Matrix`] from a JSON file.
pub fn read_matrix(path: &Path) -> Result<Matrix> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let wire: MatrixFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing matrix JSON from {}", path.display()))?;
    Matrix::try_from(wire).with_context(|| format!("validating matrix from {}", path.display()))
}

/// Write a [`Matrix`] to a JSON file.
pub fn write_matrix(path: &Path, matrix: &Matrix) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &MatrixFile::from(matrix))
        .with_context(|| format!("writing matrix JSON to {}", path.display()))
}
