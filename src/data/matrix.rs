//! Similarity matrix storage and reassembly.
//!
//! The matrix is persisted as `shard_count` row slices (`sim_0.bin`,
//! `sim_1.bin`, ...) so that no single file exceeds storage limits. Each file
//! is a bincode-encoded `Vec<Vec<f32>>`. Concatenating the shards in index
//! order reproduces the full matrix. A single unsharded file may be used
//! instead when the shard set is incomplete.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{AppError, AppResult};

/// Square matrix of pairwise similarity scores, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    /// Builds a matrix from its rows, rejecting anything that is not square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(AppError::DataCorrupt(format!(
                "similarity matrix has {} rows but row {} has {} columns",
                n,
                i,
                row.len()
            )));
        }
        Ok(Self { rows })
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }
}

/// Location of the persisted matrix
#[derive(Debug, Clone)]
pub struct MatrixSource {
    pub dir: PathBuf,
    pub shard_prefix: String,
    pub shard_count: usize,
    pub fallback_file: String,
}

impl MatrixSource {
    pub fn shard_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{}.bin", self.shard_prefix, index))
    }

    pub fn fallback_path(&self) -> PathBuf {
        self.dir.join(&self.fallback_file)
    }
}

/// Loads the similarity matrix once and hands out the same instance afterwards
pub struct MatrixAssembler {
    source: MatrixSource,
    loaded: Mutex<Option<Arc<SimilarityMatrix>>>,
}

impl MatrixAssembler {
    pub fn new(source: MatrixSource) -> Self {
        Self {
            source,
            loaded: Mutex::new(None),
        }
    }

    /// Returns the assembled matrix, reading storage only on the first successful call.
    ///
    /// Shards `0..shard_count` are read in order and stacked row-wise. If any shard
    /// is missing the unsharded fallback file is used instead. Failed loads are not
    /// cached, so a later call retries.
    pub fn assemble(&self) -> AppResult<Arc<SimilarityMatrix>> {
        let mut loaded = self
            .loaded
            .lock()
            .map_err(|_| AppError::Internal("matrix assembler lock poisoned".to_string()))?;

        if let Some(matrix) = loaded.as_ref() {
            return Ok(Arc::clone(matrix));
        }

        let matrix = Arc::new(load(&self.source)?);
        *loaded = Some(Arc::clone(&matrix));
        Ok(matrix)
    }
}

fn load(source: &MatrixSource) -> AppResult<SimilarityMatrix> {
    match load_shards(source)? {
        Some(rows) => SimilarityMatrix::from_rows(rows),
        None => {
            let path = source.fallback_path();
            if source.shard_count > 0 {
                tracing::warn!(
                    path = %path.display(),
                    "Shard set incomplete, falling back to whole-matrix file"
                );
            }
            let rows = read_rows(&path)?.ok_or_else(|| {
                AppError::DataUnavailable(format!(
                    "no complete shard set ({} shards under {}) and no matrix file {}",
                    source.shard_count,
                    source.dir.display(),
                    path.display()
                ))
            })?;
            let matrix = SimilarityMatrix::from_rows(rows)?;
            tracing::info!(dimension = matrix.dimension(), "Loaded unsharded similarity matrix");
            Ok(matrix)
        }
    }
}

/// Reads every shard in index order. `None` means at least one shard is missing.
fn load_shards(source: &MatrixSource) -> AppResult<Option<Vec<Vec<f32>>>> {
    if source.shard_count == 0 {
        return Ok(None);
    }

    let mut rows = Vec::new();
    for index in 0..source.shard_count {
        let path = source.shard_path(index);
        let Some(part) = read_rows(&path)? else {
            tracing::debug!(path = %path.display(), "Shard missing");
            return Ok(None);
        };
        tracing::debug!(shard = index, rows = part.len(), "Loaded shard");
        rows.extend(part);
    }

    tracing::info!(
        shards = source.shard_count,
        dimension = rows.len(),
        "Assembled similarity matrix from shards"
    );
    Ok(Some(rows))
}

/// Reads one matrix file. `None` means the file does not exist.
fn read_rows(path: &Path) -> AppResult<Option<Vec<Vec<f32>>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::DataUnavailable(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    bincode::deserialize(&bytes)
        .map(Some)
        .map_err(|e| AppError::DataCorrupt(format!("failed to decode {}: {}", path.display(), e)))
}

/// Splits rows into `parts` contiguous slices whose sizes differ by at most one.
///
/// The first `len % parts` slices carry the extra row. Slices may be empty when
/// there are more parts than rows.
pub fn split_rows(rows: &[Vec<f32>], parts: usize) -> AppResult<Vec<&[Vec<f32>]>> {
    if parts == 0 {
        return Err(AppError::InvalidInput("shard count must be at least 1".to_string()));
    }

    let base = rows.len() / parts;
    let extra = rows.len() % parts;
    let mut slices = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let end = start + base + usize::from(i < extra);
        slices.push(&rows[start..end]);
        start = end;
    }
    Ok(slices)
}

/// Persists the matrix as `source.shard_count` shard files, returning the written paths
pub fn write_shards(matrix: &SimilarityMatrix, source: &MatrixSource) -> AppResult<Vec<PathBuf>> {
    fs::create_dir_all(&source.dir).map_err(|e| {
        AppError::Internal(format!("failed to create {}: {}", source.dir.display(), e))
    })?;

    let mut written = Vec::with_capacity(source.shard_count);
    for (index, part) in split_rows(matrix.rows(), source.shard_count)?
        .into_iter()
        .enumerate()
    {
        let path = source.shard_path(index);
        write_rows(&path, part)?;
        tracing::info!(shard = index, rows = part.len(), path = %path.display(), "Wrote shard");
        written.push(path);
    }
    Ok(written)
}

/// Persists rows as a single matrix file
pub fn write_rows(path: &Path, rows: &[Vec<f32>]) -> AppResult<()> {
    let bytes = bincode::serialize(rows)
        .map_err(|e| AppError::Internal(format!("failed to encode {}: {}", path.display(), e)))?;
    fs::write(path, bytes)
        .map_err(|e| AppError::Internal(format!("failed to write {}: {}", path.display(), e)))
}
