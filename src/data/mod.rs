pub mod catalog;
pub mod matrix;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use catalog::{Catalog, CatalogEntry, CatalogRecord};
pub use matrix::{MatrixAssembler, MatrixSource, SimilarityMatrix};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Catalog and similarity matrix, loaded once and read-only afterwards
#[derive(Debug)]
pub struct Dataset {
    catalog: Catalog,
    matrix: Arc<SimilarityMatrix>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Loads the catalog and assembles the matrix from the configured artifacts
    pub fn load(config: &Config) -> AppResult<Self> {
        let catalog = Catalog::load(&config.catalog_path())?;
        let matrix = MatrixAssembler::new(config.matrix_source()).assemble()?;
        Self::new(catalog, matrix)
    }

    /// Pairs a catalog with its matrix. Every catalog entry must own exactly one row.
    pub fn new(catalog: Catalog, matrix: Arc<SimilarityMatrix>) -> AppResult<Self> {
        if catalog.len() != matrix.dimension() {
            return Err(AppError::DataCorrupt(format!(
                "catalog has {} titles but similarity matrix has {} rows",
                catalog.len(),
                matrix.dimension()
            )));
        }

        Ok(Self {
            catalog,
            matrix,
            loaded_at: Utc::now(),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
