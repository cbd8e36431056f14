use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One persisted catalog record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRecord {
    #[serde(default)]
    pub movie_id: Option<i64>,
    pub title: String,
}

/// A catalog title bound to its similarity matrix row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogEntry {
    pub row: usize,
    pub movie_id: Option<i64>,
    pub title: String,
}

/// Ordered, immutable list of titles. Position `i` is row `i` of the similarity matrix.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_title: HashMap<String, usize>,
}

impl Catalog {
    /// Reads the JSON catalog file
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                AppError::DataUnavailable(format!("catalog file {} not found", path.display()))
            }
            _ => AppError::DataUnavailable(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let records: Vec<CatalogRecord> = serde_json::from_str(&raw).map_err(|e| {
            AppError::DataCorrupt(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_records(records)?;
        tracing::info!(titles = catalog.len(), path = %path.display(), "Loaded catalog");
        Ok(catalog)
    }

    /// Builds a catalog from records in matrix row order. Titles must be unique.
    pub fn from_records(records: Vec<CatalogRecord>) -> AppResult<Self> {
        let mut by_title = HashMap::with_capacity(records.len());
        let mut entries = Vec::with_capacity(records.len());

        for (row, record) in records.into_iter().enumerate() {
            if let Some(previous) = by_title.insert(record.title.clone(), row) {
                return Err(AppError::DataCorrupt(format!(
                    "duplicate title '{}' at rows {} and {}",
                    record.title, previous, row
                )));
            }
            entries.push(CatalogEntry {
                row,
                movie_id: record.movie_id,
                title: record.title,
            });
        }

        Ok(Self { entries, by_title })
    }

    /// Convenience constructor from bare titles
    pub fn from_titles<I, S>(titles: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_records(
            titles
                .into_iter()
                .map(|title| CatalogRecord {
                    movie_id: None,
                    title: title.into(),
                })
                .collect(),
        )
    }

    /// Row index of an exact, case-sensitive title match
    pub fn index_of(&self, title: &str) -> AppResult<usize> {
        self.by_title
            .get(title)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("title '{}' is not in the catalog", title)))
    }

    pub fn title_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.title.as_str())
    }

    /// Titles in row order
    pub fn all_titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.title.as_str())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of_inverts_title_at() {
        let catalog = Catalog::from_titles(["Avatar", "Spectre", "Tangled"]).unwrap();
        for i in 0..catalog.len() {
            let title = catalog.title_at(i).unwrap();
            assert_eq!(catalog.index_of(title).unwrap(), i);
            assert_eq!(catalog.entries()[i].row, i);
        }
        assert_eq!(catalog.title_at(3), None);
    }

    #[test]
    fn test_index_of_is_exact_match() {
        let catalog = Catalog::from_titles(["Avatar"]).unwrap();
        assert!(matches!(catalog.index_of("avatar"), Err(AppError::NotFound(_))));
        assert!(matches!(catalog.index_of("Avatar "), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_all_titles_keeps_order() {
        let catalog = Catalog::from_titles(["C", "A", "B"]).unwrap();
        assert_eq!(catalog.all_titles().collect::<Vec<_>>(), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_duplicate_titles_rejected() {
        let result = Catalog::from_titles(["Heat", "Alien", "Heat"]);
        assert!(matches!(result, Err(AppError::DataCorrupt(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie_list.json");
        fs::write(
            &path,
            r#"[{"movie_id": 19995, "title": "Avatar"}, {"title": "Spectre"}]"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].movie_id, Some(19995));
        assert_eq!(catalog.entries()[1].movie_id, None);
        assert_eq!(catalog.index_of("Spectre").unwrap(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Catalog::load(&dir.path().join("movie_list.json"));
        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie_list.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Catalog::load(&path), Err(AppError::DataCorrupt(_))));
    }
}
