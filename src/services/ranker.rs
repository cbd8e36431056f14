use std::cmp::Ordering;

use crate::{
    data::Dataset,
    error::{AppError, AppResult},
    models::Recommendation,
};

/// Ranks every other catalog title by its similarity to `title`
///
/// Reads the title's matrix row, drops the title itself, orders the rest by
/// descending score (ties broken by row index) and keeps the first `k`. Scores
/// are used as stored; a value of `0.87` becomes a match score of 87.
pub fn recommend(dataset: &Dataset, title: &str, k: usize) -> AppResult<Vec<Recommendation>> {
    let catalog = dataset.catalog();
    let index = catalog.index_of(title)?;
    let row = dataset.matrix().row(index).ok_or_else(|| {
        AppError::Internal(format!("no similarity row for catalog index {}", index))
    })?;

    let mut scored: Vec<(usize, f32)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(candidate, _)| candidate != index)
        .collect();
    scored.sort_by(|a, b| compare_scores(b.1, a.1).then(a.0.cmp(&b.0)));

    scored
        .into_iter()
        .take(k)
        .map(|(candidate, similarity)| -> AppResult<Recommendation> {
            let title = catalog.title_at(candidate).ok_or_else(|| {
                AppError::Internal(format!("no catalog title for matrix row {}", candidate))
            })?;
            Ok(Recommendation {
                title: title.to_string(),
                match_score: match_score(similarity),
                similarity,
            })
        })
        .collect()
}

/// Converts a raw similarity into a 0-100 percentage
pub fn match_score(similarity: f32) -> u8 {
    if similarity.is_nan() {
        return 0;
    }
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

// NaN ranks below every real score
fn compare_scores(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.total_cmp(&b),
    }
}
