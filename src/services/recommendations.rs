use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    data::Dataset,
    error::{AppError, AppResult},
    models::{trailer_search_url, EnrichedRecommendation, Recommendation},
    services::{providers::MetadataProvider, ranker},
};

/// Top-`k` similar titles, without display metadata
pub fn get_recommendations(
    dataset: &Dataset,
    title: &str,
    k: usize,
) -> AppResult<Vec<Recommendation>> {
    let recommendations = ranker::recommend(dataset, title, k)?;

    tracing::info!(
        title = %title,
        k,
        returned = recommendations.len(),
        "Ranked similar titles"
    );

    Ok(recommendations)
}

/// Top-`k` similar titles with provider metadata attached
///
/// One task per recommendation, but a task only calls the provider while it
/// holds a permit from `lookup_permits`, which is shared across requests. Rank
/// order is kept. Tasks still running when this returns early are aborted.
pub async fn get_enriched_recommendations(
    dataset: &Dataset,
    provider: Arc<dyn MetadataProvider>,
    lookup_permits: Arc<Semaphore>,
    title: &str,
    k: usize,
) -> AppResult<Vec<EnrichedRecommendation>> {
    let recommendations = get_recommendations(dataset, title, k)?;
    let total = recommendations.len();

    let mut tasks = JoinSet::new();
    for (rank, recommendation) in recommendations.into_iter().enumerate() {
        let provider = Arc::clone(&provider);
        let permits = Arc::clone(&lookup_permits);
        tasks.spawn(async move {
            let details = match permits.acquire_owned().await {
                Ok(_permit) => provider.fetch_details(&recommendation.title).await,
                Err(e) => return Err(AppError::Internal(e.to_string())),
            };
            let trailer_url = trailer_search_url(&recommendation.title);
            Ok((
                rank,
                EnrichedRecommendation {
                    recommendation,
                    details,
                    trailer_url,
                },
            ))
        });
    }

    let mut slots: Vec<Option<EnrichedRecommendation>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (rank, item) = match joined {
            Ok(result) => result?,
            Err(e) => {
                tracing::error!(error = %e, provider = provider.name(), "Enrichment task failed");
                tasks.abort_all();
                return Err(AppError::Internal(e.to_string()));
            }
        };
        slots[rank] = Some(item);
    }

    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Catalog, SimilarityMatrix};
    use crate::models::DetailRecord;
    use crate::services::providers::MockMetadataProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn dataset() -> Dataset {
        Dataset::new(
            Catalog::from_titles(["Alien", "Aliens", "Heat"]).unwrap(),
            Arc::new(
                SimilarityMatrix::from_rows(vec![
                    vec![1.0, 0.8, 0.1],
                    vec![0.8, 1.0, 0.2],
                    vec![0.1, 0.2, 1.0],
                ])
                .unwrap(),
            ),
        )
        .unwrap()
    }

    /// Row 0 is most similar to row 1, then row 2, and so on
    fn large_dataset(n: usize) -> Dataset {
        let titles: Vec<String> = (0..n).map(|i| format!("T{}", i)).collect();
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { 1.0 } else { 1.0 / (1 + i + j) as f32 })
                    .collect()
            })
            .collect();
        Dataset::new(
            Catalog::from_titles(titles).unwrap(),
            Arc::new(SimilarityMatrix::from_rows(rows).unwrap()),
        )
        .unwrap()
    }

    /// Records how many lookups are in flight at once
    #[derive(Default)]
    struct SlowProvider {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MetadataProvider for SlowProvider {
        async fn fetch_details(&self, title: &str) -> DetailRecord {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let mut record = DetailRecord::fallback("poster.jpg");
            record.plot = format!("About {}", title);
            record
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_enrichment_keeps_rank_order() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_details().times(2).returning(|title| {
            let mut record = DetailRecord::fallback("poster.jpg");
            record.plot = format!("About {}", title);
            record
        });
        provider.expect_name().return_const("mock");

        let enriched = get_enriched_recommendations(
            &dataset(),
            Arc::new(provider),
            Arc::new(Semaphore::new(8)),
            "Alien",
            5,
        )
        .await
        .unwrap();

        let titles: Vec<&str> = enriched
            .iter()
            .map(|e| e.recommendation.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Aliens", "Heat"]);
        assert_eq!(enriched[0].details.plot, "About Aliens");
        assert_eq!(enriched[1].details.plot, "About Heat");
        assert!(enriched[0].trailer_url.contains("Aliens+trailer"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lookups_never_exceed_permits() {
        let data = large_dataset(200);
        let provider = Arc::new(SlowProvider::default());

        let enriched = get_enriched_recommendations(
            &data,
            Arc::clone(&provider) as Arc<dyn MetadataProvider>,
            Arc::new(Semaphore::new(4)),
            "T0",
            usize::MAX,
        )
        .await
        .unwrap();

        assert_eq!(enriched.len(), 199);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 199);
        assert!(provider.peak.load(Ordering::SeqCst) <= 4);

        let expected: Vec<String> = (1..200).map(|i| format!("T{}", i)).collect();
        let titles: Vec<String> = enriched
            .iter()
            .map(|e| e.recommendation.title.clone())
            .collect();
        assert_eq!(titles, expected);
        assert_eq!(enriched[0].details.plot, "About T1");
    }

    /// Panics on "T1" once the other lookups are parked; those park until cancelled
    #[derive(Default)]
    struct PanickingProvider {
        parked: AtomicUsize,
        cancelled: Arc<AtomicUsize>,
    }

    struct CountOnDrop(Arc<AtomicUsize>);

    impl Drop for CountOnDrop {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl MetadataProvider for PanickingProvider {
        async fn fetch_details(&self, title: &str) -> DetailRecord {
            if title == "T1" {
                while self.parked.load(Ordering::SeqCst) < 4 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                panic!("lookup exploded");
            }
            let _guard = CountOnDrop(Arc::clone(&self.cancelled));
            self.parked.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(60)).await;
            DetailRecord::fallback("poster.jpg")
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_task_cancels_remaining_lookups() {
        let data = large_dataset(6);
        let provider = PanickingProvider::default();
        let cancelled = Arc::clone(&provider.cancelled);

        let result = get_enriched_recommendations(
            &data,
            Arc::new(provider),
            Arc::new(Semaphore::new(8)),
            "T0",
            5,
        )
        .await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        // The four parked lookups are dropped rather than left running
        for _ in 0..100 {
            if cancelled.load(Ordering::SeqCst) == 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(cancelled.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_unknown_title_skips_provider() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_details().never();

        let result = get_enriched_recommendations(
            &dataset(),
            Arc::new(provider),
            Arc::new(Semaphore::new(8)),
            "Predator",
            5,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
