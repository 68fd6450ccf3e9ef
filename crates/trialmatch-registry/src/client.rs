//! Registry client with the tiered local → nationwide fallback.
//!
//! The transport sits behind [`StudyFetcher`] so the fallback policy can be
//! exercised without a network. [`RegistryClient::search`] never fails:
//! transport errors become a single synthetic error record.

use std::time::Duration;

use async_trait::async_trait;

use trialmatch_core::config::RegistryConfig;

use crate::error::RegistryError;
use crate::location;
use crate::parse::{self, RawStudiesPage};
use crate::types::TrialRecord;

/// Overall-status filter applied to every query.
const RECRUITING_STATUS: &str = "RECRUITING";

/// Parameters of one `/studies` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyQuery {
    /// Condition term (`query.cond`).
    pub condition: String,
    /// Abbreviated locality term (`query.locn`); `None` for the
    /// nationwide tier.
    pub locality: Option<String>,
    /// Result cap (`pageSize`).
    pub page_size: u32,
}

/// Transport seam for the registry's `/studies` endpoint.
#[async_trait]
pub trait StudyFetcher: Send + Sync {
    async fn fetch(&self, query: &StudyQuery) -> Result<RawStudiesPage, RegistryError>;
}

/// Re-exported page type for fetcher implementations.
pub type StudiesPage = RawStudiesPage;

// =============================================================================
// HTTP fetcher
// =============================================================================

/// Fetcher backed by the live ClinicalTrials.gov v2 API.
pub struct HttpStudyFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStudyFetcher {
    /// Create a fetcher with a bounded request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl StudyFetcher for HttpStudyFetcher {
    async fn fetch(&self, query: &StudyQuery) -> Result<RawStudiesPage, RegistryError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query.cond", query.condition.clone()),
            ("filter.overallStatus", RECRUITING_STATUS.to_string()),
            ("pageSize", query.page_size.to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(ref locality) = query.locality {
            params.push(("query.locn", locality.clone()));
        }

        let url = format!("{}/studies", self.base_url);
        tracing::debug!(%url, ?query, "Fetching studies");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistryError::Timeout
                } else {
                    RegistryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        response
            .json::<RawStudiesPage>()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))
    }
}

// =============================================================================
// RegistryClient
// =============================================================================

/// One-shot trial search over a [`StudyFetcher`].
pub struct RegistryClient<F = HttpStudyFetcher> {
    fetcher: F,
    page_size: u32,
}

impl RegistryClient<HttpStudyFetcher> {
    /// Build a live client from configuration.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(
            HttpStudyFetcher::new(
                config.base_url.clone(),
                Duration::from_secs(config.timeout_secs),
            ),
            config.page_size,
        )
    }
}

impl<F: StudyFetcher> RegistryClient<F> {
    pub fn new(fetcher: F, page_size: u32) -> Self {
        Self { fetcher, page_size }
    }

    /// Search for recruiting trials, preferring the patient's locality.
    ///
    /// Issues the locality-scoped query first; if — and only if — it
    /// returns zero records, issues a single unscoped query and marks the
    /// results nationwide. Transport failures are terminal: no retry, no
    /// fallback, one synthetic error record. The returned sequence is
    /// always non-empty.
    ///
    /// `stage` and `age` travel with the session-facing operation and are
    /// recorded with the query; the registry grammar subset this client
    /// speaks filters on condition and locality only.
    pub async fn search(
        &self,
        condition: &str,
        raw_location: &str,
        stage: Option<&str>,
        age: Option<u32>,
    ) -> Vec<TrialRecord> {
        let normalized = location::normalize(raw_location);
        tracing::info!(
            condition,
            locality = %normalized.locality,
            ?stage,
            ?age,
            "Searching registry"
        );

        let scoped = StudyQuery {
            condition: condition.to_string(),
            locality: Some(normalized.locality.clone()),
            page_size: self.page_size,
        };

        let page = match self.fetcher.fetch(&scoped).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, "Locality-scoped registry query failed");
                return vec![TrialRecord::unavailable(condition, raw_location, &e.to_string())];
            }
        };

        let records = parse::parse_page(&page, raw_location, false);
        if !records.is_empty() {
            tracing::info!(count = records.len(), "Found local trials");
            return records;
        }

        // Zero local results: one nationwide retry with the locality
        // filter removed.
        tracing::info!(locality = %normalized.locality, "No local trials; retrying nationwide");
        let unscoped = StudyQuery {
            condition: condition.to_string(),
            locality: None,
            page_size: self.page_size,
        };

        let page = match self.fetcher.fetch(&unscoped).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, "Nationwide registry query failed");
                return vec![TrialRecord::unavailable(condition, raw_location, &e.to_string())];
            }
        };

        let records = parse::parse_page(&page, raw_location, true);
        if records.is_empty() {
            tracing::info!(condition, "No recruiting trials in either tier");
            return vec![TrialRecord::no_matches(condition, raw_location)];
        }
        tracing::info!(count = records.len(), "Found nationwide trials");
        records
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::types::{NO_TRIALS_ID, REGISTRY_ERROR_ID};

    /// Scripted fetcher: pops canned responses and records every query.
    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<RawStudiesPage, RegistryError>>>,
        queries: Mutex<Vec<StudyQuery>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<RawStudiesPage, RegistryError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<StudyQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StudyFetcher for &ScriptedFetcher {
        async fn fetch(&self, query: &StudyQuery) -> Result<RawStudiesPage, RegistryError> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("fetcher called more times than scripted")
        }
    }

    fn page_with(count: usize) -> RawStudiesPage {
        let studies: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "protocolSection": {
                        "identificationModule": {
                            "nctId": format!("NCT0000{:04}", i),
                            "briefTitle": format!("Study {}", i)
                        },
                        "statusModule": { "overallStatus": "RECRUITING" }
                    }
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({ "studies": studies })).unwrap()
    }

    fn empty_page() -> RawStudiesPage {
        RawStudiesPage::default()
    }

    // ---- Tier 1 succeeds ----

    #[tokio::test]
    async fn test_local_results_skip_fallback() {
        let fetcher = ScriptedFetcher::new(vec![Ok(page_with(3))]);
        let client = RegistryClient::new(&fetcher, 10);

        let records = client
            .search("breast cancer", "Boston Massachusetts", None, None)
            .await;

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.is_nationwide));
        // Exactly one query, locality-scoped with the abbreviated form.
        let queries = fetcher.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].condition, "breast cancer");
        assert_eq!(queries[0].locality.as_deref(), Some("Boston, MA"));
        assert_eq!(queries[0].page_size, 10);
    }

    // ---- Tier 2 (nationwide fallback) ----

    #[tokio::test]
    async fn test_zero_local_results_trigger_nationwide_fallback() {
        let fetcher = ScriptedFetcher::new(vec![Ok(empty_page()), Ok(page_with(4))]);
        let client = RegistryClient::new(&fetcher, 10);

        let records = client
            .search("prostate cancer", "Nome Alaska", None, None)
            .await;

        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.is_nationwide));

        let queries = fetcher.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].locality.as_deref(), Some("Nome, AK"));
        // The fallback drops the locality parameter and nothing else.
        assert_eq!(queries[1].locality, None);
        assert_eq!(queries[1].condition, "prostate cancer");
        assert_eq!(queries[1].page_size, 10);
    }

    #[tokio::test]
    async fn test_fallback_runs_at_most_once() {
        let fetcher = ScriptedFetcher::new(vec![Ok(empty_page()), Ok(empty_page())]);
        let client = RegistryClient::new(&fetcher, 10);

        let records = client.search("rare sarcoma", "Nome Alaska", None, None).await;

        assert_eq!(fetcher.queries().len(), 2);
        // Both tiers empty: a single synthetic no-matches record, never an
        // empty list.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].registry_id, NO_TRIALS_ID);
    }

    // ---- Transport failures ----

    #[tokio::test]
    async fn test_transport_failure_yields_single_error_record() {
        let fetcher = ScriptedFetcher::new(vec![Err(RegistryError::Timeout)]);
        let client = RegistryClient::new(&fetcher, 10);

        let records = client
            .search("breast cancer", "Boston Massachusetts", None, None)
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].registry_id, REGISTRY_ERROR_ID);
        assert!(records[0].status.contains("timed out"));
        // No fallback after a transport error.
        assert_eq!(fetcher.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_transport_failure_also_yields_error_record() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(empty_page()),
            Err(RegistryError::Status(503)),
        ]);
        let client = RegistryClient::new(&fetcher, 10);

        let records = client.search("lung cancer", "Nome Alaska", None, None).await;

        assert_eq!(fetcher.queries().len(), 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].registry_id, REGISTRY_ERROR_ID);
        assert!(records[0].status.contains("503"));
    }

    // ---- Result invariants ----

    #[tokio::test]
    async fn test_result_is_never_empty() {
        for script in [
            vec![Ok(page_with(1))],
            vec![Ok(empty_page()), Ok(page_with(2))],
            vec![Ok(empty_page()), Ok(empty_page())],
            vec![Err(RegistryError::Timeout)],
        ] {
            let fetcher = ScriptedFetcher::new(script);
            let client = RegistryClient::new(&fetcher, 10);
            let records = client.search("breast cancer", "Boston MA", None, None).await;
            assert!(!records.is_empty());
        }
    }

    #[tokio::test]
    async fn test_nationwide_flag_is_uniform_per_response() {
        let fetcher = ScriptedFetcher::new(vec![Ok(empty_page()), Ok(page_with(5))]);
        let client = RegistryClient::new(&fetcher, 10);
        let records = client.search("melanoma", "Moab Utah", None, None).await;
        let flags: Vec<bool> = records.iter().map(|r| r.is_nationwide).collect();
        assert!(flags.iter().all(|&f| f == flags[0]));
    }

    #[tokio::test]
    async fn test_stage_and_age_do_not_change_the_query() {
        let fetcher = ScriptedFetcher::new(vec![Ok(page_with(1))]);
        let client = RegistryClient::new(&fetcher, 10);
        client
            .search("breast cancer", "Boston Massachusetts", Some("2"), Some(45))
            .await;
        let queries = fetcher.queries();
        assert_eq!(queries[0].condition, "breast cancer");
        assert_eq!(queries[0].locality.as_deref(), Some("Boston, MA"));
    }
}
