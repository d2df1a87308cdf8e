//! Per-agency document count fetching.

use regtally_core::CountMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::http::{HttpTransport, ReqwestTransport, RetryingClient};
use crate::limit::RateLimiter;

/// Fetches document counts from the Federal Register API.
///
/// The bulk facet endpoint answers counts for every agency in one round
/// trip; the per-agency detail endpoint distinguishes "zero documents"
/// from "agency unknown to the API".
pub struct CountFetcher<T> {
    http: RetryingClient<T>,
    base_url: String,
}

impl CountFetcher<ReqwestTransport> {
    /// Production fetcher from a client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, RequestError> {
        let transport = ReqwestTransport::new(config)?;
        let limiter = RateLimiter::new(config.rate_limit);
        let http = RetryingClient::new(transport, limiter, config.max_retries, config.backoff_factor);
        Ok(Self::new(http, config.base_url.clone()))
    }
}

impl<T: HttpTransport> CountFetcher<T> {
    /// `base_url` should be like `https://www.federalregister.gov/api/v1`
    /// (a trailing slash is tolerated).
    pub fn new(http: RetryingClient<T>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the agency facet: one request, counts for every agency.
    ///
    /// The facet shape has varied between `slug → count` and
    /// `slug → {"count": N, "name": ...}`; both are accepted. Entries
    /// whose count is missing, non-integer, or negative are skipped with
    /// a warning rather than failing the whole call.
    pub async fn bulk_counts(&mut self) -> Result<CountMap, RequestError> {
        let url = format!("{}/documents/facets/agency", self.base_url);
        info!(url = %url, "fetching per-agency document counts");

        let value = self.http.get(&url, &[]).await?;
        let Some(entries) = value.as_object() else {
            warn!("facet response is not an object, treating as empty");
            return Ok(CountMap::new());
        };

        let mut counts = CountMap::new();
        for (slug, entry) in entries {
            let count = match entry {
                Value::Number(n) => n.as_i64(),
                Value::Object(fields) => fields.get("count").and_then(Value::as_i64),
                _ => None,
            };
            match count {
                Some(count) if count >= 0 => {
                    counts.insert(slug.clone(), count);
                }
                _ => warn!(slug = %slug, "skipping facet entry with invalid count"),
            }
        }

        info!(agencies = counts.len(), "translated facet counts");
        Ok(counts)
    }

    /// Whether the API knows the agency at all, document count aside.
    ///
    /// A 404 from the detail endpoint means "no such agency"; any other
    /// failure propagates.
    pub async fn agency_exists(&mut self, slug: &str) -> Result<bool, RequestError> {
        let url = format!("{}/agencies/{slug}", self.base_url);
        debug!(slug = %slug, "checking agency existence");
        match self.http.get(&url, &[]).await {
            Ok(_) => Ok(true),
            Err(RequestError::Status { status: 404 }) => {
                debug!(slug = %slug, "agency not found");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// The API's full agency directory.
    pub async fn list_agencies(&mut self) -> Result<Vec<Value>, RequestError> {
        let url = format!("{}/agencies", self.base_url);
        info!(url = %url, "fetching agency directory");
        let value = self.http.get(&url, &[]).await?;
        let agencies = match value {
            Value::Array(items) => items,
            Value::Object(mut fields) => match fields.remove("agencies") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        info!(agencies = agencies.len(), "fetched agency directory");
        Ok(agencies)
    }

    /// One page of the document search for a single agency.
    pub async fn search_documents(
        &mut self,
        slug: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Value, RequestError> {
        let url = format!("{}/documents.json", self.base_url);
        let query = vec![
            ("conditions[agencies][]".to_string(), slug.to_string()),
            ("per_page".to_string(), per_page.to_string()),
            ("page".to_string(), page.to_string()),
            ("fields[]".to_string(), "document_number".to_string()),
        ];
        debug!(slug = %slug, page, per_page, "searching documents");
        self.http.get(&url, &query).await
    }

    /// Total document count for one agency via a minimal search page.
    pub async fn document_count_for(&mut self, slug: &str) -> Result<u64, RequestError> {
        let value = self.search_documents(slug, 1, 1).await?;
        let count = value.get("count").and_then(Value::as_u64).unwrap_or(0);
        debug!(slug = %slug, count, "per-agency document count");
        Ok(count)
    }
}
