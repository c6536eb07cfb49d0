use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::constants;
use crate::models::report::ReportPayload;
use crate::models::scan::{ExpectedItem, ScanError};

/// Upstream collections this service reads through. Each kind carries its
/// endpoint path and identifying field instead of dispatching on raw
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Godowns,
    Items,
    StockReports,
}

impl Collection {
    pub const ALL: [Collection; 3] =
        [Collection::Godowns, Collection::Items, Collection::StockReports];

    pub fn endpoint(&self) -> &'static str {
        match self {
            Collection::Godowns => "godowns",
            Collection::Items => "items",
            Collection::StockReports => "stock-reports",
        }
    }

    pub fn id_field(&self) -> &'static str {
        match self {
            Collection::Godowns => "godownId",
            Collection::Items => "barcode",
            Collection::StockReports => "reportId",
        }
    }
}

impl FromStr for Collection {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "godowns" => Ok(Collection::Godowns),
            "items" => Ok(Collection::Items),
            "stock-reports" => Ok(Collection::StockReports),
            other => Err(ScanError::ValidationError(format!(
                "Unknown catalog collection '{other}'"
            ))),
        }
    }
}

/// Client for the upstream inventory catalog service.
///
/// Every call is a single attempt - no retry, no backoff. A failed request
/// surfaces as `ScanError::CatalogError` and the caller's session state is
/// left untouched, so the operator can simply retry the action.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build catalog HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the client from CATALOG_BASE_URL / CATALOG_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| constants::DEFAULT_CATALOG_BASE_URL.to_string());
        let timeout_secs = env::var("CATALOG_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(constants::DEFAULT_CATALOG_TIMEOUT_SECS);

        info!("📦 Catalog client configured for {base_url} (timeout {timeout_secs}s)");
        Self::new(&base_url, timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the expected items for one godown x product-type batch.
    /// GET {base}/items?godownId=..&itemCode=..
    pub async fn fetch_expected_items(
        &self,
        godown_id: &str,
        product_prefix: &str,
    ) -> Result<Vec<ExpectedItem>, ScanError> {
        let url = format!("{}/{}", self.base_url, Collection::Items.endpoint());
        let response = self
            .http
            .get(&url)
            .query(&[("godownId", godown_id), ("itemCode", product_prefix)])
            .send()
            .await
            .map_err(|e| ScanError::CatalogError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScanError::CatalogError(format!(
                "Catalog returned {} for {url}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ScanError::CatalogError(format!("Invalid item list from catalog: {e}")))
    }

    /// Submit a completed verification report.
    /// POST {base}/stock-reports
    pub async fn submit_report(&self, report: &ReportPayload) -> Result<(), ScanError> {
        let url = format!("{}/{}", self.base_url, Collection::StockReports.endpoint());
        let response = self
            .http
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| ScanError::CatalogError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScanError::CatalogError(format!(
                "Catalog rejected report with {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Generic read-through for the surrounding bookkeeping screens.
    /// GET {base}/{collection}?search=..
    pub async fn list(
        &self,
        collection: Collection,
        search: Option<&str>,
    ) -> Result<serde_json::Value, ScanError> {
        let url = format!("{}/{}", self.base_url, collection.endpoint());
        let mut request = self.http.get(&url);
        if let Some(term) = search {
            request = request.query(&[("search", term)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScanError::CatalogError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScanError::CatalogError(format!(
                "Catalog returned {} for {url}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ScanError::CatalogError(format!("Invalid response from catalog: {e}")))
    }
}
