use serde::{Deserialize, Serialize};

use pvx_model::PROXY_NETWORK;

/// Tunables of the provisioning engine.
///
/// Every field has a default, so a partial TOML/JSON document is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Worker image reference.
    pub image: String,
    /// Admission ceiling: maximum number of running workers.
    pub max_workers: usize,
    /// Value of `CONCURRENCY` passed to workers.
    pub concurrency: u32,
    /// Network proxies and workers share.
    pub proxy_network: String,
    /// Path of the log viewer, used to build worker log references.
    pub log_viewer_path: String,
    /// Public base URL under which workers upload their result files.
    pub storage_base_url: String,
    /// Location of the result file inside a worker.
    pub result_path: String,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            image: "ghcr.io/algo7/tripadvisor-review-scraper/scraper:latest".to_string(),
            max_workers: 5,
            concurrency: 2,
            proxy_network: PROXY_NETWORK.to_string(),
            log_viewer_path: "/logs-viewer".to_string(),
            storage_base_url: "https://storage.algo7.tools/reviews/".to_string(),
            result_path: "/usr/src/app/reviews.csv".to_string(),
        }
    }
}
