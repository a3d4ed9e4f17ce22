use std::path::PathBuf;

/// Process-level settings read from `BRANDSCAN_*` environment variables.
///
/// Per-scan knobs live in [`crate::ScanOptions`]; this struct seeds their
/// defaults and owns everything the transport layer needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub catalog_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub workers: usize,
    pub request_delay_ms: u64,
    pub page_budget: usize,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub result_ttl_secs: u64,
}
