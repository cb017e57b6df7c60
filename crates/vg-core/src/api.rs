use crate::error::ApiError;
use async_trait::async_trait;
use vg_types::{Coverage, DeleteOutcome, LogsPage, StatsSummary, ValidationResult};

/// The dashboard backend, as seen from the client. Report formatting and
/// validation itself happen on the other side of this trait.
#[async_trait]
pub trait ValidationApi: Send + Sync {
    async fn fetch_logs(&self, page: u32, limit: u32) -> Result<LogsPage, ApiError>;
    async fn fetch_stats(&self) -> Result<StatsSummary, ApiError>;
    async fn fetch_coverage(&self) -> Result<Coverage, ApiError>;
    async fn fetch_event_names(&self) -> Result<Vec<String>, ApiError>;
    async fn download_report(&self, results: &[ValidationResult]) -> Result<Vec<u8>, ApiError>;
    async fn download_valid_events(
        &self,
        results: &[ValidationResult],
    ) -> Result<Vec<u8>, ApiError>;
    async fn delete_logs(&self) -> Result<DeleteOutcome, ApiError>;
}
