//! Snapshot of the persisted report collection
//!
//! Replaced wholesale from the record store after every successful submission. Readers get a
//! clone of the current collection; statistics are recomputed from it on demand.

use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use wsw_common::db::ReportStore;
use wsw_common::stats::{map_points, summarize, MapPoint, StatisticsSummary};
use wsw_common::{Report, Result};

#[derive(Debug, Clone, Default)]
pub struct ReportSnapshot {
    reports: Arc<RwLock<Vec<Report>>>,
}

impl ReportSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refetch the full collection; on error the previous snapshot is kept
    pub async fn refresh(&self, store: &dyn ReportStore) -> Result<usize> {
        let reports = store.list_all().await?;
        let count = reports.len();
        *self.reports.write().await = reports;
        tracing::debug!(count, "Report snapshot refreshed");
        Ok(count)
    }

    /// Reports, newest first
    pub async fn reports(&self) -> Vec<Report> {
        self.reports.read().await.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<Report> {
        self.reports.read().await.iter().find(|r| r.id == id).cloned()
    }

    pub async fn statistics(&self) -> Option<StatisticsSummary> {
        summarize(&self.reports.read().await)
    }

    pub async fn map_points(&self) -> Vec<MapPoint> {
        map_points(&self.reports.read().await)
    }
}
