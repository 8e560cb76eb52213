use crate::model::{DateRange, SalesRecord, SourceError, StoreScope, VisitRecord};
use crate::source::traits::{SalesSource, VisitSource};
use crate::storage::SqliteStorage;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Reads both sources from the database the sync jobs write into.
#[derive(Clone)]
pub struct SqliteSource {
    storage: Arc<Mutex<SqliteStorage>>,
}

impl SqliteSource {
    pub fn new(storage: Arc<Mutex<SqliteStorage>>) -> Self {
        Self { storage }
    }
}

#[async_trait::async_trait]
impl VisitSource for SqliteSource {
    async fn visit_counts(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> Result<Vec<VisitRecord>, SourceError> {
        Ok(self.storage.lock().await.visit_counts(scope, range)?)
    }
}

#[async_trait::async_trait]
impl SalesSource for SqliteSource {
    async fn sales_counts(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> Result<Vec<SalesRecord>, SourceError> {
        Ok(self.storage.lock().await.sales_counts(scope, range)?)
    }
}
