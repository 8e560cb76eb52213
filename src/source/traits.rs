use crate::model::{DateRange, SalesRecord, SourceError, StoreScope, VisitRecord};

/// Daily foot-traffic counts as synced from the people counters.
#[async_trait::async_trait]
pub trait VisitSource: Send + Sync {
    async fn visit_counts(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> Result<Vec<VisitRecord>, SourceError>;
}

/// Daily revenue and order counts as synced from the ERP.
#[async_trait::async_trait]
pub trait SalesSource: Send + Sync {
    async fn sales_counts(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> Result<Vec<SalesRecord>, SourceError>;
}
