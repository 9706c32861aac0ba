use crate::traits::{DashboardReport, FulfillmentStoreError, ReportWindow};

#[allow(async_fn_in_trait)]
pub trait DashboardReporting {
    /// Windowed, read-only counts over the cache and ledger. Mutates nothing.
    async fn dashboard_report(&self, window: &ReportWindow) -> Result<DashboardReport, FulfillmentStoreError>;
}
