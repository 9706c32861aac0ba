use crate::traits::{DashboardReport, DashboardReporting, FulfillmentDatabase, FulfillmentStoreError, ReportWindow};

/// Read-only dashboard queries. Mutates nothing, by construction.
pub struct DashboardApi<B> {
    db: B,
}

impl<B> DashboardApi<B>
where B: FulfillmentDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Distinct-shipment counts per logistic-type partition (marketplace-fulfilled excluded),
    /// split into seen-in-window vs packed-in-window, plus the cancelled shipment ids in window.
    pub async fn report(&self, window: &ReportWindow) -> Result<DashboardReport, FulfillmentStoreError> {
        self.db.dashboard_report(window).await
    }
}
