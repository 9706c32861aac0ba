use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of a pack action. Rejections are values, not errors: a repeated scan of an
/// already-packed shipment is an expected outcome the caller shows to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    Packed { rows: u64 },
    AlreadyPacked,
    AlreadyDispatched,
    /// The shipment was cancelled; its open rows no longer accept a pack action.
    CancelledShipment,
    /// No ledger rows exist and no cached detail to seed them from.
    UnknownShipment,
}

impl PackOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, PackOutcome::Packed { .. })
    }
}

impl Display for PackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackOutcome::Packed { rows } => write!(f, "Marked {rows} lines as packed"),
            PackOutcome::AlreadyPacked => write!(f, "This shipment has already been packed"),
            PackOutcome::AlreadyDispatched => write!(f, "This shipment has already been dispatched"),
            PackOutcome::CancelledShipment => write!(f, "This shipment was cancelled and cannot be packed"),
            PackOutcome::UnknownShipment => write!(f, "Unknown shipment; scan it first"),
        }
    }
}

/// Result of a dispatch action. Same value-not-error convention as [`PackOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched { rows: u64 },
    NotFullyPacked,
    AlreadyDispatched,
    /// The marketplace reports the shipment as cancelled; dispatch is refused.
    CancelledUpstream,
    UnknownShipment,
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, DispatchOutcome::Dispatched { .. })
    }
}

impl Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchOutcome::Dispatched { rows } => write!(f, "Marked {rows} lines as dispatched"),
            DispatchOutcome::NotFullyPacked => write!(f, "Not every line of this shipment is packed yet"),
            DispatchOutcome::AlreadyDispatched => write!(f, "This shipment has already been dispatched"),
            DispatchOutcome::CancelledUpstream => write!(f, "The shipment was cancelled and cannot be dispatched"),
            DispatchOutcome::UnknownShipment => write!(f, "Unknown shipment; scan it first"),
        }
    }
}

/// Counts returned by a vendor-catalog bulk persist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VendorSyncStats {
    pub inserted: u64,
    pub updated: u64,
}

/// Half-open time window for dashboard queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl ReportWindow {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self { since, until }
    }

    /// The rolling window ending now, typically one business day.
    pub fn last_hours(hours: i64) -> Self {
        let until = Utc::now();
        Self { since: until - chrono::Duration::hours(hours), until }
    }
}

/// Windowed dashboard counts per logistic-type partition, excluding marketplace-fulfilled
/// shipments, plus the cancelled shipment ids seen in the window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardReport {
    pub partitions: Vec<LogisticPartition>,
    pub cancelled_shipments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogisticPartition {
    pub logistic_type: String,
    /// Distinct shipments whose resolution landed in the window.
    pub seen: u64,
    /// Distinct shipments packed within the window.
    pub packed: u64,
}
