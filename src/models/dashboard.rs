use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate job counts shown on the dashboard. Always computed at read time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    /// Jobs per technician, keyed by technician name.
    pub per_technician: BTreeMap<String, u64>,
}
