//! Records supplied by collaborators outside the engine
//!
//! Spend totals come from transaction aggregation, suggestions from the
//! recommendation source. Both are keyed by category, not allocation.

use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, PeriodId};

/// Total spent in one category during one period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendTotal {
    pub category_id: CategoryId,
    pub period_id: PeriodId,
    pub spent_minor_units: i64,
}

/// A recommended budgeted amount for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category_id: CategoryId,
    pub suggested_minor_units: i64,
}
