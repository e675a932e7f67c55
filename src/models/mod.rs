//! Core value types for the budget engine
//!
//! Money, category allocations, income sources, periods, cadences and the
//! rollover template. Every type is an immutable value; edits return new
//! values.

pub mod allocation;
pub mod cadence;
pub mod feed;
pub mod ids;
pub mod income;
pub mod money;
pub mod period;
pub mod rollover;

pub use allocation::{AllocationStatus, CategoryAllocation, DEFAULT_WARNING_THRESHOLD};
pub use cadence::Cadence;
pub use feed::{SpendTotal, Suggestion};
pub use ids::{AllocationId, CategoryId, IncomeSourceId, PeriodId};
pub use income::IncomeSource;
pub use money::{Currency, Money};
pub use period::{AllocationEdit, Period, PeriodAggregates, PeriodState};
pub use rollover::{BudgetTemplate, EditScope, RolloverPolicy, TemplateEntry, TemplateUpdate};
