//! Service layer for the budget engine
//!
//! The service layer applies engine settings on top of the value types,
//! adds structured logging, and orchestrates multi-step operations such as
//! rollover.

pub mod budget;
pub mod rollover;

pub use budget::{BudgetOverview, BudgetService, CategorySummary};
pub use rollover::RolloverService;
