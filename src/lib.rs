//! Budget Engine - budget allocation model for personal-finance front ends
//!
//! This library holds the arithmetic and rules that relate a period's income,
//! per-category allocations, spend, remaining balance, and period-to-period
//! rollover. It performs no I/O beyond loading its own settings; callers load
//! transactions and persist periods and templates themselves.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Engine settings
//! - `error`: Error taxonomy
//! - `models`: Immutable value types (money, allocations, periods, templates)
//! - `services`: Settings-aware orchestration and rollover
//! - `telemetry`: Tracing subscriber bootstrap
//!
//! # Example
//!
//! ```rust
//! use budget_engine::config::Settings;
//! use budget_engine::models::{CategoryAllocation, IncomeSource, Money, RolloverPolicy};
//! use budget_engine::services::{BudgetService, RolloverService};
//! use chrono::NaiveDate;
//!
//! # fn main() -> Result<(), budget_engine::BudgetError> {
//! let settings = Settings::default();
//! let usd = |cents| Money::new(cents, settings.currency);
//!
//! let period = BudgetService::new(&settings).create_period(
//!     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
//!     vec![IncomeSource::new("Salary", usd(320000))?],
//!     vec![CategoryAllocation::new("Housing", usd(180000))?],
//! )?;
//! assert_eq!(period.aggregates().remaining_to_allocate, usd(140000));
//!
//! let rollover = RolloverService::new(&settings);
//! let next = rollover.propose_next(&rollover.close_period(&period), RolloverPolicy::Copy)?;
//! assert_eq!(next.total_allocated(), usd(180000));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use error::{BudgetError, BudgetResult};
