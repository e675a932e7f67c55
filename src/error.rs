//! Custom error types for the budget engine
//!
//! This module defines the error taxonomy for the engine using thiserror.
//! Every error is local and recoverable by the caller; no operation leaves a
//! value half-modified when it fails.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{AllocationId, CategoryId, Currency, PeriodId, PeriodState};

/// The main error type for budget engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BudgetError {
    /// Negative, overflowing or unparseable money value
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Empty or whitespace-only label
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// End date before start date
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Two allocations in one period share an id
    #[error("Duplicate allocation id: {0}")]
    DuplicateAllocationId(AllocationId),

    /// Two allocations in one period reference the same category
    #[error("Category already allocated in this period: {0}")]
    DuplicateCategory(CategoryId),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Arithmetic across two currencies
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// Not a three-letter currency code
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// The period's lifecycle state does not accept this edit
    #[error("Period {period_id} is {state} and does not accept this change")]
    PeriodLocked { period_id: PeriodId, state: PeriodState },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl BudgetError {
    /// Create a "not found" error for allocations
    pub fn allocation_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Allocation",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for income sources
    pub fn income_source_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Income source",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error rejects caller input (as opposed to I/O or config)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidName(_)
                | Self::InvalidDateRange { .. }
                | Self::InvalidCurrency(_)
        )
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for budget engine operations
pub type BudgetResult<T> = Result<T, BudgetError>;
