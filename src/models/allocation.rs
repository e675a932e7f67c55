//! Category allocation model
//!
//! One spending category's budgeted amount versus its actual spend for a
//! single period. Allocations are immutable values: every edit returns a new
//! allocation so that a change can live in one period without leaking into a
//! separately held copy.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AllocationId, CategoryId};
use super::money::Money;
use crate::error::{BudgetError, BudgetResult};

/// Percentage used at which an allocation enters the warning band
pub const DEFAULT_WARNING_THRESHOLD: f64 = 90.0;

/// Spending status of an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    Under,
    Warning,
    Over,
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Under => write!(f, "under"),
            Self::Warning => write!(f, "warning"),
            Self::Over => write!(f, "over"),
        }
    }
}

/// Budgeted amount and spend for one category in one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AllocationRecord")]
pub struct CategoryAllocation {
    id: AllocationId,
    category_id: CategoryId,
    name: String,
    budgeted: Money,
    spent: Money,
}

#[derive(Deserialize)]
struct AllocationRecord {
    id: AllocationId,
    category_id: CategoryId,
    name: String,
    budgeted: Money,
    spent: Money,
}

impl TryFrom<AllocationRecord> for CategoryAllocation {
    type Error = BudgetError;

    fn try_from(record: AllocationRecord) -> BudgetResult<Self> {
        let allocation = Self {
            id: record.id,
            category_id: record.category_id,
            name: record.name,
            budgeted: record.budgeted,
            spent: record.spent,
        };
        allocation.validate()?;
        Ok(allocation)
    }
}

pub(crate) fn validate_name(name: &str) -> BudgetResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::InvalidName(
            "name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl CategoryAllocation {
    /// Create an allocation for a brand-new category
    pub fn new(name: &str, budgeted: Money) -> BudgetResult<Self> {
        Self::for_category(CategoryId::new(), name, budgeted)
    }

    /// Create an allocation for an existing category
    pub fn for_category(category_id: CategoryId, name: &str, budgeted: Money) -> BudgetResult<Self> {
        let name = validate_name(name)?;
        let budgeted = budgeted.ensure_non_negative("budgeted")?;
        Ok(Self {
            id: AllocationId::new(),
            category_id,
            name,
            budgeted,
            spent: Money::zero(budgeted.currency()),
        })
    }

    pub fn id(&self) -> AllocationId {
        self.id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budgeted(&self) -> Money {
        self.budgeted
    }

    pub fn spent(&self) -> Money {
        self.spent
    }

    /// Copy with a new budgeted amount
    pub fn with_budgeted(&self, amount: Money) -> BudgetResult<Self> {
        let amount = self.checked_amount(amount, "budgeted")?;
        Ok(Self {
            budgeted: amount,
            ..self.clone()
        })
    }

    /// Copy with the budgeted amount set to an externally suggested value
    ///
    /// Suggestions go through the same validation as manual edits.
    pub fn apply_suggestion(&self, suggested: Money) -> BudgetResult<Self> {
        self.with_budgeted(suggested)
    }

    /// Copy with spend supplied by transaction data
    pub fn with_spent(&self, spent: Money) -> BudgetResult<Self> {
        let spent = self.checked_amount(spent, "spent")?;
        Ok(Self {
            spent,
            ..self.clone()
        })
    }

    /// Copy with a new display label
    pub fn renamed(&self, name: &str) -> BudgetResult<Self> {
        Ok(Self {
            name: validate_name(name)?,
            ..self.clone()
        })
    }

    /// Same category, same name and budget, fresh instance id and no spend
    pub(crate) fn carried_forward(&self) -> Self {
        Self {
            id: AllocationId::new(),
            category_id: self.category_id,
            name: self.name.clone(),
            budgeted: self.budgeted,
            spent: Money::zero(self.budgeted.currency()),
        }
    }

    fn checked_amount(&self, amount: Money, what: &str) -> BudgetResult<Money> {
        if amount.currency() != self.budgeted.currency() {
            return Err(BudgetError::CurrencyMismatch {
                left: self.budgeted.currency(),
                right: amount.currency(),
            });
        }
        amount.ensure_non_negative(what)
    }

    /// Budgeted minus spent; negative when overspent
    pub fn remaining(&self) -> Money {
        // Both sides are non-negative, so the difference cannot overflow.
        Money::new(
            self.budgeted.minor_units() - self.spent.minor_units(),
            self.budgeted.currency(),
        )
    }

    /// `spent / budgeted * 100`, or `None` when nothing is budgeted
    pub fn percentage_used(&self) -> Option<f64> {
        Money::percentage_of(self.spent, self.budgeted)
            .ok()
            .flatten()
    }

    /// Status using the default 90% warning threshold
    pub fn status(&self) -> AllocationStatus {
        self.status_with_threshold(DEFAULT_WARNING_THRESHOLD)
    }

    /// `Over` when spent exceeds budgeted, `Warning` when the percentage used
    /// is in `[threshold, 100)`, otherwise `Under`
    pub fn status_with_threshold(&self, threshold_percent: f64) -> AllocationStatus {
        if self.spent.minor_units() > self.budgeted.minor_units() {
            return AllocationStatus::Over;
        }
        match self.percentage_used() {
            Some(pct) if pct >= threshold_percent && pct < 100.0 => AllocationStatus::Warning,
            _ => AllocationStatus::Under,
        }
    }

    /// Validate an allocation that did not come through a constructor
    pub fn validate(&self) -> BudgetResult<()> {
        validate_name(&self.name)?;
        self.checked_amount(self.budgeted, "budgeted")?;
        self.checked_amount(self.spent, "spent")?;
        Ok(())
    }
}

impl fmt::Display for CategoryAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: budgeted {} | spent {} | remaining {}",
            self.name,
            self.budgeted,
            self.spent,
            self.remaining()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn groceries(budgeted: i64, spent: i64) -> CategoryAllocation {
        CategoryAllocation::new("Groceries", usd(budgeted))
            .unwrap()
            .with_spent(usd(spent))
            .unwrap()
    }

    #[test]
    fn test_new_allocation() {
        let allocation = CategoryAllocation::new("  Groceries ", usd(50000)).unwrap();
        assert_eq!(allocation.name(), "Groceries");
        assert_eq!(allocation.budgeted(), usd(50000));
        assert_eq!(allocation.spent(), usd(0));
        assert_eq!(allocation.remaining(), usd(50000));
    }

    #[test]
    fn test_new_rejects_invalid_input() {
        assert!(matches!(
            CategoryAllocation::new("   ", usd(100)),
            Err(BudgetError::InvalidName(_))
        ));
        assert!(matches!(
            CategoryAllocation::new("Rent", usd(-1)),
            Err(BudgetError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_with_budgeted_returns_new_value() {
        let original = CategoryAllocation::new("Transport", usd(20000)).unwrap();
        let updated = original.with_budgeted(usd(25000)).unwrap();

        assert_eq!(original.budgeted(), usd(20000));
        assert_eq!(updated.budgeted(), usd(25000));
        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.category_id(), original.category_id());
    }

    #[test]
    fn test_with_budgeted_rejects_negative_and_foreign_currency() {
        let allocation = CategoryAllocation::new("Transport", usd(20000)).unwrap();
        assert!(matches!(
            allocation.with_budgeted(usd(-500)),
            Err(BudgetError::InvalidAmount(_))
        ));
        assert!(matches!(
            allocation.with_budgeted(Money::new(100, Currency::EUR)),
            Err(BudgetError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_suggestion() {
        let allocation = CategoryAllocation::new("Dining", usd(30000)).unwrap();
        let suggested = allocation.apply_suggestion(usd(24000)).unwrap();
        assert_eq!(suggested.budgeted(), usd(24000));
        assert!(allocation.apply_suggestion(usd(-1)).is_err());
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(groceries(50000, 10000).status(), AllocationStatus::Under);
        assert_eq!(groceries(50000, 45000).status(), AllocationStatus::Warning);
        assert_eq!(groceries(50000, 49999).status(), AllocationStatus::Warning);
        assert_eq!(groceries(50000, 50001).status(), AllocationStatus::Over);
    }

    #[test]
    fn test_fully_spent_is_not_over() {
        let allocation = groceries(50000, 50000);
        assert_eq!(allocation.percentage_used(), Some(100.0));
        assert_eq!(allocation.remaining(), usd(0));
        assert_eq!(allocation.status(), AllocationStatus::Under);
    }

    #[test]
    fn test_custom_threshold() {
        let allocation = groceries(10000, 8000);
        assert_eq!(allocation.status(), AllocationStatus::Under);
        assert_eq!(
            allocation.status_with_threshold(75.0),
            AllocationStatus::Warning
        );
    }

    #[test]
    fn test_zero_budget_has_no_percentage() {
        let allocation = groceries(0, 1500);
        assert_eq!(allocation.percentage_used(), None);
        assert_eq!(allocation.status(), AllocationStatus::Over);
        assert_eq!(allocation.remaining(), usd(-1500));

        assert_eq!(groceries(0, 0).status(), AllocationStatus::Under);
    }

    #[test]
    fn test_overspent_remaining_is_negative() {
        let allocation = groceries(20000, 26000);
        assert_eq!(allocation.remaining(), usd(-6000));
        assert_eq!(allocation.percentage_used(), Some(130.0));
    }

    #[test]
    fn test_carried_forward_keeps_category_but_not_spend() {
        let allocation = groceries(50000, 42000);
        let next = allocation.carried_forward();

        assert_ne!(next.id(), allocation.id());
        assert_eq!(next.category_id(), allocation.category_id());
        assert_eq!(next.budgeted(), usd(50000));
        assert_eq!(next.spent(), usd(0));
    }

    #[test]
    fn test_renamed() {
        let allocation = groceries(100, 0);
        assert_eq!(allocation.renamed("Food").unwrap().name(), "Food");
        assert!(allocation.renamed("").is_err());
    }

    #[test]
    fn test_serialization() {
        let allocation = groceries(50000, 1234);
        let json = serde_json::to_string(&allocation).unwrap();
        let deserialized: CategoryAllocation = serde_json::from_str(&json).unwrap();
        assert_eq!(allocation, deserialized);
        assert!(deserialized.validate().is_ok());
    }

    #[test]
    fn test_deserialize_rejects_invalid_records() {
        let value = serde_json::to_value(groceries(50000, 1234)).unwrap();

        let mut negative = value.clone();
        negative["budgeted"]["minor_units"] = serde_json::json!(-1);
        assert!(serde_json::from_value::<CategoryAllocation>(negative).is_err());

        let mut unnamed = value;
        unnamed["name"] = serde_json::json!("  ");
        assert!(serde_json::from_value::<CategoryAllocation>(unnamed).is_err());
    }
}
