//! Rollover policy, edit scope and the budget template
//!
//! The template is the caller-owned source of truth for future periods. An
//! edit scoped to all future periods produces a `TemplateUpdate` that the
//! caller folds into its template; an edit scoped to this period only never
//! touches it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::allocation::{validate_name, CategoryAllocation};
use super::ids::{AllocationId, CategoryId};
use super::income::IncomeSource;
use super::money::{Currency, Money};
use super::period::Period;
use crate::error::{BudgetError, BudgetResult};

/// How the next period is built from the closing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverPolicy {
    /// Clone income sources and allocations verbatim
    #[default]
    Copy,
    /// Same as `Copy`; the caller reviews and edits before committing
    AdjustThenCreate,
    /// Start from an empty period
    Fresh,
}

/// Reach of a change to an allocation's budgeted amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    ThisPeriodOnly,
    AllFuturePeriods,
}

/// A budgeted amount change to carry into future periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    /// The allocation that was edited
    pub allocation_id: AllocationId,
    /// The category whose template entry changes
    pub category_id: CategoryId,
    pub new_amount: Money,
}

/// One category line in a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    category_id: CategoryId,
    name: String,
    budgeted: Money,
}

impl TemplateEntry {
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budgeted(&self) -> Money {
        self.budgeted
    }
}

/// Income sources and category budgets that future periods start from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTemplate {
    currency: Currency,
    income_sources: Vec<IncomeSource>,
    entries: Vec<TemplateEntry>,
}

impl BudgetTemplate {
    /// An empty template
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            income_sources: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Snapshot a period's income sources and allocations
    pub fn from_period(period: &Period) -> Self {
        Self {
            currency: period.currency(),
            income_sources: period.income_sources().to_vec(),
            entries: period
                .allocations()
                .iter()
                .map(|allocation| TemplateEntry {
                    category_id: allocation.category_id(),
                    name: allocation.name().to_string(),
                    budgeted: allocation.budgeted(),
                })
                .collect(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn income_sources(&self) -> &[IncomeSource] {
        &self.income_sources
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn entry(&self, category_id: CategoryId) -> Option<&TemplateEntry> {
        self.entries.iter().find(|e| e.category_id == category_id)
    }

    fn checked_amount(&self, amount: Money) -> BudgetResult<Money> {
        if amount.currency() != self.currency {
            return Err(BudgetError::CurrencyMismatch {
                left: self.currency,
                right: amount.currency(),
            });
        }
        amount.ensure_non_negative("budgeted")
    }

    /// Copy with one category's budgeted amount replaced
    pub fn apply_update(&self, update: &TemplateUpdate) -> BudgetResult<Self> {
        let amount = self.checked_amount(update.new_amount)?;
        let index = self
            .entries
            .iter()
            .position(|e| e.category_id == update.category_id)
            .ok_or_else(|| BudgetError::category_not_found(update.category_id.to_string()))?;

        let mut template = self.clone();
        template.entries[index].budgeted = amount;
        Ok(template)
    }

    /// Fold several updates in order; fails without partial application
    pub fn apply_updates(&self, updates: &[TemplateUpdate]) -> BudgetResult<Self> {
        updates
            .iter()
            .try_fold(self.clone(), |template, update| template.apply_update(update))
    }

    /// Copy with a category appended
    pub fn with_entry(&self, category_id: CategoryId, name: &str, budgeted: Money) -> BudgetResult<Self> {
        let name = validate_name(name)?;
        let budgeted = self.checked_amount(budgeted)?;
        if self.entry(category_id).is_some() {
            return Err(BudgetError::DuplicateCategory(category_id));
        }

        let mut template = self.clone();
        template.entries.push(TemplateEntry {
            category_id,
            name,
            budgeted,
        });
        Ok(template)
    }

    /// Copy without a category; periods already built keep theirs
    pub fn without_category(&self, category_id: CategoryId) -> BudgetResult<Self> {
        if self.entry(category_id).is_none() {
            return Err(BudgetError::category_not_found(category_id.to_string()));
        }

        let mut template = self.clone();
        template.entries.retain(|e| e.category_id != category_id);
        Ok(template)
    }

    /// Build a new active period from this template
    ///
    /// Income sources and allocations get fresh ids; categories keep theirs
    /// and start with no spend. `Fresh` ignores the template's contents.
    pub fn instantiate(
        &self,
        policy: RolloverPolicy,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> BudgetResult<Period> {
        match policy {
            RolloverPolicy::Fresh => {
                Period::new(self.currency, start_date, end_date, Vec::new(), Vec::new())
            }
            RolloverPolicy::Copy | RolloverPolicy::AdjustThenCreate => {
                let income_sources = self
                    .income_sources
                    .iter()
                    .map(IncomeSource::carried_forward)
                    .collect();
                let allocations = self
                    .entries
                    .iter()
                    .map(|e| CategoryAllocation::for_category(e.category_id, &e.name, e.budgeted))
                    .collect::<BudgetResult<Vec<_>>>()?;
                Period::new(self.currency, start_date, end_date, income_sources, allocations)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> Period {
        Period::new(
            Currency::USD,
            date(2025, 1, 1),
            date(2025, 1, 31),
            vec![IncomeSource::new("Salary", usd(320000)).unwrap()],
            vec![
                CategoryAllocation::new("Housing", usd(180000)).unwrap(),
                CategoryAllocation::new("Groceries", usd(50000)).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_period() {
        let period = january();
        let template = BudgetTemplate::from_period(&period);

        assert_eq!(template.currency(), Currency::USD);
        assert_eq!(template.income_sources().len(), 1);
        let names: Vec<&str> = template.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Housing", "Groceries"]);
    }

    #[test]
    fn test_apply_update() {
        let period = january();
        let housing = &period.allocations()[0];
        let template = BudgetTemplate::from_period(&period);

        let update = TemplateUpdate {
            allocation_id: housing.id(),
            category_id: housing.category_id(),
            new_amount: usd(175000),
        };
        let updated = template.apply_update(&update).unwrap();

        assert_eq!(updated.entries()[0].budgeted(), usd(175000));
        assert_eq!(template.entries()[0].budgeted(), usd(180000));
    }

    #[test]
    fn test_apply_update_unknown_category() {
        let template = BudgetTemplate::from_period(&january());
        let update = TemplateUpdate {
            allocation_id: AllocationId::new(),
            category_id: CategoryId::new(),
            new_amount: usd(100),
        };
        assert!(template.apply_update(&update).unwrap_err().is_not_found());
    }

    #[test]
    fn test_apply_updates_is_all_or_nothing() {
        let period = january();
        let template = BudgetTemplate::from_period(&period);
        let good = TemplateUpdate {
            allocation_id: period.allocations()[1].id(),
            category_id: period.allocations()[1].category_id(),
            new_amount: usd(60000),
        };
        let bad = TemplateUpdate {
            new_amount: usd(-1),
            ..good
        };

        assert!(template.apply_updates(&[good, bad]).is_err());
        let applied = template.apply_updates(&[good]).unwrap();
        assert_eq!(applied.entries()[1].budgeted(), usd(60000));
    }

    #[test]
    fn test_with_entry_and_without_category() {
        let template = BudgetTemplate::new(Currency::USD);
        let category = CategoryId::new();

        let template = template.with_entry(category, "Savings", usd(40000)).unwrap();
        assert!(matches!(
            template.with_entry(category, "Savings again", usd(1)),
            Err(BudgetError::DuplicateCategory(_))
        ));

        let removed = template.without_category(category).unwrap();
        assert!(removed.entries().is_empty());
        assert!(removed.without_category(category).unwrap_err().is_not_found());
    }

    #[test]
    fn test_instantiate_copy() {
        let period = january();
        let next = BudgetTemplate::from_period(&period)
            .instantiate(RolloverPolicy::Copy, date(2025, 2, 1), date(2025, 2, 28))
            .unwrap();

        assert_ne!(next.id(), period.id());
        assert_eq!(next.income(), usd(320000));
        assert_ne!(next.income_sources()[0].id(), period.income_sources()[0].id());
        for (old, new) in period.allocations().iter().zip(next.allocations()) {
            assert_ne!(old.id(), new.id());
            assert_eq!(old.category_id(), new.category_id());
            assert_eq!(old.budgeted(), new.budgeted());
        }
    }

    #[test]
    fn test_instantiate_fresh() {
        let next = BudgetTemplate::from_period(&january())
            .instantiate(RolloverPolicy::Fresh, date(2025, 2, 1), date(2025, 2, 28))
            .unwrap();
        assert!(next.income_sources().is_empty());
        assert!(next.allocations().is_empty());
        assert_eq!(next.currency(), Currency::USD);
    }

    #[test]
    fn test_instantiate_rejects_reversed_dates() {
        let result = BudgetTemplate::from_period(&january()).instantiate(
            RolloverPolicy::Copy,
            date(2025, 2, 28),
            date(2025, 2, 1),
        );
        assert!(matches!(result, Err(BudgetError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_policy_serialization() {
        let json = serde_json::to_string(&RolloverPolicy::AdjustThenCreate).unwrap();
        assert_eq!(json, r#""adjust_then_create""#);
        let scope: EditScope = serde_json::from_str(r#""all_future_periods""#).unwrap();
        assert_eq!(scope, EditScope::AllFuturePeriods);
    }
}
