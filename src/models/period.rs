//! Budget period model
//!
//! A period owns its income sources and an ordered list of category
//! allocations. Every edit returns a fully validated new `Period`; a failed
//! edit leaves the original untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::allocation::CategoryAllocation;
use super::feed::{SpendTotal, Suggestion};
use super::ids::{AllocationId, CategoryId, IncomeSourceId, PeriodId};
use super::income::IncomeSource;
use super::money::{Currency, Money};
use super::rollover::{EditScope, TemplateUpdate};
use crate::error::{BudgetError, BudgetResult};

/// Lifecycle of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodState {
    /// Current period, accepting edits
    #[default]
    Active,
    /// Near its end date; only this-period-only amount edits are accepted
    Closing,
    /// Retained for history
    Closed,
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Totals derived from a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregates {
    pub income: Money,
    pub total_allocated: Money,
    pub total_spent: Money,
    /// Sum of every allocation's remaining amount
    pub total_remaining: Money,
    /// Income minus total allocated; negative when over-allocated
    pub remaining_to_allocate: Money,
    /// `None` when income is zero
    pub allocation_percentage: Option<f64>,
    pub is_over_allocated: bool,
}

/// Result of an allocation amount edit
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEdit {
    pub period: Period,
    /// Present only for edits scoped to all future periods
    pub template_update: Option<TemplateUpdate>,
}

/// One budgeting cycle with its income and category allocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PeriodRecord")]
pub struct Period {
    id: PeriodId,
    currency: Currency,
    start_date: NaiveDate,
    /// Inclusive
    end_date: NaiveDate,
    income_sources: Vec<IncomeSource>,
    allocations: Vec<CategoryAllocation>,
    #[serde(default)]
    state: PeriodState,
}

/// Persisted form of a period, validated before it becomes a `Period`
#[derive(Deserialize)]
struct PeriodRecord {
    id: PeriodId,
    currency: Currency,
    start_date: NaiveDate,
    end_date: NaiveDate,
    income_sources: Vec<IncomeSource>,
    allocations: Vec<CategoryAllocation>,
    #[serde(default)]
    state: PeriodState,
}

impl TryFrom<PeriodRecord> for Period {
    type Error = BudgetError;

    fn try_from(record: PeriodRecord) -> BudgetResult<Self> {
        let period = Self {
            id: record.id,
            currency: record.currency,
            start_date: record.start_date,
            end_date: record.end_date,
            income_sources: record.income_sources,
            allocations: record.allocations,
            state: record.state,
        };
        period.validate()?;
        Ok(period)
    }
}

pub(crate) fn check_date_range(start: NaiveDate, end: NaiveDate) -> BudgetResult<()> {
    if end < start {
        return Err(BudgetError::InvalidDateRange { start, end });
    }
    Ok(())
}

// Every `Period` is validated on construction and deserialization, so its
// totals fit in minor units.
fn sum_units(amounts: impl Iterator<Item = Money>) -> i64 {
    amounts.fold(0i64, |total, m| total.saturating_add(m.minor_units()))
}

impl Period {
    /// Create an active period
    pub fn new(
        currency: Currency,
        start_date: NaiveDate,
        end_date: NaiveDate,
        income_sources: Vec<IncomeSource>,
        allocations: Vec<CategoryAllocation>,
    ) -> BudgetResult<Self> {
        let period = Self {
            id: PeriodId::new(),
            currency,
            start_date,
            end_date,
            income_sources,
            allocations,
            state: PeriodState::Active,
        };
        period.validate()?;
        Ok(period)
    }

    /// Create an active period with no income and no allocations
    pub fn empty(currency: Currency, start_date: NaiveDate, end_date: NaiveDate) -> BudgetResult<Self> {
        Self::new(currency, start_date, end_date, Vec::new(), Vec::new())
    }

    pub fn id(&self) -> PeriodId {
        self.id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn state(&self) -> PeriodState {
        self.state
    }

    pub fn income_sources(&self) -> &[IncomeSource] {
        &self.income_sources
    }

    pub fn allocations(&self) -> &[CategoryAllocation] {
        &self.allocations
    }

    pub fn allocation(&self, id: AllocationId) -> Option<&CategoryAllocation> {
        self.allocations.iter().find(|a| a.id() == id)
    }

    pub fn allocation_for_category(&self, category_id: CategoryId) -> Option<&CategoryAllocation> {
        self.allocations
            .iter()
            .find(|a| a.category_id() == category_id)
    }

    /// Check if a date falls within this period (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Sum of all income sources
    pub fn income(&self) -> Money {
        Money::new(
            sum_units(self.income_sources.iter().map(IncomeSource::amount)),
            self.currency,
        )
    }

    /// Sum of all budgeted amounts
    pub fn total_allocated(&self) -> Money {
        Money::new(
            sum_units(self.allocations.iter().map(CategoryAllocation::budgeted)),
            self.currency,
        )
    }

    /// Derive totals, remaining-to-allocate and the over-allocation flag
    pub fn aggregates(&self) -> PeriodAggregates {
        let income = self.income();
        let total_allocated = self.total_allocated();
        let total_spent = Money::new(
            sum_units(self.allocations.iter().map(CategoryAllocation::spent)),
            self.currency,
        );
        let total_remaining = Money::new(
            total_allocated.minor_units().saturating_sub(total_spent.minor_units()),
            self.currency,
        );
        let remaining_to_allocate = Money::new(
            income.minor_units().saturating_sub(total_allocated.minor_units()),
            self.currency,
        );

        PeriodAggregates {
            income,
            total_allocated,
            total_spent,
            total_remaining,
            remaining_to_allocate,
            allocation_percentage: Money::percentage_of(total_allocated, income)
                .ok()
                .flatten(),
            is_over_allocated: total_allocated.minor_units() > income.minor_units(),
        }
    }

    /// Validate a period that did not come through a constructor
    ///
    /// Checks the date range, names and amounts, currencies, id and category
    /// uniqueness, and that every total fits in minor units.
    pub fn validate(&self) -> BudgetResult<()> {
        check_date_range(self.start_date, self.end_date)?;

        for source in &self.income_sources {
            source.validate()?;
            self.ensure_currency(source.amount())?;
        }

        let mut ids = HashSet::new();
        let mut categories = HashSet::new();
        for allocation in &self.allocations {
            allocation.validate()?;
            self.ensure_currency(allocation.budgeted())?;
            if !ids.insert(allocation.id()) {
                return Err(BudgetError::DuplicateAllocationId(allocation.id()));
            }
            if !categories.insert(allocation.category_id()) {
                return Err(BudgetError::DuplicateCategory(allocation.category_id()));
            }
        }

        Money::try_sum(self.income_sources.iter().map(IncomeSource::amount), self.currency)?;
        Money::try_sum(self.allocations.iter().map(CategoryAllocation::budgeted), self.currency)?;
        Money::try_sum(self.allocations.iter().map(CategoryAllocation::spent), self.currency)?;
        Ok(())
    }

    fn ensure_currency(&self, amount: Money) -> BudgetResult<()> {
        if amount.currency() != self.currency {
            return Err(BudgetError::CurrencyMismatch {
                left: self.currency,
                right: amount.currency(),
            });
        }
        Ok(())
    }

    fn ensure_active(&self) -> BudgetResult<()> {
        if self.state != PeriodState::Active {
            return Err(BudgetError::PeriodLocked {
                period_id: self.id,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Same id, dates and state with new contents, validated as a whole
    fn rebuilt(
        &self,
        income_sources: Vec<IncomeSource>,
        allocations: Vec<CategoryAllocation>,
    ) -> BudgetResult<Self> {
        let period = Self {
            income_sources,
            allocations,
            ..self.clone()
        };
        period.validate()?;
        Ok(period)
    }

    fn with_allocations(&self, allocations: Vec<CategoryAllocation>) -> BudgetResult<Self> {
        self.rebuilt(self.income_sources.clone(), allocations)
    }

    fn allocation_index(&self, id: AllocationId) -> BudgetResult<usize> {
        self.allocations
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| BudgetError::allocation_not_found(id.to_string()))
    }

    fn category_index(&self, category_id: CategoryId) -> Option<usize> {
        self.allocations
            .iter()
            .position(|a| a.category_id() == category_id)
    }

    fn income_source_index(&self, id: IncomeSourceId) -> BudgetResult<usize> {
        self.income_sources
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| BudgetError::income_source_not_found(id.to_string()))
    }

    /// Append a named income source
    pub fn add_income_source(&self, name: &str, amount: Money) -> BudgetResult<Self> {
        self.ensure_active()?;
        self.ensure_currency(amount)?;
        let mut sources = self.income_sources.clone();
        sources.push(IncomeSource::new(name, amount)?);
        self.rebuilt(sources, self.allocations.clone())
    }

    /// Change one income source's amount
    pub fn update_income_source(&self, id: IncomeSourceId, amount: Money) -> BudgetResult<Self> {
        self.ensure_active()?;
        let index = self.income_source_index(id)?;
        self.ensure_currency(amount)?;
        let mut sources = self.income_sources.clone();
        sources[index] = sources[index].with_amount(amount)?;
        self.rebuilt(sources, self.allocations.clone())
    }

    pub fn remove_income_source(&self, id: IncomeSourceId) -> BudgetResult<Self> {
        self.ensure_active()?;
        let index = self.income_source_index(id)?;
        let mut sources = self.income_sources.clone();
        sources.remove(index);
        self.rebuilt(sources, self.allocations.clone())
    }

    /// Append an allocation; ids and categories must be unique
    pub fn add_allocation(&self, allocation: CategoryAllocation) -> BudgetResult<Self> {
        self.ensure_active()?;
        let mut allocations = self.allocations.clone();
        allocations.push(allocation);
        self.with_allocations(allocations)
    }

    pub fn remove_allocation(&self, id: AllocationId) -> BudgetResult<Self> {
        self.ensure_active()?;
        let index = self.allocation_index(id)?;
        let mut allocations = self.allocations.clone();
        allocations.remove(index);
        self.with_allocations(allocations)
    }

    /// Change an allocation's budgeted amount
    ///
    /// `ThisPeriodOnly` is accepted in every state. `AllFuturePeriods`
    /// requires an active period and also returns the template update the
    /// caller must persist for future rollovers.
    pub fn update_allocation_amount(
        &self,
        id: AllocationId,
        new_amount: Money,
        scope: EditScope,
    ) -> BudgetResult<AllocationEdit> {
        let index = self.allocation_index(id)?;
        if scope == EditScope::AllFuturePeriods {
            self.ensure_active()?;
        }

        let mut allocations = self.allocations.clone();
        allocations[index] = allocations[index].with_budgeted(new_amount)?;
        let period = self.with_allocations(allocations)?;

        let template_update = match scope {
            EditScope::ThisPeriodOnly => None,
            EditScope::AllFuturePeriods => Some(TemplateUpdate {
                allocation_id: id,
                category_id: self.allocations[index].category_id(),
                new_amount,
            }),
        };

        Ok(AllocationEdit {
            period,
            template_update,
        })
    }

    /// Split income evenly across allocations, remainder on the first
    ///
    /// The budgeted amounts always sum exactly to income. A period without
    /// allocations is returned unchanged.
    pub fn distribute_evenly(&self) -> BudgetResult<Self> {
        self.ensure_active()?;
        if self.allocations.is_empty() {
            return Ok(self.clone());
        }

        let shares = self.income().split_evenly(self.allocations.len());
        let allocations = self
            .allocations
            .iter()
            .zip(shares)
            .map(|(allocation, share)| allocation.with_budgeted(share))
            .collect::<BudgetResult<Vec<_>>>()?;
        self.with_allocations(allocations)
    }

    /// Zero every budgeted amount, keeping the allocations themselves
    pub fn clear_all_allocations(&self) -> BudgetResult<Self> {
        self.ensure_active()?;
        let zero = Money::zero(self.currency);
        let allocations = self
            .allocations
            .iter()
            .map(|allocation| allocation.with_budgeted(zero))
            .collect::<BudgetResult<Vec<_>>>()?;
        self.with_allocations(allocations)
    }

    /// Set the budgeted amount of a category to a recommended value
    pub fn apply_suggestion(&self, suggestion: &Suggestion) -> BudgetResult<Self> {
        self.ensure_active()?;
        let index = self
            .category_index(suggestion.category_id)
            .ok_or_else(|| BudgetError::category_not_found(suggestion.category_id.to_string()))?;

        let amount = Money::new(suggestion.suggested_minor_units, self.currency);
        let mut allocations = self.allocations.clone();
        allocations[index] = allocations[index].apply_suggestion(amount)?;
        self.with_allocations(allocations)
    }

    /// Record one category's spend; accepted in every state
    pub fn apply_spend(&self, category_id: CategoryId, spent: Money) -> BudgetResult<Self> {
        let index = self
            .category_index(category_id)
            .ok_or_else(|| BudgetError::category_not_found(category_id.to_string()))?;

        let mut allocations = self.allocations.clone();
        allocations[index] = allocations[index].with_spent(spent)?;
        self.with_allocations(allocations)
    }

    /// Record spend totals from transaction aggregation
    ///
    /// Totals for another period or for a category this period does not
    /// allocate are skipped, so a removed category's spend never reappears.
    pub fn apply_spend_totals(&self, totals: &[SpendTotal]) -> BudgetResult<Self> {
        let mut allocations = self.allocations.clone();
        for total in totals.iter().filter(|t| t.period_id == self.id) {
            if let Some(index) = self.category_index(total.category_id) {
                let spent = Money::new(total.spent_minor_units, self.currency);
                allocations[index] = allocations[index].with_spent(spent)?;
            }
        }
        self.with_allocations(allocations)
    }

    /// Active to closing; closing again is a no-op
    pub fn begin_closing(&self) -> BudgetResult<Self> {
        match self.state {
            PeriodState::Active | PeriodState::Closing => Ok(Self {
                state: PeriodState::Closing,
                ..self.clone()
            }),
            PeriodState::Closed => Err(BudgetError::PeriodLocked {
                period_id: self.id,
                state: self.state,
            }),
        }
    }

    /// Mark the period closed; closing a closed period is a no-op
    pub fn close(&self) -> Self {
        Self {
            state: PeriodState::Closed,
            ..self.clone()
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}..{} ({})",
            self.id,
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d"),
            self.state
        )
    }
}
