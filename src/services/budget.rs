//! Budget service
//!
//! Builds periods in the configured currency, applies external spend and
//! suggestion feeds, performs scoped allocation edits, and produces the
//! per-category overview screens render.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Settings;
use crate::error::BudgetResult;
use crate::models::{
    AllocationEdit, AllocationId, AllocationStatus, CategoryAllocation, CategoryId, EditScope,
    IncomeSource, Money, Period, PeriodAggregates, PeriodId, SpendTotal, Suggestion,
};

/// Service for period construction and allocation edits
pub struct BudgetService<'a> {
    settings: &'a Settings,
}

/// One category row of a budget overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub allocation_id: AllocationId,
    pub category_id: CategoryId,
    pub name: String,
    pub budgeted: Money,
    pub spent: Money,
    pub remaining: Money,
    pub percentage_used: Option<f64>,
    pub status: AllocationStatus,
}

/// Budget overview for a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetOverview {
    pub period_id: PeriodId,
    pub aggregates: PeriodAggregates,
    pub categories: Vec<CategorySummary>,
}

impl BudgetOverview {
    /// Categories whose spend exceeds their budget
    pub fn overspent(&self) -> impl Iterator<Item = &CategorySummary> {
        self.categories
            .iter()
            .filter(|c| c.status == AllocationStatus::Over)
    }
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Create an active period in the configured currency
    pub fn create_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        income_sources: Vec<IncomeSource>,
        allocations: Vec<CategoryAllocation>,
    ) -> BudgetResult<Period> {
        let period = Period::new(
            self.settings.currency,
            start_date,
            end_date,
            income_sources,
            allocations,
        )
        .inspect_err(|e| tracing::warn!(error = %e, "rejected period"))?;

        tracing::debug!(
            period_id = %period.id(),
            start = %start_date,
            end = %end_date,
            allocations = period.allocations().len(),
            "created period"
        );
        Ok(period)
    }

    /// Create an empty period covering `date` under the configured cadence
    pub fn create_period_containing(&self, date: NaiveDate) -> BudgetResult<Period> {
        let (start, end) = self.settings.cadence.range_containing(date)?;
        self.create_period(start, end, Vec::new(), Vec::new())
    }

    /// Change an allocation's budget for this period or going forward
    pub fn edit_allocation(
        &self,
        period: &Period,
        allocation_id: AllocationId,
        new_amount: Money,
        scope: EditScope,
    ) -> BudgetResult<AllocationEdit> {
        let before = period.allocation(allocation_id).map(|a| a.budgeted());
        let edit = period
            .update_allocation_amount(allocation_id, new_amount, scope)
            .inspect_err(|e| {
                tracing::warn!(
                    period_id = %period.id(),
                    allocation_id = %allocation_id,
                    error = %e,
                    "allocation edit rejected"
                )
            })?;

        tracing::debug!(
            period_id = %period.id(),
            allocation_id = %allocation_id,
            before = before.map(|m| m.minor_units()),
            after = new_amount.minor_units(),
            ?scope,
            "allocation budget changed"
        );
        Ok(edit)
    }

    /// Apply spend totals from transaction aggregation
    pub fn apply_spend_totals(&self, period: &Period, totals: &[SpendTotal]) -> BudgetResult<Period> {
        let updated = period.apply_spend_totals(totals)?;
        tracing::debug!(
            period_id = %period.id(),
            received = totals.len(),
            total_spent = updated.aggregates().total_spent.minor_units(),
            "applied spend totals"
        );
        Ok(updated)
    }

    /// Apply recommended amounts in order; all or nothing
    pub fn apply_suggestions(&self, period: &Period, suggestions: &[Suggestion]) -> BudgetResult<Period> {
        let updated = suggestions
            .iter()
            .try_fold(period.clone(), |current, suggestion| {
                current.apply_suggestion(suggestion)
            })?;
        tracing::debug!(
            period_id = %period.id(),
            applied = suggestions.len(),
            "applied suggestions"
        );
        Ok(updated)
    }

    /// Aggregates plus a status row per category, in allocation order
    pub fn overview(&self, period: &Period) -> BudgetOverview {
        let threshold = self.settings.warning_threshold_percent;
        let categories = period
            .allocations()
            .iter()
            .map(|allocation| CategorySummary {
                allocation_id: allocation.id(),
                category_id: allocation.category_id(),
                name: allocation.name().to_string(),
                budgeted: allocation.budgeted(),
                spent: allocation.spent(),
                remaining: allocation.remaining(),
                percentage_used: allocation.percentage_used(),
                status: allocation.status_with_threshold(threshold),
            })
            .collect();

        BudgetOverview {
            period_id: period.id(),
            aggregates: period.aggregates(),
            categories,
        }
    }
}
