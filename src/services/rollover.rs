//! Rollover service
//!
//! Drives a period through closing and proposes the next period under a
//! rollover policy, with dates either given explicitly or derived from the
//! configured cadence.

use chrono::{Duration, NaiveDate};

use crate::config::Settings;
use crate::error::BudgetResult;
use crate::models::{BudgetTemplate, Period, PeriodState, RolloverPolicy};

/// Service for period lifecycle and rollover
pub struct RolloverService<'a> {
    settings: &'a Settings,
}

impl<'a> RolloverService<'a> {
    /// Create a new rollover service
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Whether an active period is within the closing window on `today`
    pub fn is_due_for_closing(&self, period: &Period, today: NaiveDate) -> bool {
        if period.state() != PeriodState::Active {
            return false;
        }
        let lead = Duration::days(i64::from(self.settings.closing_lead_days));
        match period.end_date().checked_sub_signed(lead) {
            Some(window_start) => today >= window_start,
            None => true,
        }
    }

    /// Move an active period into closing
    pub fn begin_closing(&self, period: &Period) -> BudgetResult<Period> {
        let closing = period.begin_closing()?;
        tracing::info!(period_id = %period.id(), "period closing");
        Ok(closing)
    }

    /// Mark a period closed; it is kept for history
    pub fn close_period(&self, period: &Period) -> Period {
        let closed = period.close();
        tracing::info!(
            period_id = %period.id(),
            previous_state = %period.state(),
            "period closed"
        );
        closed
    }

    /// Build the next period from `closing` itself
    pub fn propose_rollover(
        &self,
        closing: &Period,
        policy: RolloverPolicy,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> BudgetResult<Period> {
        let template = BudgetTemplate::from_period(closing);
        let next = self.propose_from_template(&template, policy, start_date, end_date)?;
        tracing::info!(
            from = %closing.id(),
            to = %next.id(),
            ?policy,
            "proposed rollover"
        );
        Ok(next)
    }

    /// Build the next period from a caller-owned template
    ///
    /// Use this when edits scoped to all future periods have been folded into
    /// the template, so this-period-only edits do not carry forward.
    pub fn propose_from_template(
        &self,
        template: &BudgetTemplate,
        policy: RolloverPolicy,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> BudgetResult<Period> {
        let next = template
            .instantiate(policy, start_date, end_date)
            .inspect_err(|e| tracing::warn!(error = %e, ?policy, "rollover rejected"))?;

        tracing::debug!(
            period_id = %next.id(),
            start = %start_date,
            end = %end_date,
            allocations = next.allocations().len(),
            "instantiated template"
        );
        Ok(next)
    }

    /// Build the period that follows `closing` under the configured cadence
    pub fn propose_next(&self, closing: &Period, policy: RolloverPolicy) -> BudgetResult<Period> {
        let (start, end) = self.settings.cadence.next_range_anchored(
            closing.start_date(),
            closing.end_date(),
            self.settings.monthly_anchor_day,
        )?;
        self.propose_rollover(closing, policy, start, end)
    }

    /// `propose_next` with the configured default policy
    pub fn propose_next_default(&self, closing: &Period) -> BudgetResult<Period> {
        self.propose_next(closing, self.settings.default_rollover_policy)
    }
}
