//! Period cadence
//!
//! Computes date ranges for consecutive budget periods: monthly, weekly,
//! bi-weekly, or repeating whatever length the previous period had.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::period::check_date_range;
use crate::error::{BudgetError, BudgetResult};

/// How long consecutive periods are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// One month, starting on the day after the previous period ends
    #[default]
    Monthly,
    /// Seven days
    Weekly,
    /// Fourteen days
    BiWeekly,
    /// Same number of days as the previous period
    SameLength,
}

fn out_of_range(start: NaiveDate, end: NaiveDate) -> BudgetError {
    BudgetError::InvalidDateRange { start, end }
}

impl Cadence {
    /// The range that immediately follows `start..=end`
    ///
    /// Monthly ranges run one calendar month from the day after `end`. A
    /// cycle that starts on the 29th to 31st is clamped in short months and
    /// stays on the earlier day afterwards; use `next_range_anchored` to keep
    /// it on a fixed day of the month.
    pub fn next_range(&self, start: NaiveDate, end: NaiveDate) -> BudgetResult<(NaiveDate, NaiveDate)> {
        self.next_range_anchored(start, end, None)
    }

    /// Like `next_range`, but monthly ranges end the day before the next
    /// occurrence of `anchor_day`, clamped to the length of the month
    ///
    /// Other cadences ignore the anchor.
    pub fn next_range_anchored(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        anchor_day: Option<u32>,
    ) -> BudgetResult<(NaiveDate, NaiveDate)> {
        check_date_range(start, end)?;
        if let Some(day) = anchor_day {
            if !(1..=31).contains(&day) {
                return Err(BudgetError::Config(format!(
                    "monthly anchor day must be in 1..=31, got {}",
                    day
                )));
            }
        }
        let next_start = end.succ_opt().ok_or_else(|| out_of_range(start, end))?;

        let next_end = match (self, anchor_day) {
            (Self::Monthly, Some(day)) => {
                next_anchor_after(next_start, day).and_then(|d| d.pred_opt())
            }
            (Self::Monthly, None) => next_start
                .checked_add_months(Months::new(1))
                .and_then(|d| d.pred_opt()),
            (Self::Weekly, _) => next_start.checked_add_signed(Duration::days(6)),
            (Self::BiWeekly, _) => next_start.checked_add_signed(Duration::days(13)),
            (Self::SameLength, _) => next_start.checked_add_signed(end - start),
        }
        .ok_or_else(|| out_of_range(start, end))?;

        Ok((next_start, next_end))
    }

    /// The range containing `date`
    ///
    /// Monthly ranges are calendar months, weekly ranges are ISO weeks,
    /// bi-weekly ranges are anchored on the first Monday of the year, and a
    /// same-length range is the single day.
    pub fn range_containing(&self, date: NaiveDate) -> BudgetResult<(NaiveDate, NaiveDate)> {
        let range = match self {
            Self::Monthly => date.with_day(1).and_then(|first| {
                first
                    .checked_add_months(Months::new(1))
                    .and_then(|d| d.pred_opt())
                    .map(|last| (first, last))
            }),
            Self::Weekly => {
                let offset = i64::from(date.weekday().num_days_from_monday());
                date.checked_sub_signed(Duration::days(offset))
                    .and_then(|monday| {
                        monday
                            .checked_add_signed(Duration::days(6))
                            .map(|sunday| (monday, sunday))
                    })
            }
            Self::BiWeekly => biweekly_anchor(date.year())
                .and_then(|anchor| {
                    if date < anchor {
                        biweekly_anchor(date.year() - 1)
                    } else {
                        Some(anchor)
                    }
                })
                .and_then(|anchor| {
                    let periods = (date - anchor).num_days() / 14;
                    anchor.checked_add_signed(Duration::days(periods * 14))
                })
                .and_then(|start| {
                    start
                        .checked_add_signed(Duration::days(13))
                        .map(|end| (start, end))
                }),
            Self::SameLength => Some((date, date)),
        };

        range.ok_or_else(|| out_of_range(date, date))
    }
}

/// `day` of the given month, clamped to the month's last day
fn clamped_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    first.with_day(day.min(last.day()))
}

/// First date after `date` falling on the clamped `day` of its month
fn next_anchor_after(date: NaiveDate, day: u32) -> Option<NaiveDate> {
    let this_month = clamped_day(date.year(), date.month(), day)?;
    if this_month > date {
        return Some(this_month);
    }
    let following = date.with_day(1)?.checked_add_months(Months::new(1))?;
    clamped_day(following.year(), following.month(), day)
}

/// First Monday of the year
fn biweekly_anchor(year: i32) -> Option<NaiveDate> {
    let jan_1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let days_until_monday = (7 - jan_1.weekday().num_days_from_monday()) % 7;
    jan_1.checked_add_signed(Duration::days(i64::from(days_until_monday)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_next_range() {
        let next = Cadence::Monthly
            .next_range(date(2025, 1, 1), date(2025, 1, 31))
            .unwrap();
        assert_eq!(next, (date(2025, 2, 1), date(2025, 2, 28)));

        let after_december = Cadence::Monthly
            .next_range(date(2024, 12, 1), date(2024, 12, 31))
            .unwrap();
        assert_eq!(after_december, (date(2025, 1, 1), date(2025, 1, 31)));
    }

    #[test]
    fn test_monthly_pay_cycle() {
        let next = Cadence::Monthly
            .next_range(date(2025, 1, 15), date(2025, 2, 14))
            .unwrap();
        assert_eq!(next, (date(2025, 2, 15), date(2025, 3, 14)));
    }

    #[test]
    fn test_monthly_end_of_month_drifts_without_anchor() {
        let next = Cadence::Monthly
            .next_range(date(2024, 12, 31), date(2025, 1, 30))
            .unwrap();
        assert_eq!(next, (date(2025, 1, 31), date(2025, 2, 27)));

        let after = Cadence::Monthly.next_range(next.0, next.1).unwrap();
        assert_eq!(after, (date(2025, 2, 28), date(2025, 3, 27)));
    }

    #[test]
    fn test_monthly_anchor_keeps_day_of_month() {
        let anchor = Some(31);
        let mut range = (date(2024, 12, 31), date(2025, 1, 30));
        let mut starts = Vec::new();
        for _ in 0..4 {
            range = Cadence::Monthly
                .next_range_anchored(range.0, range.1, anchor)
                .unwrap();
            starts.push(range.0);
        }
        assert_eq!(
            starts,
            vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31), date(2025, 4, 30)]
        );
        assert_eq!(range.1, date(2025, 5, 30));

        // A misaligned period is followed by a short one that realigns
        let realigned = Cadence::Monthly
            .next_range_anchored(date(2025, 1, 1), date(2025, 1, 14), Some(1))
            .unwrap();
        assert_eq!(realigned, (date(2025, 1, 15), date(2025, 1, 31)));
    }

    #[test]
    fn test_anchor_is_ignored_by_fixed_length_cadences() {
        let week = Cadence::Weekly
            .next_range_anchored(date(2025, 1, 6), date(2025, 1, 12), Some(31))
            .unwrap();
        assert_eq!(week, (date(2025, 1, 13), date(2025, 1, 19)));
    }

    #[test]
    fn test_invalid_anchor_day() {
        let result = Cadence::Monthly.next_range_anchored(date(2025, 1, 1), date(2025, 1, 31), Some(0));
        assert!(matches!(result, Err(BudgetError::Config(_))));
    }

    #[test]
    fn test_weekly_and_biweekly_next_range() {
        let week = Cadence::Weekly
            .next_range(date(2025, 1, 6), date(2025, 1, 12))
            .unwrap();
        assert_eq!(week, (date(2025, 1, 13), date(2025, 1, 19)));

        let fortnight = Cadence::BiWeekly
            .next_range(date(2025, 1, 6), date(2025, 1, 19))
            .unwrap();
        assert_eq!(fortnight, (date(2025, 1, 20), date(2025, 2, 2)));
    }

    #[test]
    fn test_same_length_next_range() {
        let next = Cadence::SameLength
            .next_range(date(2025, 1, 1), date(2025, 1, 10))
            .unwrap();
        assert_eq!(next, (date(2025, 1, 11), date(2025, 1, 20)));
    }

    #[test]
    fn test_next_range_rejects_reversed_input() {
        let result = Cadence::Monthly.next_range(date(2025, 2, 1), date(2025, 1, 1));
        assert!(matches!(result, Err(BudgetError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_range_containing() {
        assert_eq!(
            Cadence::Monthly.range_containing(date(2024, 2, 17)).unwrap(),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        // 2025-01-15 is a Wednesday
        assert_eq!(
            Cadence::Weekly.range_containing(date(2025, 1, 15)).unwrap(),
            (date(2025, 1, 13), date(2025, 1, 19))
        );
        assert_eq!(
            Cadence::SameLength.range_containing(date(2025, 1, 15)).unwrap(),
            (date(2025, 1, 15), date(2025, 1, 15))
        );
    }

    #[test]
    fn test_biweekly_range_containing() {
        // First Monday of 2025 is January 6
        assert_eq!(
            Cadence::BiWeekly.range_containing(date(2025, 1, 22)).unwrap(),
            (date(2025, 1, 20), date(2025, 2, 2))
        );
        // Before the anchor falls back to the previous year's cycle
        let (start, end) = Cadence::BiWeekly.range_containing(date(2025, 1, 2)).unwrap();
        assert!(start <= date(2025, 1, 2) && date(2025, 1, 2) <= end);
        assert_eq!((end - start).num_days(), 13);
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&Cadence::BiWeekly).unwrap(), r#""bi_weekly""#);
        let cadence: Cadence = serde_json::from_str(r#""same_length""#).unwrap();
        assert_eq!(cadence, Cadence::SameLength);
    }
}
