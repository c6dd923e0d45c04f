//! Cross-day aggregation
//!
//! Turns the date-ordered series of [`DailySummary`] values into the
//! report's per-day entries: trailing-window actives, installs, new-user
//! retention, error rates, and the day's errors by frequency.
//!
//! Installs and retention depend on every earlier day, so the series is
//! processed as a single left fold that threads a [`CohortState`]
//! accumulator: the cumulative set of users seen so far plus each day's
//! new-user cohort. Summaries themselves are only read.
//!
//! # Examples
//!
//! ```
//! use telstat::aggregation::Aggregator;
//! use telstat_core::types::{DailyDate, RawSessionRecord};
//! use telstat_logs::summarize_day;
//!
//! let record = |user: &str| -> RawSessionRecord {
//!     serde_json::from_str(&format!(
//!         r#"{{"userID":"{user}","version":"0.14.0","system":{{"osPlatform":"linux"}}}}"#
//!     ))
//!     .unwrap()
//! };
//! let day1: DailyDate = "2024-01-01".parse().unwrap();
//! let days = vec![
//!     summarize_day(day1, vec![record("a"), record("b")]),
//!     summarize_day(day1.succ(), vec![record("a"), record("c")]),
//! ];
//!
//! let combined = Aggregator::combine(&days).unwrap();
//! assert_eq!(combined[0].installs, 2);
//! assert_eq!(combined[1].installs, 1);
//! assert_eq!(combined[1].actives.today, Some(2));
//! ```

use std::collections::HashSet;
use telstat_core::aggregation_types::{
    Actives, CombinedDaySummary, DailySummary, ErrorRates, Retention, SessionCounts,
};
use telstat_core::error::{Result, TelstatError};
use telstat_core::types::UserId;
use telstat_core::version::latest_version;
use tracing::debug;

/// Cohort to measure, window to measure it in, and the first day it applies
#[derive(Debug, Clone, Copy)]
struct RetentionHorizon {
    /// Days back to the cohort's install day
    offset: usize,
    /// Trailing window, in days, in which a cohort member counts as retained
    window: usize,
    /// First index at which the figure is reported
    min_index: usize,
}

const DAY1: RetentionHorizon = RetentionHorizon {
    offset: 1,
    window: 1,
    min_index: 2,
};

// NOTE: day7 and day28 look at a single day, not a seven- or
// twenty-eight-day window, while day30to60 looks at thirty. This is most
// likely unintended, but every published figure was computed this way.
// Kept as-is until the metric owners decide; pinned by
// test_day7_and_day28_use_one_day_window.
const DAY7: RetentionHorizon = RetentionHorizon {
    offset: 7,
    window: 1,
    min_index: 8,
};

const DAY28: RetentionHorizon = RetentionHorizon {
    offset: 28,
    window: 1,
    min_index: 29,
};

const DAY30_TO_60: RetentionHorizon = RetentionHorizon {
    offset: 60,
    window: 30,
    min_index: 61,
};

/// Running state of the fold: who has been seen, and who was new when
#[derive(Debug, Default)]
pub struct CohortState {
    seen_users: HashSet<UserId>,
    new_users_by_day: Vec<HashSet<UserId>>,
}

impl CohortState {
    /// Record the next day's users and return how many were new
    pub fn observe(&mut self, day: &DailySummary) -> usize {
        let new_users: HashSet<UserId> = day
            .unique_users
            .iter()
            .filter(|user| !self.seen_users.contains(*user))
            .cloned()
            .collect();
        self.seen_users.extend(new_users.iter().cloned());
        let installs = new_users.len();
        self.new_users_by_day.push(new_users);
        installs
    }

    /// Users first seen on the day at `index`
    pub fn new_users(&self, index: usize) -> &HashSet<UserId> {
        &self.new_users_by_day[index]
    }

    /// Number of distinct users seen so far
    pub fn seen_count(&self) -> usize {
        self.seen_users.len()
    }
}

/// Cross-day aggregator
pub struct Aggregator;

impl Aggregator {
    /// Combine date-ordered daily summaries into report entries
    ///
    /// `days` must be sorted ascending and cover consecutive calendar days.
    ///
    /// # Errors
    ///
    /// Returns [`TelstatError::Gap`] naming the first date that does not
    /// follow its predecessor by exactly one day.
    pub fn combine(days: &[DailySummary]) -> Result<Vec<CombinedDaySummary>> {
        let (cohorts, combined) = days.iter().enumerate().try_fold(
            (CohortState::default(), Vec::with_capacity(days.len())),
            |(mut cohorts, mut combined), (index, day)| {
                if index > 0 {
                    Self::check_consecutive(&days[index - 1], day)?;
                }
                let installs = cohorts.observe(day);
                combined.push(Self::combine_day(days, index, installs, &cohorts));
                Ok::<_, TelstatError>((cohorts, combined))
            },
        )?;

        debug!(
            "Combined {} days covering {} distinct users",
            combined.len(),
            cohorts.seen_count()
        );
        Ok(combined)
    }

    /// Sanity check: consecutive days, correctly sorted
    fn check_consecutive(previous: &DailySummary, day: &DailySummary) -> Result<()> {
        if day.date.days_since(&previous.date) != 1 {
            return Err(TelstatError::Gap {
                date: day.date,
                previous: previous.date,
            });
        }
        Ok(())
    }

    fn combine_day(
        days: &[DailySummary],
        index: usize,
        installs: usize,
        cohorts: &CohortState,
    ) -> CombinedDaySummary {
        let day = &days[index];
        let retention_for = |horizon: RetentionHorizon| {
            if index < horizon.min_index {
                return None;
            }
            let cohort = cohorts.new_users(index - horizon.offset);
            Self::compute_retention(days, index, horizon.window, cohort)
        };

        CombinedDaySummary {
            date: day.date,
            actives: Actives {
                today: Self::compute_actives(days, index, 1),
                last7: Self::compute_actives(days, index, 7),
                last30: Self::compute_actives(days, index, 30),
            },
            installs,
            retention: Retention {
                day1: retention_for(DAY1),
                day7: retention_for(DAY7),
                day28: retention_for(DAY28),
                day30to60: retention_for(DAY30_TO_60),
            },
            usage: day.usage.clone(),
            error_rates: ErrorRates {
                last7: Self::compute_error_rate(days, index, 7, false),
                today: Self::compute_error_rate(days, index, 1, false),
                today_latest: Self::compute_error_rate(days, index, 1, true),
                last7_latest: Self::compute_error_rate(days, index, 7, true),
            },
            errors: day.errors.sorted_by_count(),
        }
    }

    /// The `n` days ending at `index`, or `None` without enough history
    fn window(days: &[DailySummary], index: usize, n: usize) -> Option<&[DailySummary]> {
        if n == 0 || index + 1 < n {
            return None;
        }
        days.get(index + 1 - n..=index)
    }

    fn window_users(window: &[DailySummary]) -> HashSet<&UserId> {
        window.iter().flat_map(|day| day.unique_users.iter()).collect()
    }

    /// Distinct users active in the `n` days ending at `index`
    ///
    /// `None` if fewer than `n` days of history exist.
    pub fn compute_actives(days: &[DailySummary], index: usize, n: usize) -> Option<usize> {
        Self::window(days, index, n).map(|window| Self::window_users(window).len())
    }

    /// Fraction of `cohort` active in the `n` days ending at `index`
    ///
    /// `None` for an empty cohort or without enough history.
    pub fn compute_retention(
        days: &[DailySummary],
        index: usize,
        n: usize,
        cohort: &HashSet<UserId>,
    ) -> Option<f64> {
        if cohort.is_empty() {
            return None;
        }
        let active = Self::window_users(Self::window(days, index, n)?);
        // Cohort members missing from the window are lost
        let lost = cohort.iter().filter(|user| !active.contains(user)).count();
        Some((cohort.len() - lost) as f64 / cohort.len() as f64)
    }

    /// Fraction of sessions in the `n` days ending at `index` that errored
    ///
    /// With `latest_only`, each day contributes only the sessions running
    /// the newest version in use that day. `None` without enough history or
    /// when the window holds no sessions.
    pub fn compute_error_rate(
        days: &[DailySummary],
        index: usize,
        n: usize,
        latest_only: bool,
    ) -> Option<f64> {
        let window = Self::window(days, index, n)?;
        let mut counts = SessionCounts::default();
        for day in window {
            counts += if latest_only {
                let latest = latest_version(day.usage.version.keys().map(String::as_str));
                day.sessions.for_version(&latest)
            } else {
                day.sessions.counts()
            };
        }

        if counts.total == 0 {
            return None;
        }
        Some(counts.errored as f64 / counts.total as f64)
    }
}
