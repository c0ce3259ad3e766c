use std::iter::successors;

use arbiter_quantities::time::Hours;
use chrono::{NaiveDateTime, TimeDelta};

use crate::core::DispatchError;

/// The time axis shared by the model, the series, and the results.
#[must_use]
#[derive(Clone, Debug)]
pub struct TimeGrid {
    timestamps: Vec<NaiveDateTime>,
    interval: TimeDelta,
}

impl TimeGrid {
    /// Lay out the grid from `start` to `end` inclusive.
    ///
    /// When the interval does not divide the horizon, the grid stops at the last point before `end`.
    pub fn try_new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        interval_minutes: i64,
    ) -> Result<Self, DispatchError> {
        if interval_minutes <= 0 {
            return Err(DispatchError::InvalidHorizon(format!(
                "interval must be positive, got {interval_minutes} minutes"
            )));
        }
        if end <= start {
            return Err(DispatchError::InvalidHorizon(format!(
                "end `{end}` must be after start `{start}`"
            )));
        }
        let interval = TimeDelta::try_minutes(interval_minutes).ok_or_else(|| {
            DispatchError::InvalidHorizon(format!(
                "interval of {interval_minutes} minutes overflows"
            ))
        })?;
        let timestamps = successors(Some(start), |timestamp| timestamp.checked_add_signed(interval))
            .take_while(|timestamp| *timestamp <= end)
            .collect();
        Ok(Self { timestamps, interval })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[must_use]
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.timestamps[0]
    }

    /// Last grid point, which never exceeds the requested end.
    #[must_use]
    pub fn last(&self) -> NaiveDateTime {
        self.timestamps[self.timestamps.len() - 1]
    }

    #[must_use]
    pub const fn interval(&self) -> TimeDelta {
        self.interval
    }

    pub fn interval_hours(&self) -> Hours {
        Hours::from(self.interval)
    }

    /// How many intervals fit into an hour, `60 / interval_minutes`.
    ///
    /// Multiplying energy per interval by this gives the average power.
    #[must_use]
    pub fn intervals_per_hour(&self) -> f64 {
        1.0 / self.interval_hours().into_inner()
    }
}
