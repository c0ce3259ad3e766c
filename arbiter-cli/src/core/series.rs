use arbiter_quantities::{power::Kilowatts, rate::KilowattHourRate};
use chrono::TimeDelta;

use crate::core::{DispatchError, time_grid::TimeGrid};

/// Price and load aligned to the time grid by index.
#[must_use]
#[derive(Clone, Debug)]
pub struct OperationSeries {
    pub price: Vec<KilowattHourRate>,

    /// Site load. It is carried to the results but does not constrain the dispatch.
    pub load: Vec<Kilowatts>,
}

impl OperationSeries {
    /// Wrap series that are already sampled on the grid.
    pub fn try_new(grid: &TimeGrid, price: &[f64], load: &[f64]) -> Result<Self, DispatchError> {
        ensure_length("price", price.len(), grid.len())?;
        ensure_length("load", load.len(), grid.len())?;
        Ok(Self {
            price: price.iter().copied().map(KilowattHourRate::from).collect(),
            load: load.iter().copied().map(Kilowatts::from).collect(),
        })
    }

    /// Step-hold series sampled every `sample_interval` onto the grid.
    ///
    /// The series start at the grid start and must cover exactly the samples the grid touches.
    pub fn try_resample(
        grid: &TimeGrid,
        sample_interval: TimeDelta,
        price: &[f64],
        load: &[f64],
    ) -> Result<Self, DispatchError> {
        if sample_interval == grid.interval() {
            return Self::try_new(grid, price, load);
        }
        let sample_indices = sample_indices(grid, sample_interval)?;
        let n_samples = sample_indices.last().map_or(0, |index| index + 1);
        ensure_length("price", price.len(), n_samples)?;
        ensure_length("load", load.len(), n_samples)?;
        Ok(Self {
            price: sample_indices
                .iter()
                .map(|index| KilowattHourRate::from(price[*index]))
                .collect(),
            load: sample_indices.iter().map(|index| Kilowatts::from(load[*index])).collect(),
        })
    }

    /// Fail unless both series match the grid length.
    pub fn ensure_aligned(&self, grid: &TimeGrid) -> Result<(), DispatchError> {
        ensure_length("price", self.price.len(), grid.len())?;
        ensure_length("load", self.load.len(), grid.len())
    }
}

/// Index of the sample whose interval contains each grid timestamp.
fn sample_indices(
    grid: &TimeGrid,
    sample_interval: TimeDelta,
) -> Result<Vec<usize>, DispatchError> {
    let sample_seconds = sample_interval.num_seconds();
    if sample_seconds <= 0 {
        return Err(DispatchError::InvalidHorizon(format!(
            "series interval must be positive, got {sample_interval}"
        )));
    }
    Ok(grid
        .timestamps()
        .iter()
        .map(|timestamp| {
            let offset = (*timestamp - grid.start()).num_seconds() / sample_seconds;
            usize::try_from(offset).unwrap_or_default()
        })
        .collect())
}

fn ensure_length(
    series: &'static str,
    actual: usize,
    expected: usize,
) -> Result<(), DispatchError> {
    if actual == expected {
        Ok(())
    } else {
        Err(DispatchError::LengthMismatch { series, expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use itertools::Itertools;

    use super::*;

    fn grid(interval_minutes: i64) -> TimeGrid {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TimeGrid::try_new(
            date.and_hms_opt(0, 0, 0).unwrap(),
            date.and_hms_opt(0, 45, 0).unwrap(),
            interval_minutes,
        )
        .unwrap()
    }

    #[test]
    fn test_aligned_ok() -> Result<(), DispatchError> {
        let series = OperationSeries::try_new(&grid(15), &[1.0, 2.0, 3.0, 1.0], &[0.0; 4])?;
        assert_eq!(series.price.len(), 4);
        series.ensure_aligned(&grid(15))
    }

    #[test]
    fn test_price_length_mismatch() {
        assert!(matches!(
            OperationSeries::try_new(&grid(15), &[1.0, 2.0, 3.0], &[0.0; 4]),
            Err(DispatchError::LengthMismatch { series: "price", expected: 4, actual: 3 }),
        ));
    }

    #[test]
    fn test_load_length_mismatch() {
        assert!(matches!(
            OperationSeries::try_new(&grid(15), &[1.0; 4], &[0.0; 5]),
            Err(DispatchError::LengthMismatch { series: "load", expected: 4, actual: 5 }),
        ));
    }

    #[test]
    fn test_resample_coarse_series() -> Result<(), DispatchError> {
        let series = OperationSeries::try_resample(
            &grid(15),
            TimeDelta::minutes(30),
            &[1.0, 3.0],
            &[0.5, 0.7],
        )?;
        let prices = series.price.iter().map(|price| price.into_inner()).collect_vec();
        assert_eq!(prices, [1.0, 1.0, 3.0, 3.0]);
        assert_abs_diff_eq!(series.load[3].into_inner(), 0.7);
        Ok(())
    }

    #[test]
    fn test_resample_fine_series() -> Result<(), DispatchError> {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let grid = TimeGrid::try_new(
            date.and_hms_opt(0, 0, 0).unwrap(),
            date.and_hms_opt(1, 0, 0).unwrap(),
            30,
        )?;
        let series = OperationSeries::try_resample(
            &grid,
            TimeDelta::minutes(15),
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0; 5],
        )?;
        let prices = series.price.iter().map(|price| price.into_inner()).collect_vec();
        assert_eq!(prices, [1.0, 3.0, 5.0]);
        Ok(())
    }

    #[test]
    fn test_resample_short_series() {
        assert!(matches!(
            OperationSeries::try_resample(&grid(15), TimeDelta::minutes(30), &[1.0], &[0.0]),
            Err(DispatchError::LengthMismatch { series: "price", expected: 2, actual: 1 }),
        ));
    }
}
