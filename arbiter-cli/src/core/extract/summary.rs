use arbiter_quantities::{
    cost::Cost,
    energy::KilowattHours,
    power::Kilowatts,
    time::Hours,
};
use derive_more::Display;
use serde::Serialize;

use super::DispatchRow;

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, Serialize)]
pub enum Equipment {
    #[display("Charging")]
    Charger,

    #[display("Discharging")]
    Discharger,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RunningHours {
    pub equipment: Equipment,

    /// Full-power equivalent hours.
    pub hours: Hours,
}

/// Aggregates over the whole horizon.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct OperationSummary {
    pub running_hours: Vec<RunningHours>,
    pub energy_charged: KilowattHours,
    pub energy_discharged: KilowattHours,

    /// Earnings from the grid exchange, the negated total cost.
    pub revenue: Cost,
}

impl OperationSummary {
    pub fn from_rows(
        rows: &[DispatchRow],
        power_rating: Kilowatts,
        intervals_per_hour: f64,
    ) -> Self {
        // Σ power / (intervals per hour · power rating):
        let interval = Hours::from(1.0 / intervals_per_hour);
        let full_power_hours = |power: Kilowatts| power * interval / power_rating;
        let charge_power: Kilowatts = rows.iter().map(|row| row.charge_power).sum();
        let discharge_power: Kilowatts = rows.iter().map(|row| row.discharge_power).sum();
        Self {
            running_hours: vec![
                RunningHours {
                    equipment: Equipment::Charger,
                    hours: full_power_hours(charge_power),
                },
                RunningHours {
                    equipment: Equipment::Discharger,
                    hours: full_power_hours(discharge_power),
                },
            ],
            energy_charged: rows.iter().map(|row| row.energy_in).sum(),
            energy_discharged: rows.iter().map(|row| row.energy_out).sum(),
            revenue: -rows.iter().map(|row| row.cost).sum::<Cost>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::core::storage_mode::StorageMode;

    fn row(charge_power: f64, discharge_power: f64) -> DispatchRow {
        DispatchRow {
            timestamp: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            mode: StorageMode::Idle,
            charge_power: Kilowatts::from(charge_power),
            discharge_power: Kilowatts::from(discharge_power),
            load: Kilowatts::ZERO,
            grid_power: Kilowatts::from(charge_power - discharge_power),
            price: 1.0.into(),
            cost: Cost::from((charge_power - discharge_power) / 2.0),
            storage_level: KilowattHours::ZERO,
            energy_in: KilowattHours::from(charge_power / 2.0),
            energy_out: KilowattHours::from(discharge_power / 2.0),
        }
    }

    #[test]
    fn test_running_hours_half_hour_intervals() {
        // Two half-hour intervals at the full 4 kW and one at half power:
        let rows = [row(4.0, 0.0), row(4.0, 0.0), row(0.0, 2.0)];
        let summary = OperationSummary::from_rows(&rows, Kilowatts::from(4.0), 2.0);
        assert_eq!(summary.running_hours[0].equipment, Equipment::Charger);
        assert_abs_diff_eq!(summary.running_hours[0].hours.into_inner(), 1.0);
        assert_abs_diff_eq!(summary.running_hours[1].hours.into_inner(), 0.25);
        assert_abs_diff_eq!(summary.energy_charged.into_inner(), 4.0);
        assert_abs_diff_eq!(summary.energy_discharged.into_inner(), 1.0);
        assert_abs_diff_eq!(summary.revenue.into_inner(), -3.0);
    }

    #[test]
    fn test_equipment_display() {
        assert_eq!(Equipment::Discharger.to_string(), "Discharging");
    }
}
