//! CSV export of the dispatch and the operation summary, rounded to two decimals.

use std::{fs::File, io::Write, path::Path};

use crate::{
    core::extract::{DispatchTable, OperationSummary},
    prelude::*,
};

const DISPATCH_HEADER: [&str; 11] = [
    "timestamp",
    "mode",
    "charge_power_kw",
    "discharge_power_kw",
    "load_kw",
    "grid_power_kw",
    "price_per_kwh",
    "cost",
    "storage_level_kwh",
    "energy_in_kwh",
    "energy_out_kwh",
];

/// Write `dispatch.csv` and `summary.csv` into the directory, creating it if needed.
#[instrument(skip_all, fields(directory = %directory.display()))]
pub fn export(
    directory: &Path,
    dispatch: &DispatchTable,
    summary: &OperationSummary,
) -> Result {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create `{}`", directory.display()))?;
    let path = directory.join("dispatch.csv");
    write_dispatch(dispatch, File::create(&path)?)
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    let path = directory.join("summary.csv");
    write_summary(summary, File::create(&path)?)
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    info!("exported");
    Ok(())
}

pub fn write_dispatch(dispatch: &DispatchTable, writer: impl Write) -> Result {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(DISPATCH_HEADER)?;
    for row in &dispatch.0 {
        writer.write_record(&[
            row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.mode.to_string(),
            format!("{:.2}", row.charge_power.into_inner()),
            format!("{:.2}", row.discharge_power.into_inner()),
            format!("{:.2}", row.load.into_inner()),
            format!("{:.2}", row.grid_power.into_inner()),
            format!("{:.2}", row.price.into_inner()),
            format!("{:.2}", row.cost.into_inner()),
            format!("{:.2}", row.storage_level.into_inner()),
            format!("{:.2}", row.energy_in.into_inner()),
            format!("{:.2}", row.energy_out.into_inner()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary(summary: &OperationSummary, writer: impl Write) -> Result {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["equipment", "running_hours"])?;
    for running_hours in &summary.running_hours {
        writer.write_record(&[
            running_hours.equipment.to_string(),
            format!("{:.2}", running_hours.hours.into_inner()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use arbiter_quantities::{
        cost::Cost,
        energy::KilowattHours,
        power::Kilowatts,
        time::Hours,
    };
    use chrono::NaiveDate;

    use super::*;
    use crate::core::{
        extract::{DispatchRow, Equipment, RunningHours},
        storage_mode::StorageMode,
    };

    fn dispatch() -> DispatchTable {
        DispatchTable(vec![DispatchRow {
            timestamp: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 15, 0).unwrap(),
            mode: StorageMode::Charge,
            charge_power: Kilowatts::from(10.0),
            discharge_power: Kilowatts::ZERO,
            load: Kilowatts::from(0.333),
            grid_power: Kilowatts::from(10.0),
            price: 0.1234.into(),
            cost: Cost::from(0.3085),
            storage_level: KilowattHours::from(2.5),
            energy_in: KilowattHours::from(2.5),
            energy_out: KilowattHours::ZERO,
        }])
    }

    #[test]
    fn test_write_dispatch() -> Result {
        let mut buffer = Vec::new();
        write_dispatch(&dispatch(), &mut buffer)?;
        let output = String::from_utf8(buffer)?;
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some(DISPATCH_HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("2020-01-01 00:15:00,Charge,10.00,0.00,0.33,10.00,0.12,0.31,2.50,2.50,0.00"),
        );
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn test_write_summary() -> Result {
        let summary = OperationSummary {
            running_hours: vec![
                RunningHours { equipment: Equipment::Charger, hours: Hours::from(0.254) },
                RunningHours { equipment: Equipment::Discharger, hours: Hours::from(1.0) },
            ],
            energy_charged: KilowattHours::from(2.54),
            energy_discharged: KilowattHours::from(10.0),
            revenue: Cost::from(1.0),
        };
        let mut buffer = Vec::new();
        write_summary(&summary, &mut buffer)?;
        assert_eq!(
            String::from_utf8(buffer)?,
            "equipment,running_hours\nCharging,0.25\nDischarging,1.00\n",
        );
        Ok(())
    }
}
