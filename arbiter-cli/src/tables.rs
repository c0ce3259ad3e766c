use arbiter_quantities::{cost::Cost, rate::KilowattHourRate};
use average::Mean;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{
    extract::{DispatchTable, OperationSummary},
    series::OperationSeries,
    storage_mode::StorageMode,
    time_grid::TimeGrid,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_dispatch_table(dispatch: &DispatchTable) -> Table {
    let mean_price: KilowattHourRate = {
        let estimate: Mean = dispatch.0.iter().map(|row| row.price.into_inner()).collect();
        if estimate.is_empty() { KilowattHourRate::ZERO } else { estimate.mean().into() }
    };

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Date"),
        Cell::new("Time"),
        Cell::new("Mode"),
        Cell::new("Price"),
        Cell::new("Charge").fg(StorageMode::Charge.color()),
        Cell::new("Discharge").fg(StorageMode::Discharge.color()),
        Cell::new("Load"),
        Cell::new("Grid"),
        Cell::new("Cost"),
        Cell::new("Level"),
    ]);
    for row in &dispatch.0 {
        table.add_row(vec![
            Cell::new(row.timestamp.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(row.timestamp.format("%H:%M")),
            Cell::new(row.mode).fg(row.mode.color()),
            Cell::new(row.price).fg(if row.price >= mean_price {
                Color::Red
            } else {
                Color::Green
            }),
            Cell::new(row.charge_power)
                .set_alignment(CellAlignment::Right)
                .fg(StorageMode::Charge.color()),
            Cell::new(row.discharge_power)
                .set_alignment(CellAlignment::Right)
                .fg(StorageMode::Discharge.color()),
            Cell::new(row.load).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(row.grid_power).set_alignment(CellAlignment::Right),
            Cell::new(row.cost)
                .set_alignment(CellAlignment::Right)
                .fg(if row.cost > Cost::ZERO { Color::Red } else { Color::Green }),
            Cell::new(row.storage_level).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_summary_table(summary: &OperationSummary) -> Table {
    let revenue_color = if summary.revenue > Cost::ZERO { Color::Green } else { Color::Red };
    let mut table = new_table();
    table
        .set_header(vec![
            Cell::new("Revenue").fg(revenue_color),
            Cell::new("Charged").fg(StorageMode::Charge.color()),
            Cell::new("Discharged").fg(StorageMode::Discharge.color()),
        ])
        .add_row(vec![
            Cell::new(summary.revenue).fg(revenue_color),
            Cell::new(summary.energy_charged).fg(StorageMode::Charge.color()),
            Cell::new(summary.energy_discharged).fg(StorageMode::Discharge.color()),
        ]);
    table
}

pub fn build_running_hours_table(summary: &OperationSummary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Equipment", "Running hours"]);
    for running_hours in &summary.running_hours {
        table.add_row(vec![
            Cell::new(running_hours.equipment),
            Cell::new(running_hours.hours).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_series_table(grid: &TimeGrid, series: &OperationSeries) -> Table {
    let mut table = new_table();
    table.set_header(vec!["#", "Date", "Time", "Price", "Load"]);
    for (index, ((timestamp, price), load)) in
        grid.timestamps().iter().zip(&series.price).zip(&series.load).enumerate()
    {
        table.add_row(vec![
            Cell::new(index).add_attribute(Attribute::Dim),
            Cell::new(timestamp.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(timestamp.format("%H:%M")),
            Cell::new(price),
            Cell::new(load).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
