use comfy_table::Color;
use derive_more::Display;
use serde::Serialize;

/// What the storage does within an interval.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, Serialize)]
pub enum StorageMode {
    /// Both flows are negligible.
    Idle,

    /// Drawing energy from the grid.
    Charge,

    /// Delivering energy to the grid.
    Discharge,
}

impl StorageMode {
    pub const fn color(self) -> Color {
        match self {
            Self::Charge => Color::Green,
            Self::Discharge => Color::Blue,
            Self::Idle => Color::Reset,
        }
    }
}
