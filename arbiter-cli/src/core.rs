pub mod error;
pub mod extract;
pub mod model;
pub mod series;
pub mod solver;
pub mod storage;
pub mod storage_mode;
pub mod time_grid;

pub use self::error::DispatchError;
