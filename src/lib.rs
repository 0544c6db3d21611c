//! Read point-cloud positions from JSON/CSV/Parquet files and draw them as a
//! 3D scatter plot, saved to SVG and optionally shown in an egui window.

pub mod app;
pub mod color;
pub mod data;
pub mod plot;
pub mod state;
pub mod ui;

pub use data::loader::{load_file, read_positions, read_positions_named};
pub use data::model::{AxisSelector, Dataset, Projection, Record};
pub use plot::{plot, Figure, PlotConfig};
