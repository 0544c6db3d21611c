/// Scatter plotting: one labelled marker group per source on a shared 3D box.
///
/// ```text
///  sources ──load──▶ Dataset ──x/y/z──▶ MarkerGroup ─┐
///                                                    ├─▶ Figure ──▶ svg::render ──▶ images.svg
///  highlights ──index into first source──────────────┘        └───▶ viewer window
/// ```

pub mod camera;
pub mod config;
pub mod figure;
pub mod legend;
pub mod svg;

pub use config::PlotConfig;
pub use figure::{plot, Figure};
