use std::path::Path;

use crate::data::model::Dataset;
use crate::plot::camera::Camera;
use crate::plot::figure::{Figure, PlotError};

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// Scene being displayed; groups added in the viewer land here too.
    pub figure: Figure,

    /// Visibility per group, parallel to `figure.groups`.
    pub visible: Vec<bool>,

    /// Interactive camera; starts from the figure's camera.
    pub camera: Camera,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(figure: Figure) -> Self {
        Self {
            visible: vec![true; figure.groups.len()],
            camera: figure.camera,
            figure,
            status_message: None,
        }
    }

    /// Append a freshly loaded dataset as a new, visible group.
    pub fn add_dataset(&mut self, dataset: &Dataset) {
        self.figure.add_dataset(dataset);
        self.visible.push(true);
        self.status_message = None;
    }

    /// Indices of groups currently shown.
    pub fn visible_groups(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(|(i, _)| i)
    }

    pub fn toggle_group(&mut self, index: usize) {
        if let Some(v) = self.visible.get_mut(index) {
            *v = !*v;
        }
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        self.visible.iter_mut().for_each(|v| *v = visible);
    }

    pub fn reset_camera(&mut self) {
        self.camera = Camera::new(self.figure.config.elevation, self.figure.config.azimuth);
    }

    /// The figure as currently shown: visible groups only, seen from the live camera.
    pub fn snapshot(&self) -> Figure {
        let mut figure = self.figure.clone();
        figure.camera = self.camera;
        figure.groups = self
            .visible_groups()
            .map(|i| self.figure.groups[i].clone())
            .collect();
        figure
    }

    pub fn save_svg(&self, path: &Path) -> Result<(), PlotError> {
        self.snapshot().save_to(path)
    }
}
