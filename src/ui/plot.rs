use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::plot::camera::{cube_edges, Camera};
use crate::plot::config::MarkerShape;
use crate::plot::svg::format_tick;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Scatter view (central panel)
// ---------------------------------------------------------------------------

fn plot_marker(shape: MarkerShape) -> egui_plot::MarkerShape {
    match shape {
        MarkerShape::Circle => egui_plot::MarkerShape::Circle,
        MarkerShape::Square => egui_plot::MarkerShape::Square,
        MarkerShape::Triangle => egui_plot::MarkerShape::Up,
        MarkerShape::Diamond => egui_plot::MarkerShape::Diamond,
        MarkerShape::Cross => egui_plot::MarkerShape::Cross,
    }
}

fn uv(camera: &Camera, p: [f64; 3]) -> [f64; 2] {
    let projected = camera.project(p);
    [projected.u, projected.v]
}

/// Render the projected scatter in the central panel.
pub fn scatter_view(ui: &mut Ui, state: &ViewerState) {
    let camera = state.camera;
    let bounds = state.figure.bounds();
    let text_color = ui.visuals().text_color();

    Plot::new("scatter_3d")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // ---- Axes box ----
            for (a, b) in cube_edges() {
                let edge: PlotPoints = vec![uv(&camera, a), uv(&camera, b)].into();
                plot_ui.line(Line::new(edge).color(Color32::GRAY).width(1.0));
            }

            for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
                for t in [-0.5, 0.0, 0.5] {
                    let mut p = [-0.5; 3];
                    p[axis] = t;
                    let [u, v] = uv(&camera, p);
                    let text = if t == 0.0 {
                        Text::new(PlotPoint::new(u, v), name).color(text_color)
                    } else {
                        let value = format_tick(bounds.denormalize(axis, t));
                        Text::new(PlotPoint::new(u, v), value).color(Color32::GRAY)
                    };
                    plot_ui.text(text);
                }
            }

            // ---- Marker groups ----
            for idx in state.visible_groups() {
                let group = &state.figure.groups[idx];
                let points: PlotPoints = group
                    .points
                    .iter()
                    .filter(|p| p.iter().all(|c| c.is_finite()))
                    .map(|p| uv(&camera, bounds.normalize(*p)))
                    .collect();

                let markers = Points::new(points)
                    .name(&group.label)
                    .color(group.color)
                    .radius(group.size)
                    .shape(plot_marker(group.marker))
                    .filled(true);

                plot_ui.points(markers);
            }
        });
}
