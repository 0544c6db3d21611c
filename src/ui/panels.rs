use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – group visibility and camera
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Groups");
    ui.separator();

    if state.figure.groups.is_empty() {
        ui.label("No datasets loaded.");
    } else {
        ui.horizontal(|ui: &mut Ui| {
            if ui.small_button("All").clicked() {
                state.set_all_visible(true);
            }
            if ui.small_button("None").clicked() {
                state.set_all_visible(false);
            }
        });

        ScrollArea::vertical()
            .max_height(ui.available_height() * 0.6)
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                for idx in 0..state.figure.groups.len() {
                    let group = &state.figure.groups[idx];
                    let text = RichText::new(format!("{}  ({})", group.label, group.points.len()))
                        .color(group.color);

                    let mut checked = state.visible[idx];
                    if ui.checkbox(&mut checked, text).changed() {
                        state.toggle_group(idx);
                    }
                }
            });
    }

    ui.add_space(8.0);
    ui.heading("Camera");
    ui.separator();
    ui.add(Slider::new(&mut state.camera.elevation, -90.0..=90.0).text("elevation"));
    ui.add(Slider::new(&mut state.camera.azimuth, -180.0..=180.0).text("azimuth"));
    if ui.button("Reset view").clicked() {
        state.reset_camera();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Add dataset…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save SVG…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let points: usize = state
            .visible_groups()
            .map(|i| state.figure.groups[i].points.len())
            .sum();
        ui.label(format!(
            "{} groups, {} points visible",
            state.figure.groups.len(),
            points
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Add position data")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.add_dataset(&dataset),
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn save_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Save figure")
        .add_filter("SVG", &["svg"])
        .set_file_name(state.figure.config.output.to_string_lossy())
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.save_svg(&path) {
            log::error!("Failed to save figure: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
