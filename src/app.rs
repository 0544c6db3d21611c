use eframe::egui;

use crate::plot::Figure;
use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ScatterApp {
    pub state: ViewerState,
}

impl ScatterApp {
    pub fn new(figure: Figure) -> Self {
        Self {
            state: ViewerState::new(figure),
        }
    }
}

impl eframe::App for ScatterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: groups and camera ----
        egui::SidePanel::left("group_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::scatter_view(ui, &self.state);
        });
    }
}

/// Open a window showing `figure`. Blocks until the window is closed.
pub fn run(figure: Figure) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "posplot – 3D positions",
        options,
        Box::new(|_cc| Ok(Box::new(ScatterApp::new(figure)))),
    )
}
