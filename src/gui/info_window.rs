use eframe::egui;

use crate::marker::Marker;
use crate::panel::{InfoPanel, PanelContent};

/// Render the shared info overlay for the panel's owning marker.
/// Returns true when the user dismissed it this frame.
pub fn show_info_window(ctx: &egui::Context, panel: &InfoPanel, markers: &[Marker]) -> bool {
    let Some((marker_id, content)) = panel.view() else {
        return false;
    };
    let Some(marker) = markers.get(marker_id) else {
        return false;
    };

    let mut open = true;
    egui::Window::new(marker.title.as_str())
        .id(egui::Id::new("info_panel"))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.set_max_width(360.0);
            match content {
                PanelContent::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Fetching summary…");
                    });
                }
                PanelContent::Ready(summary) => {
                    ui.label(&summary.text);
                    if let Some(url) = &summary.source_url {
                        ui.add_space(6.0);
                        ui.horizontal_wrapped(|ui| {
                            ui.label("Source:");
                            ui.hyperlink(url);
                        });
                    }
                }
            }
        });

    !open
}
