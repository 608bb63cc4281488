use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::wiki::WikiFetcher;

pub mod info_window;
pub mod map_view;

use map_view::MapView;

pub struct GuiApp {
    state: AppState,
    config: AppConfig,
    fetcher: WikiFetcher,
    map_view: MapView,
}

impl GuiApp {
    pub fn new(state: AppState, config: AppConfig) -> Self {
        let fetcher = WikiFetcher::new(config.fetch_timeout());
        Self { state, config, fetcher, map_view: MapView::new() }
    }

    pub fn run(self) -> Result<(), eframe::Error> {
        let width = self.config.width.unwrap_or(1280) as f32;
        let height = self.config.height.unwrap_or(720) as f32;

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([width, height]),
            ..Default::default()
        };

        eframe::run_native("mapmarks", options, Box::new(move |_cc| Ok(Box::new(self))))
    }

    /// Single activation path for both entry points (map pin, list row).
    fn activate(&mut self, id: usize, now: Instant) {
        if let Some(marker) = self.state.markers.get(id) {
            self.map_view.center_on(marker);
        }
        if let Some(request) = self.state.activate_marker(id, now) {
            self.fetcher.spawn(request);
        }
    }

    fn show_map_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state.map_error.clone() else { return };
        egui::Window::new("Error").collapsible(false).show(ctx, |ui| {
            ui.label(format!("Error loading map: {}", message));
            ui.label("Fix the tile provider settings and restart.");
            if ui.button("OK").clicked() {
                self.state.map_alert_open = false;
            }
        });
    }

    fn show_side_panel(&mut self, ctx: &egui::Context) -> Option<usize> {
        let panel_width = if self.state.menu_expanded {
            self.config.expanded_width()
        } else {
            self.config.collapsed_width()
        };

        let mut list_clicked: Option<usize> = None;
        egui::SidePanel::left("list_panel")
            .resizable(false)
            .exact_width(panel_width)
            .show(ctx, |ui| {
                let toggle_label = if self.state.menu_expanded { "⏴" } else { "☰" };
                if ui.button(toggle_label).clicked() {
                    self.state.toggle_menu();
                }
                if !self.state.menu_expanded {
                    return;
                }

                ui.separator();
                let filter_response = ui.add(
                    egui::TextEdit::singleline(&mut self.state.filter)
                        .hint_text("Filter locations"),
                );
                if filter_response.changed() {
                    self.state.refresh_visibility();
                }
                ui.separator();

                egui::ScrollArea::vertical().show(ui, |ui| {
                    let owner = self.state.panel.owner();
                    if self.state.visible_ids().is_empty() {
                        ui.label("No locations match.");
                    }
                    for &id in self.state.visible_ids() {
                        let marker = &self.state.markers[id];
                        let selected = owner == Some(id);
                        if ui.selectable_label(selected, marker.title.as_str()).clicked() {
                            list_clicked = Some(id);
                        }
                    }
                });
            });
        list_clicked
    }
}

impl eframe::App for GuiApp {
    fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
        let ctx = ui.ctx();
        let now = Instant::now();

        // 1. Apply completed summary fetches (completion order; the panel
        //    drops anything whose ticket is stale).
        while let Some(outcome) = self.fetcher.try_recv() {
            self.state.apply_fetch(outcome);
        }

        // 2. Marker clicks reported by the map plugin last frame.
        while let Some(id) = self.map_view.take_click() {
            self.activate(id, now);
        }

        if self.state.map_alert_open {
            self.show_map_alert(ctx);
        }

        if let Some(id) = self.show_side_panel(ctx) {
            self.activate(id, now);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.map_enabled() {
                let owner = self.state.panel.owner();
                self.map_view.show(ui, &self.state.markers, owner, now);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Map unavailable.");
                });
            }
        });

        if info_window::show_info_window(ctx, &self.state.panel, &self.state.markers) {
            self.state.close_panel();
        }

        // Keep frames coming while a bounce or a fetch is in flight.
        let animating = self.state.tick_animations(now);
        if animating || self.state.panel.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(33));
        }
    }
}
