// Map widget using the walkers crate for displaying location markers
use std::f32::consts::PI;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use eframe::egui;
use walkers::{HttpTiles, Map, MapMemory, Plugin, Position, Projector};

use crate::config::{AppConfig, validate_provider, validate_tile_template};
use crate::locations::{MAP_CENTER, MAP_ZOOM};
use crate::marker::Marker;

/// Screen-space distance within which a click counts as hitting a pin.
const HIT_RADIUS: f32 = 12.0;

const BOUNCE_AMPLITUDE: f32 = 14.0;
/// Full arcs over one bounce window, ~525 ms each.
const BOUNCE_ARCS: f32 = 4.0;

const PIN_RADIUS: f32 = 6.0;
const PIN_RADIUS_ACTIVE: f32 = 8.0;

/// Vertical lift of a bouncing pin at the given phase (0..1).
fn bounce_offset(phase: f32) -> f32 {
    BOUNCE_AMPLITUDE * (phase * BOUNCE_ARCS * PI).sin().abs()
}

/// Check the configured tile provider before the map is ever drawn.
/// Failure here means the map feature stays disabled for the run.
pub fn validate_tile_config(config: &AppConfig) -> anyhow::Result<()> {
    validate_provider(&config.provider_name)?;
    validate_tile_template(&config.provider_url)?;
    Ok(())
}

/// The map surface: tiles, viewport memory, and the click channel fed by
/// the marker plugin.
pub struct MapView {
    pub map_memory: MapMemory,
    tiles: Option<HttpTiles>,
    home: Position,
    click_tx: Sender<usize>,
    click_rx: Receiver<usize>,
}

impl MapView {
    pub fn new() -> Self {
        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(MAP_ZOOM).is_err() {
            log::warn!("default zoom {} rejected, keeping widget default", MAP_ZOOM);
        }
        let (click_tx, click_rx) = unbounded();
        Self {
            map_memory,
            tiles: None,
            home: walkers::lat_lon(MAP_CENTER.0, MAP_CENTER.1),
            click_tx,
            click_rx,
        }
    }

    /// Initialize tiles if not already done
    pub fn ensure_tiles(&mut self, ctx: &egui::Context) {
        if self.tiles.is_none() {
            self.tiles = Some(HttpTiles::new(walkers::sources::OpenStreetMap, ctx.clone()));
        }
    }

    pub fn center_on(&mut self, marker: &Marker) {
        self.map_memory.center_at(marker.position());
    }

    /// Marker id clicked since the last frame, if any.
    pub fn take_click(&self) -> Option<usize> {
        self.click_rx.try_recv().ok()
    }

    /// Draw the map with the currently visible pins. `active` is the
    /// marker owning the info panel, drawn highlighted.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        markers: &[Marker],
        active: Option<usize>,
        now: Instant,
    ) {
        self.ensure_tiles(ui.ctx());

        let pins: Vec<Pin> = markers
            .iter()
            .filter(|m| m.visible)
            .map(|m| {
                let is_active = active == Some(m.id);
                let (color, radius) = if is_active {
                    (egui::Color32::ORANGE, PIN_RADIUS_ACTIVE)
                } else {
                    (egui::Color32::RED, PIN_RADIUS)
                };
                Pin {
                    id: m.id,
                    position: m.position(),
                    color,
                    radius,
                    bounce: m.bounce_phase(now),
                }
            })
            .collect();

        if let Some(ref mut tiles) = self.tiles {
            let plugin = MarkerPlugin { pins, clicks: self.click_tx.clone() };
            let map = Map::new(Some(tiles), &mut self.map_memory, self.home).with_plugin(plugin);
            ui.add(map);
        }
    }
}

struct Pin {
    id: usize,
    position: Position,
    color: egui::Color32,
    radius: f32,
    bounce: Option<f32>,
}

/// Plugin for drawing location pins on the map and hit-testing clicks.
/// Clicks land on the channel rather than being handled here, so the
/// app's activation path stays the single entry point.
struct MarkerPlugin {
    pins: Vec<Pin>,
    clicks: Sender<usize>,
}

impl Plugin for MarkerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();

        let mut screen_pins: Vec<(egui::Pos2, &Pin)> = Vec::with_capacity(self.pins.len());
        for pin in &self.pins {
            let screen_vec = projector.project(pin.position);
            let mut screen_pos = egui::pos2(screen_vec.x, screen_vec.y);
            if let Some(phase) = pin.bounce {
                screen_pos.y -= bounce_offset(phase);
            }
            screen_pins.push((screen_pos, pin));
        }

        for (screen_pos, pin) in &screen_pins {
            painter.circle_filled(*screen_pos, pin.radius, pin.color);
            painter.circle_stroke(
                *screen_pos,
                pin.radius,
                egui::Stroke::new(1.5, egui::Color32::WHITE),
            );
        }

        if response.clicked()
            && let Some(click_pos) = response.interact_pointer_pos()
        {
            let nearest = screen_pins
                .iter()
                .map(|(pos, pin)| (pos.distance(click_pos), pin.id))
                .filter(|(dist, _)| *dist <= HIT_RADIUS)
                .min_by(|a, b| a.0.total_cmp(&b.0));
            if let Some((_, id)) = nearest {
                let _ = self.clicks.send(id);
            }
        }
    }
}
