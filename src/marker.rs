use std::time::{Duration, Instant};

use walkers::Position;

use crate::locations::LocationEntry;

/// How long a marker keeps bouncing after an activation.
pub const BOUNCE_DURATION: Duration = Duration::from_millis(2100);

/// A map pin for one registry entry. Created once; only `visible` and the
/// bounce timestamp ever change.
#[derive(Debug, Clone)]
pub struct Marker {
    /// Registry index, stable for the lifetime of the app.
    pub id: usize,
    pub title: String,
    pub lat: f64,
    pub lon: f64,
    pub visible: bool,
    bounce_started: Option<Instant>,
}

impl Marker {
    pub fn from_entry(entry: &LocationEntry, id: usize) -> Self {
        Self {
            id,
            title: entry.name.clone(),
            lat: entry.lat,
            lon: entry.lon,
            visible: true,
            bounce_started: None,
        }
    }

    pub fn position(&self) -> Position {
        walkers::lat_lon(self.lat, self.lon)
    }

    /// Start (or restart) the bounce animation. Last activation wins.
    pub fn start_bounce(&mut self, now: Instant) {
        self.bounce_started = Some(now);
    }

    /// Progress through the bounce window in 0..1, or None once expired.
    pub fn bounce_phase(&self, now: Instant) -> Option<f32> {
        let started = self.bounce_started?;
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= BOUNCE_DURATION {
            return None;
        }
        Some(elapsed.as_secs_f32() / BOUNCE_DURATION.as_secs_f32())
    }

    /// Drop expired bounce state. Returns true while the animation is live
    /// so the caller knows to keep repainting.
    pub fn tick_bounce(&mut self, now: Instant) -> bool {
        if self.bounce_phase(now).is_some() {
            true
        } else {
            self.bounce_started = None;
            false
        }
    }
}

/// Build one marker per registry entry, ids following registry order.
pub fn build_markers(entries: &[LocationEntry]) -> Vec<Marker> {
    entries.iter().enumerate().map(|(id, e)| Marker::from_entry(e, id)).collect()
}
