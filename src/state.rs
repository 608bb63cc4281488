use std::time::Instant;

use crate::filter::{sync_visibility, visible_markers};
use crate::locations::LocationEntry;
use crate::marker::{Marker, build_markers};
use crate::panel::InfoPanel;
use crate::wiki::{FetchOutcome, FetchRequest};

// --- AppState ---

/// Root view-model. Owned by the GUI app and passed down explicitly;
/// every mutation goes through these methods on the UI thread.
pub struct AppState {
    pub markers: Vec<Marker>,
    /// Live filter string bound to the text input.
    pub filter: String,
    /// Derived: ids of markers matching the filter, registry order.
    visible: Vec<usize>,
    pub panel: InfoPanel,
    /// Side panel expanded (list shown) or collapsed to its narrow strip.
    pub menu_expanded: bool,
    /// Map feature failed to initialize. The alert stays up until
    /// dismissed; marker interaction stays off for the whole run.
    pub map_error: Option<String>,
    pub map_alert_open: bool,
}

impl AppState {
    pub fn new(entries: &[LocationEntry]) -> Self {
        let markers = build_markers(entries);
        let visible = markers.iter().map(|m| m.id).collect();
        Self {
            markers,
            filter: String::new(),
            visible,
            panel: InfoPanel::default(),
            menu_expanded: true,
            map_error: None,
            map_alert_open: false,
        }
    }

    pub fn set_map_error(&mut self, message: String) {
        log::warn!("map unavailable: {}", message);
        self.map_error = Some(message);
        self.map_alert_open = true;
    }

    pub fn map_enabled(&self) -> bool {
        self.map_error.is_none()
    }

    /// Recompute the visible set from the current filter and apply it to
    /// the markers. Called synchronously on every filter edit.
    pub fn refresh_visibility(&mut self) -> (usize, usize) {
        self.visible = visible_markers(&self.markers, &self.filter);
        let diff = sync_visibility(&mut self.markers, &self.visible);
        if diff != (0, 0) {
            log::debug!("filter {:?}: +{} -{} markers", self.filter, diff.0, diff.1);
        }
        diff
    }

    pub fn visible_ids(&self) -> &[usize] {
        &self.visible
    }

    /// Shared activation path for map clicks and list-row clicks: bounce
    /// the marker unconditionally, then let the panel decide whether a
    /// fetch is needed.
    pub fn activate_marker(&mut self, id: usize, now: Instant) -> Option<FetchRequest> {
        if !self.map_enabled() {
            return None;
        }
        let marker = self.markers.get_mut(id)?;
        marker.start_bounce(now);
        let title = marker.title.clone();
        self.panel.activate(id, &title)
    }

    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        if self.panel.apply(outcome) {
            log::debug!("info panel updated");
        }
    }

    pub fn close_panel(&mut self) {
        self.panel.close();
    }

    pub fn toggle_menu(&mut self) {
        self.menu_expanded = !self.menu_expanded;
    }

    /// True while any marker is mid-bounce; expired bounces are cleared.
    pub fn tick_animations(&mut self, now: Instant) -> bool {
        let mut live = false;
        for marker in &mut self.markers {
            live |= marker.tick_bounce(now);
        }
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelContent;
    use crate::wiki::Summary;

    fn entries(names: &[&str]) -> Vec<LocationEntry> {
        names
            .iter()
            .map(|n| LocationEntry { name: n.to_string(), lat: 40.7, lon: -73.99 })
            .collect()
    }

    fn outcome_for(req: &FetchRequest, text: &str) -> FetchOutcome {
        FetchOutcome {
            ticket: req.ticket,
            marker_id: req.marker_id,
            summary: Summary { text: text.to_string(), source_url: None },
        }
    }

    #[test]
    fn test_filter_edit_updates_visible_set() {
        let mut state = AppState::new(&entries(&["Brooklyn Bridge", "Prospect Park"]));
        assert_eq!(state.visible_ids(), &[0, 1]);

        state.filter = "br".to_string();
        let diff = state.refresh_visibility();
        assert_eq!(diff, (0, 1));
        assert_eq!(state.visible_ids(), &[0]);

        state.filter.clear();
        state.refresh_visibility();
        assert_eq!(state.visible_ids(), &[0, 1]);
    }

    #[test]
    fn test_both_entry_points_share_one_activation() {
        let mut state = AppState::new(&entries(&["Brooklyn Bridge", "Prospect Park"]));
        let now = Instant::now();

        // Map click fetches; list click on the same marker while open
        // does not fetch again, but still bounces.
        let first = state.activate_marker(0, now);
        assert!(first.is_some());
        let second = state.activate_marker(0, now);
        assert!(second.is_none());
        assert!(state.markers[0].bounce_phase(now).is_some());
    }

    #[test]
    fn test_activation_applies_current_fetch_only() {
        let mut state = AppState::new(&entries(&["Brooklyn Bridge", "Prospect Park"]));
        let now = Instant::now();

        let req_a = state.activate_marker(0, now).unwrap();
        let req_b = state.activate_marker(1, now).unwrap();

        state.apply_fetch(outcome_for(&req_b, "a park"));
        state.apply_fetch(outcome_for(&req_a, "a bridge"));

        let (owner, content) = state.panel.view().unwrap();
        assert_eq!(owner, 1);
        assert_eq!(
            content,
            &PanelContent::Ready(Summary { text: "a park".to_string(), source_url: None })
        );
    }

    #[test]
    fn test_map_failure_disables_activation() {
        let mut state = AppState::new(&entries(&["Brooklyn Bridge"]));
        state.set_map_error("tile provider misconfigured".to_string());
        assert!(!state.map_enabled());
        assert!(state.map_alert_open);
        assert!(state.activate_marker(0, Instant::now()).is_none());
        assert!(!state.panel.is_open());
    }

    #[test]
    fn test_menu_toggle_flips() {
        let mut state = AppState::new(&entries(&["Brooklyn Bridge"]));
        assert!(state.menu_expanded);
        state.toggle_menu();
        assert!(!state.menu_expanded);
        state.toggle_menu();
        assert!(state.menu_expanded);
    }
}
