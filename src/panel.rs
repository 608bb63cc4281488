use crate::wiki::{FetchOutcome, FetchRequest, Summary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelContent {
    Loading,
    Ready(Summary),
}

#[derive(Debug)]
struct OpenState {
    marker_id: usize,
    ticket: u64,
    content: PanelContent,
}

/// The single shared info overlay. Either closed or owned by exactly one
/// marker; re-activating the owner is a no-op, switching owners clears
/// the content and issues a fresh fetch.
///
/// Every fetch carries a ticket from a monotonic counter. `apply` only
/// accepts the outcome whose ticket is current, so a late response from
/// a superseded fetch (even one for the same marker) is dropped rather
/// than rendered over newer content.
#[derive(Debug, Default)]
pub struct InfoPanel {
    open: Option<OpenState>,
    next_ticket: u64,
}

impl InfoPanel {
    /// Request the panel for a marker. Returns the fetch to dispatch, or
    /// None when the panel is already open for that marker.
    pub fn activate(&mut self, marker_id: usize, title: &str) -> Option<FetchRequest> {
        if let Some(open) = &self.open
            && open.marker_id == marker_id
        {
            return None;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.open = Some(OpenState { marker_id, ticket, content: PanelContent::Loading });
        Some(FetchRequest { ticket, marker_id, title: title.to_string() })
    }

    /// Accept a completed fetch. Returns false (and drops the outcome)
    /// unless its ticket is still the current one.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        match &mut self.open {
            Some(open) if open.ticket == outcome.ticket => {
                open.content = PanelContent::Ready(outcome.summary);
                true
            }
            _ => {
                log::debug!("discarding stale summary (ticket {})", outcome.ticket);
                false
            }
        }
    }

    /// User dismissed the panel.
    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn owner(&self) -> Option<usize> {
        self.open.as_ref().map(|o| o.marker_id)
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn is_loading(&self) -> bool {
        matches!(&self.open, Some(o) if o.content == PanelContent::Loading)
    }

    /// Owning marker id and current content, for rendering.
    pub fn view(&self) -> Option<(usize, &PanelContent)> {
        self.open.as_ref().map(|o| (o.marker_id, &o.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(req: &FetchRequest, text: &str) -> FetchOutcome {
        FetchOutcome {
            ticket: req.ticket,
            marker_id: req.marker_id,
            summary: Summary { text: text.to_string(), source_url: None },
        }
    }

    fn shown_text(panel: &InfoPanel) -> Option<String> {
        match panel.view() {
            Some((_, PanelContent::Ready(s))) => Some(s.text.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_activate_while_closed_fetches_once() {
        let mut panel = InfoPanel::default();
        let req = panel.activate(0, "Brooklyn Bridge").expect("first activation fetches");
        assert_eq!(panel.owner(), Some(0));
        assert!(panel.is_loading());

        assert!(panel.apply(outcome(&req, "a bridge")));
        assert_eq!(shown_text(&panel).as_deref(), Some("a bridge"));
    }

    #[test]
    fn test_reactivating_owner_is_noop() {
        let mut panel = InfoPanel::default();
        let first = panel.activate(0, "Brooklyn Bridge");
        assert!(first.is_some());
        // Same marker while open: no second fetch, state untouched.
        assert!(panel.activate(0, "Brooklyn Bridge").is_none());
        assert!(panel.is_loading());
    }

    #[test]
    fn test_switching_markers_discards_late_response() {
        let mut panel = InfoPanel::default();
        let req_a = panel.activate(0, "Brooklyn Bridge").unwrap();
        let req_b = panel.activate(1, "Prospect Park").unwrap();
        assert_eq!(panel.owner(), Some(1));
        assert!(panel.is_loading());

        // B resolves first, then A's stale response trickles in.
        assert!(panel.apply(outcome(&req_b, "a park")));
        assert!(!panel.apply(outcome(&req_a, "a bridge")));
        assert_eq!(shown_text(&panel).as_deref(), Some("a park"));
    }

    #[test]
    fn test_same_marker_refetch_keeps_newest_ticket() {
        // A -> B -> A again: two in-flight fetches for marker 0 with
        // different tickets. Only the newest may render.
        let mut panel = InfoPanel::default();
        let req_a1 = panel.activate(0, "Brooklyn Bridge").unwrap();
        let _req_b = panel.activate(1, "Prospect Park").unwrap();
        let req_a2 = panel.activate(0, "Brooklyn Bridge").unwrap();
        assert_ne!(req_a1.ticket, req_a2.ticket);

        // The first fetch answers for the right marker but a dead ticket.
        assert!(!panel.apply(outcome(&req_a1, "old text")));
        assert!(panel.is_loading());
        assert!(panel.apply(outcome(&req_a2, "new text")));
        assert_eq!(shown_text(&panel).as_deref(), Some("new text"));
    }

    #[test]
    fn test_close_clears_owner_and_refetches_on_reopen() {
        let mut panel = InfoPanel::default();
        let req = panel.activate(0, "Brooklyn Bridge").unwrap();
        panel.apply(outcome(&req, "a bridge"));

        panel.close();
        assert!(!panel.is_open());
        assert_eq!(panel.owner(), None);
        // Outcome for the closed panel is dropped.
        assert!(!panel.apply(outcome(&req, "a bridge")));

        // Reopening the same marker is a fresh fetch, not a cache hit.
        assert!(panel.activate(0, "Brooklyn Bridge").is_some());
    }
}
