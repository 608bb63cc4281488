use crate::marker::Marker;

/// Compute which markers match the filter, preserving registry order.
///
/// An empty filter matches everything. Matching is a case-insensitive
/// substring test; the filter is always a literal, never a pattern, so
/// input like "(" or "[" can't fail.
pub fn visible_markers(markers: &[Marker], filter: &str) -> Vec<usize> {
    if filter.is_empty() {
        return markers.iter().map(|m| m.id).collect();
    }
    let needle = filter.to_lowercase();
    markers
        .iter()
        .filter(|m| m.title.to_lowercase().contains(&needle))
        .map(|m| m.id)
        .collect()
}

/// Apply a computed visible set to the markers, flipping only the flags
/// that actually change. Returns (shown, hidden) counts; a second call
/// with the same set is a no-op and returns (0, 0).
pub fn sync_visibility(markers: &mut [Marker], visible: &[usize]) -> (usize, usize) {
    let mut shown = 0;
    let mut hidden = 0;
    for marker in markers.iter_mut() {
        let want = visible.contains(&marker.id);
        if want != marker.visible {
            marker.visible = want;
            if want {
                shown += 1;
            } else {
                hidden += 1;
            }
        }
    }
    (shown, hidden)
}
