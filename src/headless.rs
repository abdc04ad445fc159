//! In-memory host: fixed-geometry surface and a history-backed location.
//!
//! Used by the `replay` and `resolve` commands and by integration tests. The
//! geometry is deliberately simple:
//!
//! - mobile pages sit side by side, page `i` at `i * width`
//! - on desktop every section id gets a vertical slot of
//!   [`HeadlessSurface::SLOT_HEIGHT`] in declaration order

use crate::collect::{collect, trackable_ids};
use crate::host::{ListenerId, ListenerKind, Location, Motion, Surface};
use crate::layout::Layout;
use crate::types::{SectionPath, ViewportMode};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    edges: HashMap<SectionPath, f64>,
    slots: Vec<(String, f64)>,
    offset: f64,
    canvas_offset: f64,
    indicators: usize,
    highlighted: Option<usize>,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    next_listener: ListenerId,
}

impl HeadlessSurface {
    pub const SLOT_HEIGHT: f64 = 600.0;

    pub fn new(layout: &Layout, mode: ViewportMode, width: u32) -> Self {
        let mut surface = Self {
            edges: HashMap::new(),
            slots: Vec::new(),
            offset: 0.0,
            canvas_offset: 0.0,
            indicators: 0,
            highlighted: None,
            listeners: BTreeMap::new(),
            next_listener: 1,
        };
        surface.relayout(layout, mode, width);
        surface
    }

    /// Recompute geometry after a resize, as CSS would.
    pub fn relayout(&mut self, layout: &Layout, mode: ViewportMode, width: u32) {
        let width = f64::from(width);
        self.edges = collect(layout, mode)
            .iter()
            .enumerate()
            .map(|(index, page)| (page.anchor.clone(), index as f64 * width))
            .collect();
        self.slots = trackable_ids(layout)
            .into_iter()
            .enumerate()
            .map(|(index, id)| (id.to_string(), index as f64 * Self::SLOT_HEIGHT))
            .collect();
        self.offset = 0.0;
    }

    /// Horizontal scroll offset of the page container.
    pub fn scroll_offset(&self) -> f64 {
        self.offset
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Vertical offset of the desktop canvas.
    pub fn canvas_offset(&self) -> f64 {
        self.canvas_offset
    }

    pub fn set_canvas_offset(&mut self, offset: f64) {
        self.canvas_offset = offset;
    }

    pub fn indicators(&self) -> usize {
        self.indicators
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Surface for HeadlessSurface {
    fn has_container(&self) -> bool {
        true
    }

    fn leading_edge(&self, anchor: &SectionPath) -> Option<f64> {
        self.edges.get(anchor).copied()
    }

    fn scroll_to(&mut self, offset: f64, _motion: Motion) {
        self.offset = offset;
    }

    fn mount_indicators(&mut self, count: usize) {
        self.indicators += count;
    }

    fn highlight_indicator(&mut self, index: usize) {
        if index < self.indicators {
            self.highlighted = Some(index);
        }
    }

    fn unmount_indicators(&mut self) {
        self.indicators = 0;
        self.highlighted = None;
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn has_section(&self, id: &str) -> bool {
        self.slots.iter().any(|(slot, _)| slot == id)
    }

    fn scroll_into_view(&mut self, id: &str) {
        if let Some((_, y)) = self.slots.iter().find(|(slot, _)| slot == id) {
            self.canvas_offset = *y;
        }
    }

    fn visible_section(&self) -> Option<String> {
        self.slots
            .iter()
            .take_while(|(_, y)| *y <= self.canvas_offset)
            .last()
            .map(|(id, _)| id.clone())
    }
}

/// Session history with a cursor, like `window.history`.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    entries: Vec<String>,
    cursor: usize,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(query: &str) -> Self {
        Self {
            entries: vec![query.to_string()],
            cursor: 0,
            replacements: 0,
        }
    }

    /// User navigation to a new URL (a pushed entry).
    pub fn push(&mut self, query: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(query.to_string());
        self.cursor += 1;
    }

    /// Step back; returns false at the oldest entry.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward; returns false at the newest entry.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    /// Number of in-place rewrites so far.
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl Location for MemoryLocation {
    fn query(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn replace_query(&mut self, query: &str) {
        self.entries[self.cursor] = query.to_string();
        self.replacements += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::scenario_layout;

    #[test]
    fn mobile_pages_sit_side_by_side() {
        let layout = scenario_layout();
        let surface = HeadlessSurface::new(&layout, ViewportMode::Mobile, 390);
        let pages = collect(&layout, ViewportMode::Mobile);
        let edges: Vec<_> = pages
            .iter()
            .map(|p| surface.leading_edge(&p.anchor))
            .collect();
        assert_eq!(edges, vec![Some(0.0), Some(390.0), Some(780.0), Some(1170.0)]);
    }

    #[test]
    fn visible_section_follows_canvas_offset() {
        let mut surface = HeadlessSurface::new(&scenario_layout(), ViewportMode::Desktop, 1280);
        assert_eq!(surface.visible_section().as_deref(), Some("a"));
        surface.set_canvas_offset(HeadlessSurface::SLOT_HEIGHT * 2.0 + 10.0);
        assert_eq!(surface.visible_section().as_deref(), Some("d"));
        surface.scroll_into_view("e");
        assert_eq!(surface.visible_section().as_deref(), Some("e"));
    }

    #[test]
    fn history_replace_does_not_grow() {
        let mut location = MemoryLocation::new("");
        location.replace_query("?a");
        location.replace_query("?b");
        assert_eq!(location.history_len(), 1);
        assert_eq!(location.replacements(), 2);
        assert_eq!(location.query(), "?b");
    }

    #[test]
    fn history_back_and_forward() {
        let mut location = MemoryLocation::new("?a");
        location.push("?b");
        assert!(location.back());
        assert_eq!(location.query(), "?a");
        assert!(!location.back());
        assert!(location.forward());
        assert_eq!(location.query(), "?b");
        assert!(!location.forward());
    }
}
