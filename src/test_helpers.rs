//! Shared test utilities for the review-deck test suite.
//!
//! Provides layout builders, the reference scenario tree, and a recording
//! [`Surface`] that captures every host call for assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let layout = scenario_layout();
//! let pages = collect(&layout, ViewportMode::Mobile);
//! let mut surface = RecordingSurface::for_pages(&pages, 400.0);
//!
//! pager.activate(pages, &mut state, &mut surface);
//! assert_eq!(surface.live_listeners(ListenerKind::Scroll), 1);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::collect::{collect, trackable_ids};
use crate::host::{ListenerId, ListenerKind, Motion, Surface};
use crate::layout::{Layout, Section};
use crate::types::{PageList, SectionPath, ViewportMode};

// =========================================================================
// Layout builders
// =========================================================================

pub fn card(id: &str) -> Section {
    Section::card(id)
}

/// `[a, combine g [B, C], flatten [d, e]]`; B and C are anonymous.
///
/// Mobile pages: `a g d e`. Desktop pages: `g`.
pub fn scenario_layout() -> Layout {
    Layout::new(vec![
        card("a"),
        Section::combine(
            Some("g"),
            vec![
                Section::anonymous_card().with_title("B"),
                Section::anonymous_card().with_title("C"),
            ],
        ),
        Section::flatten(vec![card("d"), card("e")]),
    ])
}

// =========================================================================
// Recording surface
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    ScrollTo(f64, Motion),
    Mount(usize),
    Highlight(usize),
    Unmount,
    Listen(ListenerKind),
    Unlisten(ListenerId),
    ScrollIntoView(String),
}

/// Surface that records mutations and keeps live listener bookkeeping.
///
/// Indicators accumulate across mounts, so mounting twice without an
/// unmount shows up as a doubled count.
#[derive(Debug)]
pub struct RecordingSurface {
    pub container: bool,
    pub edges: HashMap<SectionPath, f64>,
    pub sections: HashSet<String>,
    pub listeners: BTreeMap<ListenerId, ListenerKind>,
    pub indicators: usize,
    pub highlighted: Option<usize>,
    pub offset: f64,
    pub visible: Option<String>,
    pub ops: Vec<SurfaceOp>,
    next_listener: ListenerId,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            container: true,
            edges: HashMap::new(),
            sections: HashSet::new(),
            listeners: BTreeMap::new(),
            indicators: 0,
            highlighted: None,
            offset: 0.0,
            visible: None,
            ops: Vec::new(),
            next_listener: 1,
        }
    }
}

impl RecordingSurface {
    /// Pages laid out side by side, `page_width` apart.
    pub fn for_pages(pages: &PageList, page_width: f64) -> Self {
        Self {
            edges: pages
                .iter()
                .enumerate()
                .map(|(index, page)| (page.anchor.clone(), index as f64 * page_width))
                .collect(),
            ..Self::default()
        }
    }

    /// Pages of `mode` side by side, with every section id present.
    pub fn for_layout(layout: &Layout, mode: ViewportMode, page_width: f64) -> Self {
        let mut surface = Self::for_pages(&collect(layout, mode), page_width);
        surface.sections = trackable_ids(layout)
            .into_iter()
            .map(str::to_string)
            .collect();
        surface
    }

    pub fn live_listeners(&self, kind: ListenerKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Surface for RecordingSurface {
    fn has_container(&self) -> bool {
        self.container
    }

    fn leading_edge(&self, anchor: &SectionPath) -> Option<f64> {
        if !self.container {
            return None;
        }
        self.edges.get(anchor).copied()
    }

    fn scroll_to(&mut self, offset: f64, motion: Motion) {
        self.ops.push(SurfaceOp::ScrollTo(offset, motion));
        self.offset = offset;
    }

    fn mount_indicators(&mut self, count: usize) {
        self.ops.push(SurfaceOp::Mount(count));
        self.indicators += count;
    }

    fn highlight_indicator(&mut self, index: usize) {
        self.ops.push(SurfaceOp::Highlight(index));
        self.highlighted = Some(index);
    }

    fn unmount_indicators(&mut self) {
        self.ops.push(SurfaceOp::Unmount);
        self.indicators = 0;
        self.highlighted = None;
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.ops.push(SurfaceOp::Listen(kind));
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.ops.push(SurfaceOp::Unlisten(id));
        self.listeners.remove(&id);
    }

    fn has_section(&self, id: &str) -> bool {
        self.sections.contains(id)
    }

    fn scroll_into_view(&mut self, id: &str) {
        self.ops.push(SurfaceOp::ScrollIntoView(id.to_string()));
        self.visible = Some(id.to_string());
    }

    fn visible_section(&self) -> Option<String> {
        self.visible.clone()
    }
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert page ids in order; use `"-"` for an anonymous page.
pub fn assert_page_ids(pages: &PageList, expected: &[&str]) {
    let actual: Vec<&str> = pages.ids().into_iter().map(|id| id.unwrap_or("-")).collect();
    assert_eq!(actual, expected, "page ids mismatch");
}
