//! Shared types used across the collector, controller and URL synchronizer.
//!
//! A [`PageList`] is produced by [`crate::collect`] and consumed by the
//! [`crate::pager`] and [`crate::url_sync`] modules. None of these types own
//! host resources; [`SectionPath`] is the only handle the host ever sees.

use serde::Serialize;
use std::fmt;

/// Layout regime, switched at a single width breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportMode {
    /// Grid canvas; no paging UI, sections are scroll-tracked.
    Desktop,
    /// Horizontally swipeable deck of full-viewport pages.
    Mobile,
}

impl ViewportMode {
    /// Mobile when `width <= breakpoint` (logical pixels).
    pub fn from_width(width: u32, breakpoint: u32) -> Self {
        if width <= breakpoint {
            ViewportMode::Mobile
        } else {
            ViewportMode::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        self == ViewportMode::Mobile
    }
}

impl fmt::Display for ViewportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportMode::Desktop => f.write_str("desktop"),
            ViewportMode::Mobile => f.write_str("mobile"),
        }
    }
}

/// Position of a section in the layout tree, as child indices from the root.
///
/// This is the opaque handle the host uses to find the element a page
/// starts at. The root itself is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SectionPath(Vec<usize>);

impl SectionPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this section.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<usize>> for SectionPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// One navigable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Deep-link id, absent for anonymous cards and groups.
    pub id: Option<String>,
    /// Section the page's leading edge belongs to.
    pub anchor: SectionPath,
    /// Cards covered by this page, in declaration order.
    pub sources: Vec<SectionPath>,
}

/// Ordered pages for one (layout, viewport mode) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageList {
    pages: Vec<Page>,
}

impl PageList {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    /// Page ids in order, `None` for anonymous pages.
    pub fn ids(&self) -> Vec<Option<&str>> {
        self.pages.iter().map(|p| p.id.as_deref()).collect()
    }

    /// Index of the first page carrying `id`.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.id.as_deref() == Some(id))
    }

    /// Id of the page at `index`, if the page exists and has one.
    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.pages.get(index).and_then(|p| p.id.as_deref())
    }
}

impl<'a> IntoIterator for &'a PageList {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

/// How a card participates in navigation under a given viewport mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Membership {
    /// The card is a page of its own.
    SeparatePage,
    /// The card is part of an enclosing combine group's page.
    PartOfParentPage,
    /// Visible together with its siblings on the canvas; tracked by scroll
    /// position rather than paged.
    Absorbed,
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Membership::SeparatePage => f.write_str("separate page"),
            Membership::PartOfParentPage => f.write_str("part of parent page"),
            Membership::Absorbed => f.write_str("absorbed"),
        }
    }
}

/// Notification payload for a change of the authoritative current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageChange {
    pub index: usize,
    pub id: Option<String>,
}

/// Process-wide navigation state.
///
/// Owned by [`crate::navigator::Navigator`] and lent to the controller and
/// synchronizer for each operation. Nothing here survives a reload except
/// what the URL encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_index: usize,
    pub viewport_mode: ViewportMode,
    pub pending_deep_link: Option<String>,
    pub self_writing: bool,
}

impl NavigationState {
    pub fn new(viewport_mode: ViewportMode) -> Self {
        Self {
            current_index: 0,
            viewport_mode,
            pending_deep_link: None,
            self_writing: false,
        }
    }
}
