//! Host environment seams.
//!
//! The controller never touches a DOM directly. Everything it needs from the
//! page (geometry, scrolling, indicator UI, listener registration) goes
//! through [`Surface`]; everything it needs from the address bar goes through
//! [`Location`]. A browser binding implements these over `web-sys`; the
//! [`crate::headless`] module implements them in memory for the CLI and
//! tests.
//!
//! Implementations must treat missing structure as a no-op: a surface whose
//! page container is gone reports `None` geometry and ignores writes.

use crate::types::SectionPath;

/// Handle returned by [`Surface::add_listener`].
pub type ListenerId = u64;

/// Input sources the pagination controller subscribes to while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Scroll,
    Keyboard,
    IndicatorClick,
}

/// How a scroll request should move the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Smooth,
    Instant,
}

pub trait Surface {
    /// Whether the horizontal page container exists.
    fn has_container(&self) -> bool;

    /// Leading-edge offset of the element at `anchor`, in the container's
    /// scroll coordinates. `None` if the element is absent.
    fn leading_edge(&self, anchor: &SectionPath) -> Option<f64>;

    /// Scroll the container so `offset` sits at the viewport's leading edge.
    fn scroll_to(&mut self, offset: f64, motion: Motion);

    /// Create `count` page indicators, replacing none (callers unmount first).
    fn mount_indicators(&mut self, count: usize);

    fn highlight_indicator(&mut self, index: usize);

    fn unmount_indicators(&mut self);

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);

    /// Whether an element with this section id is present.
    fn has_section(&self, id: &str) -> bool;

    /// Bring the section with `id` into view (desktop deep links).
    fn scroll_into_view(&mut self, id: &str);

    /// Id of the section currently at the top of the canvas, for desktop
    /// scroll tracking. Surfaces without vertical tracking return `None`.
    fn visible_section(&self) -> Option<String> {
        None
    }
}

/// The page URL, reduced to what deep linking needs.
pub trait Location {
    /// Current query string including the leading `?`, or empty.
    fn query(&self) -> String;

    /// Rewrite the query in place without creating a history entry.
    fn replace_query(&mut self, query: &str);
}
