//! Pagination controller.
//!
//! Two phases: `Inactive` (desktop, no paging UI) and `Active` (mobile, one
//! indicator per page). Every activation releases the previous listener set
//! and indicators before acquiring new ones, so repeated viewport transitions
//! never stack callbacks.
//!
//! ## Scroll settle
//!
//! Each scroll event re-arms a quiet-interval timer. When it fires, the page
//! whose leading edge is nearest the scroll offset becomes current (ties go
//! to the lower index). Timers are armed under the current navigation epoch;
//! keyboard and indicator navigation bump the epoch, so a settle armed before
//! the user's latest intent is discarded instead of snapping back.
//!
//! ## Reporting
//!
//! Operations return `Some(PageChange)` only when the current index or its id
//! differs from the last one reported. Callers forward that to the URL
//! synchronizer and to page-change observers.

use crate::debounce::Debounce;
use crate::host::{ListenerId, ListenerKind, Motion, Surface};
use crate::types::{NavigationState, PageChange, PageList};
use std::time::{Duration, Instant};

/// Keyboard input the controller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Up,
    Right,
    Down,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowLeft" => Key::Left,
            "ArrowUp" => Key::Up,
            "ArrowRight" => Key::Right,
            "ArrowDown" => Key::Down,
            _ => Key::Other,
        }
    }

    fn step(self) -> Option<isize> {
        match self {
            Key::Left | Key::Up => Some(-1),
            Key::Right | Key::Down => Some(1),
            Key::Other => None,
        }
    }
}

/// Result of offering a key press to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The host should suppress the key's default scroll behaviour.
    pub prevent_default: bool,
    pub change: Option<PageChange>,
}

/// Listener set held by one activation.
///
/// Released with [`Subscription::dispose`]; the controller always disposes
/// the previous set before acquiring the next.
#[derive(Debug)]
#[must_use]
pub struct Subscription {
    listeners: Vec<ListenerId>,
}

impl Subscription {
    pub fn acquire<S: Surface + ?Sized>(surface: &mut S) -> Self {
        let listeners = [
            ListenerKind::Scroll,
            ListenerKind::Keyboard,
            ListenerKind::IndicatorClick,
        ]
        .into_iter()
        .map(|kind| surface.add_listener(kind))
        .collect();
        Self { listeners }
    }

    pub fn dispose<S: Surface + ?Sized>(self, surface: &mut S) {
        for id in self.listeners {
            surface.remove_listener(id);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[derive(Debug)]
enum Phase {
    Inactive,
    Active {
        pages: PageList,
        /// Absent when there is nothing to page or no container to page in.
        subscription: Option<Subscription>,
    },
}

#[derive(Debug)]
pub struct Pager {
    phase: Phase,
    /// Page list of the most recent activation, kept across deactivation so
    /// an identical re-activation resumes at the same index.
    previous: Option<PageList>,
    settle: Debounce,
    settle_epoch: u64,
    epoch: u64,
    scroll_offset: f64,
    last_reported: Option<PageChange>,
}

impl Pager {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            phase: Phase::Inactive,
            previous: None,
            settle: Debounce::new(settle_delay),
            settle_epoch: 0,
            epoch: 0,
            scroll_offset: 0.0,
            last_reported: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    /// Whether input listeners are attached (active with at least one page).
    pub fn is_listening(&self) -> bool {
        matches!(
            self.phase,
            Phase::Active {
                subscription: Some(_),
                ..
            }
        )
    }

    /// Pages of the current activation.
    pub fn pages(&self) -> Option<&PageList> {
        match &self.phase {
            Phase::Active { pages, .. } => Some(pages),
            Phase::Inactive => None,
        }
    }

    pub fn has_pending_settle(&self) -> bool {
        self.settle.is_armed()
    }

    /// Enter `Active` with `pages`.
    ///
    /// The index resumes (clamped) when `pages` equals the previous
    /// activation's list and resets to 0 otherwise. Deep-link resolution is
    /// the caller's job and happens after this returns.
    pub fn activate<S: Surface + ?Sized>(
        &mut self,
        pages: PageList,
        state: &mut NavigationState,
        surface: &mut S,
    ) {
        self.teardown(surface);

        let resume = self.previous.as_ref() == Some(&pages);
        state.current_index = if resume {
            state.current_index.min(pages.len().saturating_sub(1))
        } else {
            0
        };
        self.previous = Some(pages.clone());

        if pages.is_empty() || !surface.has_container() {
            tracing::debug!(
                pages = pages.len(),
                container = surface.has_container(),
                "pager active without listeners"
            );
            self.phase = Phase::Active {
                pages,
                subscription: None,
            };
            return;
        }

        surface.mount_indicators(pages.len());
        surface.highlight_indicator(state.current_index);
        if let Some(edge) = pages
            .get(state.current_index)
            .and_then(|page| surface.leading_edge(&page.anchor))
        {
            surface.scroll_to(edge, Motion::Instant);
            self.scroll_offset = edge;
        }
        let subscription = Subscription::acquire(surface);
        tracing::debug!(
            pages = pages.len(),
            index = state.current_index,
            resume,
            "pager activated"
        );
        self.phase = Phase::Active {
            pages,
            subscription: Some(subscription),
        };
    }

    /// Enter `Inactive`. The current index is left untouched, but the last
    /// report is forgotten so the resumed page is announced again.
    pub fn deactivate<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.is_active() {
            tracing::debug!("pager deactivated");
            self.last_reported = None;
        }
        self.teardown(surface);
    }

    fn teardown<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if let Phase::Active { subscription, .. } =
            std::mem::replace(&mut self.phase, Phase::Inactive)
        {
            if let Some(subscription) = subscription {
                subscription.dispose(surface);
                surface.unmount_indicators();
            }
        }
        self.settle.cancel();
        self.epoch += 1;
    }

    /// Navigate to `index`; out-of-range or inactive calls are no-ops.
    pub fn go_to<S: Surface + ?Sized>(
        &mut self,
        index: usize,
        motion: Motion,
        state: &mut NavigationState,
        surface: &mut S,
    ) -> Option<PageChange> {
        if !self.is_listening() {
            return None;
        }
        let anchor = self.pages()?.get(index)?.anchor.clone();
        let edge = surface.leading_edge(&anchor)?;

        self.epoch += 1;
        surface.scroll_to(edge, motion);
        self.scroll_offset = edge;
        state.current_index = index;
        surface.highlight_indicator(index);
        self.report(state)
    }

    /// Navigate relative to the current index, without wraparound.
    pub fn step<S: Surface + ?Sized>(
        &mut self,
        delta: isize,
        state: &mut NavigationState,
        surface: &mut S,
    ) -> Option<PageChange> {
        let target = state.current_index.checked_add_signed(delta)?;
        self.go_to(target, Motion::Smooth, state, surface)
    }

    /// Offer a key press. Arrow keys are swallowed while listening, even at
    /// the ends of the deck.
    pub fn key<S: Surface + ?Sized>(
        &mut self,
        key: Key,
        state: &mut NavigationState,
        surface: &mut S,
    ) -> KeyOutcome {
        if !self.is_listening() {
            return KeyOutcome::default();
        }
        match key.step() {
            Some(delta) => KeyOutcome {
                prevent_default: true,
                change: self.step(delta, state, surface),
            },
            None => KeyOutcome::default(),
        }
    }

    pub fn indicator_click<S: Surface + ?Sized>(
        &mut self,
        index: usize,
        state: &mut NavigationState,
        surface: &mut S,
    ) -> Option<PageChange> {
        self.go_to(index, Motion::Smooth, state, surface)
    }

    /// Record a scroll event and restart the settle interval.
    pub fn scroll(&mut self, offset: f64, now: Instant) {
        if !self.is_listening() {
            return;
        }
        self.scroll_offset = offset;
        self.settle.arm(now);
        self.settle_epoch = self.epoch;
    }

    /// Fire the settle timer if due and snap to the nearest page.
    pub fn tick<S: Surface + ?Sized>(
        &mut self,
        now: Instant,
        state: &mut NavigationState,
        surface: &mut S,
    ) -> Option<PageChange> {
        self.settle.fire(now)?;
        if self.settle_epoch != self.epoch {
            tracing::trace!(
                armed = self.settle_epoch,
                current = self.epoch,
                "discarding superseded scroll settle"
            );
            return None;
        }
        let nearest = self.nearest_page(surface)?;
        state.current_index = nearest;
        surface.highlight_indicator(nearest);
        self.report(state)
    }

    fn nearest_page<S: Surface + ?Sized>(&self, surface: &S) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, page) in self.pages()?.iter().enumerate() {
            let Some(edge) = surface.leading_edge(&page.anchor) else {
                continue;
            };
            let distance = (edge - self.scroll_offset).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    /// The current page as a change, if it differs from the last report.
    pub fn report(&mut self, state: &NavigationState) -> Option<PageChange> {
        let pages = self.pages()?;
        if state.current_index >= pages.len() {
            return None;
        }
        let change = PageChange {
            index: state.current_index,
            id: pages.id_at(state.current_index).map(str::to_string),
        };
        if self.last_reported.as_ref() == Some(&change) {
            return None;
        }
        self.last_reported = Some(change.clone());
        Some(change)
    }
}
