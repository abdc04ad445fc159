//! Navigation orchestrator.
//!
//! Owns the single [`NavigationState`] and wires the collector, pagination
//! controller and URL synchronizer together:
//!
//! ```text
//! resize ──► collect ──► pager.activate / deactivate ──► resolve pending deep link
//! scroll / key / click / tick ──► pager ──► url.report_current ──► observers
//! popstate ──► url.popstate ──► resolve ──► pager.go_to (no history write)
//! ```
//!
//! [`Navigator::start`] is the "ready" signal: the initial deep link is
//! resolved only after the controller has activated for the detected mode.

use crate::collect::{collect, trackable_ids};
use crate::debounce::Debounce;
use crate::host::{Location, Motion, Surface};
use crate::layout::Layout;
use crate::pager::{Key, Pager};
use crate::types::{NavigationState, PageChange, PageList, ViewportMode};
use crate::url_sync::{Resolution, UrlSync};
use std::time::{Duration, Instant};

/// Tunables for a [`Navigator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorOptions {
    /// Mobile when the viewport width is at most this many logical pixels.
    pub breakpoint: u32,
    /// Quiet interval after the last scroll event before snapping.
    pub scroll_settle: Duration,
    /// How long popstate is ignored after our own URL write.
    pub self_write_guard: Duration,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            breakpoint: 768,
            scroll_settle: Duration::from_millis(120),
            self_write_guard: Duration::from_millis(100),
        }
    }
}

type PageObserver = Box<dyn FnMut(Option<&str>, usize)>;

pub struct Navigator<S, L> {
    layout: Layout,
    options: NavigatorOptions,
    state: NavigationState,
    pager: Pager,
    url: UrlSync,
    canvas_settle: Debounce,
    surface: S,
    location: L,
    observers: Vec<PageObserver>,
    started: bool,
}

impl<S: Surface, L: Location> Navigator<S, L> {
    pub fn new(layout: Layout, options: NavigatorOptions, surface: S, location: L) -> Self {
        Self {
            layout,
            options,
            state: NavigationState::new(ViewportMode::Desktop),
            pager: Pager::new(options.scroll_settle),
            url: UrlSync::new(options.self_write_guard),
            canvas_settle: Debounce::new(options.scroll_settle),
            surface,
            location,
            observers: Vec::new(),
            started: false,
        }
    }

    /// Subscribe to changes of the authoritative current page.
    pub fn on_page_changed(&mut self, observer: impl FnMut(Option<&str>, usize) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_paging(&self) -> bool {
        self.pager.is_listening()
    }

    /// Pages of the current viewport mode.
    pub fn pages(&self) -> PageList {
        self.pager
            .pages()
            .cloned()
            .unwrap_or_else(|| collect(&self.layout, self.state.viewport_mode))
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// First layout pass, then initial deep-link resolution.
    pub fn start(&mut self, width: u32, now: Instant) {
        self.state.viewport_mode = ViewportMode::from_width(width, self.options.breakpoint);
        self.state.pending_deep_link = self.url.current_token(&self.location);
        tracing::debug!(
            mode = %self.state.viewport_mode,
            token = ?self.state.pending_deep_link,
            "navigator starting"
        );
        self.apply_mode();
        self.started = true;
        self.resolve_pending(now);
        self.announce();
    }

    /// Viewport resize. Re-entering mobile is idempotent.
    pub fn resize(&mut self, width: u32, now: Instant) {
        if !self.started {
            self.start(width, now);
            return;
        }
        let mode = ViewportMode::from_width(width, self.options.breakpoint);
        let entering_mobile = mode.is_mobile() && !self.state.viewport_mode.is_mobile();
        if mode != self.state.viewport_mode {
            tracing::debug!(from = %self.state.viewport_mode, to = %mode, "viewport mode changed");
        }
        self.state.viewport_mode = mode;
        self.apply_mode();
        self.resolve_pending(now);
        if entering_mobile && self.state.pending_deep_link.is_none() {
            // Desktop tracking may have moved the token away from the resumed page.
            let id = self.pages().id_at(self.state.current_index).map(str::to_string);
            self.url
                .report_current(id.as_deref(), &mut self.state, &mut self.location, now);
        }
        self.announce();
    }

    fn apply_mode(&mut self) {
        self.canvas_settle.cancel();
        match self.state.viewport_mode {
            ViewportMode::Mobile => {
                let pages = collect(&self.layout, ViewportMode::Mobile);
                self.pager.activate(pages, &mut self.state, &mut self.surface);
            }
            ViewportMode::Desktop => self.pager.deactivate(&mut self.surface),
        }
    }

    /// Resolve the pending deep link, if any. Returns false when the token
    /// names nothing in the current mode; it then stays pending.
    fn resolve_pending(&mut self, now: Instant) -> bool {
        let Some(token) = self.state.pending_deep_link.clone() else {
            return true;
        };
        let pages = self.pages();
        match self
            .url
            .resolve(Some(&token), self.state.viewport_mode, &pages, &self.surface)
        {
            Resolution::Page(index) => {
                self.state.pending_deep_link = None;
                if let Some(change) =
                    self.pager
                        .go_to(index, Motion::Instant, &mut self.state, &mut self.surface)
                {
                    self.navigated(change, now);
                }
            }
            Resolution::ScrollTo(id) => {
                self.state.pending_deep_link = None;
                self.surface.scroll_into_view(&id);
            }
            Resolution::NotFound(token) => {
                tracing::debug!(token = %token, mode = %self.state.viewport_mode, "deep link not found");
                return false;
            }
            Resolution::NoTarget => self.state.pending_deep_link = None,
        }
        true
    }

    /// Fall back to the default view after history navigation.
    ///
    /// Mobile lands on the first page. On desktop only a bare URL scrolls the
    /// canvas back to its first section; an unknown token leaves it alone.
    fn return_to_start(&mut self, bare_url: bool) {
        match self.state.viewport_mode {
            ViewportMode::Mobile => {
                if let Some(change) =
                    self.pager
                        .go_to(0, Motion::Instant, &mut self.state, &mut self.surface)
                {
                    self.notify(&change);
                }
            }
            ViewportMode::Desktop => {
                if bare_url {
                    if let Some(first) = trackable_ids(&self.layout).first() {
                        self.surface.scroll_into_view(first);
                    }
                }
            }
        }
    }

    /// Tell observers about the current page without touching the URL.
    fn announce(&mut self) {
        if let Some(change) = self.pager.report(&self.state) {
            self.notify(&change);
        }
    }

    fn navigated(&mut self, change: PageChange, now: Instant) {
        self.url.report_current(
            change.id.as_deref(),
            &mut self.state,
            &mut self.location,
            now,
        );
        self.notify(&change);
    }

    fn notify(&mut self, change: &PageChange) {
        for observer in &mut self.observers {
            observer(change.id.as_deref(), change.index);
        }
    }

    /// Navigate to `index`. Negative or out-of-range indices are no-ops.
    pub fn go_to(&mut self, index: isize, now: Instant) {
        let Ok(index) = usize::try_from(index) else {
            return;
        };
        if index >= self.pages().len() {
            return;
        }
        self.state.pending_deep_link = None;
        if let Some(change) =
            self.pager
                .go_to(index, Motion::Smooth, &mut self.state, &mut self.surface)
        {
            self.navigated(change, now);
        }
    }

    /// Navigate to the page (mobile) or section (desktop) carrying `id`.
    ///
    /// Returns whether `id` named something navigable.
    pub fn go_to_id(&mut self, id: &str, now: Instant) -> bool {
        let pages = self.pages();
        match self
            .url
            .resolve(Some(id), self.state.viewport_mode, &pages, &self.surface)
        {
            Resolution::Page(index) => {
                self.go_to(index as isize, now);
                true
            }
            Resolution::ScrollTo(id) => {
                self.state.pending_deep_link = None;
                self.surface.scroll_into_view(&id);
                self.url
                    .report_current(Some(&id), &mut self.state, &mut self.location, now);
                true
            }
            Resolution::NotFound(_) | Resolution::NoTarget => false,
        }
    }

    /// Scroll event on the page container (mobile) or canvas (desktop).
    pub fn scroll(&mut self, offset: f64, now: Instant) {
        match self.state.viewport_mode {
            ViewportMode::Mobile => self.pager.scroll(offset, now),
            ViewportMode::Desktop => {
                self.canvas_settle.arm(now);
            }
        }
    }

    /// Key press; returns whether the host should prevent the default action.
    pub fn key(&mut self, key: Key, now: Instant) -> bool {
        let outcome = self.pager.key(key, &mut self.state, &mut self.surface);
        if outcome.prevent_default {
            self.state.pending_deep_link = None;
        }
        if let Some(change) = outcome.change {
            self.navigated(change, now);
        }
        outcome.prevent_default
    }

    pub fn indicator_click(&mut self, index: usize, now: Instant) {
        if let Some(change) =
            self.pager
                .indicator_click(index, &mut self.state, &mut self.surface)
        {
            self.state.pending_deep_link = None;
            self.navigated(change, now);
        }
    }

    /// Back/forward navigation. Ignored while our own URL write is settling.
    pub fn popstate(&mut self, now: Instant) {
        let Some(token) = self.url.popstate(&self.location) else {
            return;
        };
        match token {
            Some(token) => {
                self.state.pending_deep_link = Some(token);
                if !self.resolve_pending(now) {
                    self.return_to_start(false);
                }
            }
            None => {
                self.state.pending_deep_link = None;
                self.return_to_start(true);
            }
        }
    }

    /// Advance timers: scroll settle, canvas tracking, self-write guard.
    pub fn tick(&mut self, now: Instant) {
        self.url.tick(now, &mut self.state);
        if let Some(change) = self.pager.tick(now, &mut self.state, &mut self.surface) {
            self.state.pending_deep_link = None;
            self.navigated(change, now);
        }
        if self.canvas_settle.fire(now).is_some() {
            if let Some(id) = self.surface.visible_section() {
                self.url
                    .report_current(Some(&id), &mut self.state, &mut self.location, now);
            }
        }
    }
}
