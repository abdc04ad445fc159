//! URL state synchronizer.
//!
//! The address bar carries at most one token, `?<id>`, naming what the user
//! is looking at. Passive updates always replace the current history entry.
//!
//! ## Self-write guard
//!
//! Rewriting the URL can loop back into navigation-observing code depending
//! on how the host is wired. After each write the synchronizer holds
//! `self_writing` for a short guard interval, and popstate handling is
//! skipped while it is set.
//!
//! ## Resolution
//!
//! | Mode    | Token looked up as            | Result              |
//! |---------|-------------------------------|---------------------|
//! | mobile  | a page id in the page list    | `Page(index)`       |
//! | desktop | any section id on the surface | `ScrollTo(id)`      |
//!
//! A token that names nothing resolves to `NotFound`; callers fall back to
//! the first page.

use crate::debounce::Debounce;
use crate::host::{Location, Surface};
use crate::types::{NavigationState, PageList, ViewportMode};
use std::time::{Duration, Instant};

/// Where a deep-link token points under the current page list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No token in the URL.
    NoTarget,
    /// Mobile: index into the page list.
    Page(usize),
    /// Desktop: section to scroll into view.
    ScrollTo(String),
    /// The token names no page or section in the current mode.
    NotFound(String),
}

/// Extract the deep-link token from a query string.
///
/// Only the first key is honoured: `?a&b` and `?a=1` both yield `a`.
pub fn parse_token(query: &str) -> Option<&str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let first = query.split('&').next().unwrap_or_default();
    let key = first.split('=').next().unwrap_or_default().trim();
    (!key.is_empty()).then_some(key)
}

/// Query string for a single token.
pub fn encode_token(token: &str) -> String {
    format!("?{token}")
}

#[derive(Debug)]
pub struct UrlSync {
    guard: Debounce,
}

impl UrlSync {
    pub fn new(guard_interval: Duration) -> Self {
        Self {
            guard: Debounce::new(guard_interval),
        }
    }

    pub fn is_self_writing(&self) -> bool {
        self.guard.is_armed()
    }

    /// Current token in the URL.
    pub fn current_token<L: Location + ?Sized>(&self, location: &L) -> Option<String> {
        parse_token(&location.query()).map(str::to_string)
    }

    /// Write `id` to the URL unless it is absent or already encoded.
    ///
    /// Returns whether the URL was rewritten.
    pub fn report_current<L: Location + ?Sized>(
        &mut self,
        id: Option<&str>,
        state: &mut NavigationState,
        location: &mut L,
        now: Instant,
    ) -> bool {
        let Some(id) = id else {
            return false;
        };
        if self.current_token(location).as_deref() == Some(id) {
            return false;
        }
        self.guard.arm(now);
        state.self_writing = true;
        location.replace_query(&encode_token(id));
        tracing::debug!(token = id, "url replaced");
        true
    }

    /// Clear the self-write guard once its interval has passed.
    pub fn tick(&mut self, now: Instant, state: &mut NavigationState) {
        if self.guard.fire(now).is_some() {
            state.self_writing = false;
        }
    }

    /// Resolve `token` against the current mode's navigable targets.
    pub fn resolve<S: Surface + ?Sized>(
        &self,
        token: Option<&str>,
        mode: ViewportMode,
        pages: &PageList,
        surface: &S,
    ) -> Resolution {
        let Some(token) = token else {
            return Resolution::NoTarget;
        };
        match mode {
            ViewportMode::Mobile => match pages.position_of(token) {
                Some(index) => Resolution::Page(index),
                None => Resolution::NotFound(token.to_string()),
            },
            ViewportMode::Desktop => {
                if surface.has_section(token) {
                    Resolution::ScrollTo(token.to_string())
                } else {
                    Resolution::NotFound(token.to_string())
                }
            }
        }
    }

    /// Read and resolve the token currently in the URL.
    pub fn resolve_location<S: Surface + ?Sized, L: Location + ?Sized>(
        &self,
        location: &L,
        mode: ViewportMode,
        pages: &PageList,
        surface: &S,
    ) -> Resolution {
        let token = self.current_token(location);
        self.resolve(token.as_deref(), mode, pages, surface)
    }

    /// Handle a back/forward navigation.
    ///
    /// Returns `None` while the guard is held; otherwise the token now in
    /// the URL (which may itself be `None`).
    pub fn popstate<L: Location + ?Sized>(&self, location: &L) -> Option<Option<String>> {
        if self.is_self_writing() {
            tracing::trace!("popstate ignored during self write");
            return None;
        }
        Some(self.current_token(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect;
    use crate::headless::MemoryLocation;
    use crate::layout::Layout;
    use crate::test_helpers::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn parse_token_honours_first_key_only() {
        assert_eq!(parse_token("?topics"), Some("topics"));
        assert_eq!(parse_token("topics"), Some("topics"));
        assert_eq!(parse_token("?topics&streak"), Some("topics"));
        assert_eq!(parse_token("?topics=1"), Some("topics"));
        assert_eq!(parse_token("?"), None);
        assert_eq!(parse_token(""), None);
        assert_eq!(parse_token("?=x"), None);
    }

    #[test]
    fn report_rewrites_once_and_holds_guard() {
        let t0 = std::time::Instant::now();
        let mut sync = UrlSync::new(ms(100));
        let mut state = NavigationState::new(ViewportMode::Mobile);
        let mut location = MemoryLocation::new("");

        assert!(sync.report_current(Some("card-7"), &mut state, &mut location, t0));
        assert_eq!(location.query(), "?card-7");
        assert!(state.self_writing);
        assert_eq!(location.history_len(), 1, "replace, never push");

        assert!(!sync.report_current(Some("card-7"), &mut state, &mut location, t0));
        assert!(!sync.report_current(None, &mut state, &mut location, t0));

        sync.tick(t0 + ms(99), &mut state);
        assert!(state.self_writing);
        sync.tick(t0 + ms(100), &mut state);
        assert!(!state.self_writing);
        assert!(!sync.is_self_writing());
    }

    #[test]
    fn report_then_resolve_round_trips() {
        let t0 = std::time::Instant::now();
        let layout = Layout::new((1..=9).map(|n| card(&format!("card-{n}"))).collect());
        let pages = collect(&layout, ViewportMode::Mobile);
        let surface = RecordingSurface::for_pages(&pages, 400.0);
        let mut sync = UrlSync::new(ms(100));
        let mut state = NavigationState::new(ViewportMode::Mobile);
        let mut location = MemoryLocation::new("");

        sync.report_current(Some("card-7"), &mut state, &mut location, t0);

        let reloaded = UrlSync::new(ms(100));
        assert_eq!(
            reloaded.resolve_location(&location, ViewportMode::Mobile, &pages, &surface),
            Resolution::Page(6)
        );
    }

    #[test]
    fn popstate_suppressed_while_self_writing() {
        let t0 = std::time::Instant::now();
        let mut sync = UrlSync::new(ms(100));
        let mut state = NavigationState::new(ViewportMode::Mobile);
        let mut location = MemoryLocation::new("?a");

        sync.report_current(Some("d"), &mut state, &mut location, t0);
        assert_eq!(sync.popstate(&location), None);

        sync.tick(t0 + ms(150), &mut state);
        assert_eq!(sync.popstate(&location), Some(Some("d".to_string())));
    }

    #[test]
    fn resolve_by_mode() {
        let layout = scenario_layout();
        let mobile = collect(&layout, ViewportMode::Mobile);
        let desktop = collect(&layout, ViewportMode::Desktop);
        let surface = RecordingSurface::for_layout(&layout, ViewportMode::Mobile, 400.0);
        let sync = UrlSync::new(ms(100));

        assert_eq!(
            sync.resolve(Some("d"), ViewportMode::Mobile, &mobile, &surface),
            Resolution::Page(2)
        );
        assert_eq!(
            sync.resolve(Some("d"), ViewportMode::Desktop, &desktop, &surface),
            Resolution::ScrollTo("d".into())
        );
        assert_eq!(
            sync.resolve(None, ViewportMode::Mobile, &mobile, &surface),
            Resolution::NoTarget
        );
        assert_eq!(
            sync.resolve(Some("nope"), ViewportMode::Desktop, &desktop, &surface),
            Resolution::NotFound("nope".into())
        );
    }

    #[test]
    fn token_inside_combine_group_is_not_a_mobile_page() {
        let layout = Layout::new(vec![
            card("a"),
            crate::layout::Section::combine(Some("g"), vec![card("b"), card("c")]),
        ]);
        let pages = collect(&layout, ViewportMode::Mobile);
        let surface = RecordingSurface::for_pages(&pages, 400.0);
        let sync = UrlSync::new(ms(100));
        assert_eq!(
            sync.resolve(Some("b"), ViewportMode::Mobile, &pages, &surface),
            Resolution::NotFound("b".into())
        );
    }
}
