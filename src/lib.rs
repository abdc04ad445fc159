//! # Review Deck
//!
//! Adaptive card pagination and deep linking for a single-page analytics
//! dashboard. The same set of cards is a grid canvas on wide viewports and a
//! horizontally swipeable deck of full-screen pages on narrow ones, and the
//! address bar always names what the user is looking at (`?<id>`).
//!
//! # Architecture: Three Cooperating Parts
//!
//! ```text
//! layout tree ──► collect ──► PageList ──► pager ──► current page ──► url_sync ──► ?<id>
//!                    ▲                        ▲                            │
//!              viewport mode           scroll / keys / clicks         back / forward
//! ```
//!
//! - **Section collector** turns the declarative layout into an ordered page
//!   list for the current viewport mode. Pure, and cheap enough to rerun on
//!   every resize.
//! - **Pagination controller** owns the current index on mobile: snapping
//!   after scroll settles, arrow keys, indicator clicks. Every activation
//!   releases the previous listener set before acquiring a new one.
//! - **URL state synchronizer** reads the initial deep link, writes the
//!   current page back with history replacement, and resolves back/forward
//!   navigation, ignoring events caused by its own writes.
//!
//! [`navigator::Navigator`] wires the three together over a host that
//! implements [`host::Surface`] and [`host::Location`]. All time is explicit:
//! every input carries an `Instant`, and timers advance in
//! [`navigator::Navigator::tick`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`layout`] | Layout tree (`card` / `flatten` / `combine`), validation, stock dashboard layout |
//! | [`collect`] | Layout tree → ordered page list per viewport mode; per-card membership |
//! | [`pager`] | Pagination controller: activation lifecycle, snapping, keys, indicators |
//! | [`url_sync`] | Query-token parsing, history replacement, self-write guard, resolution |
//! | [`navigator`] | Orchestrates the three parts and notifies page-change observers |
//! | [`host`] | Traits the rendering host implements |
//! | [`headless`] | In-memory host with fixed geometry and session history |
//! | [`debounce`] | Explicit-clock cancel-and-replace timer |
//! | [`replay`] | Scripted interaction timelines driven through the headless host |
//! | [`render`] | Static dashboard shell rendered with Maud |
//! | [`config`] | `review-deck.toml` loading, validation, and merging |
//! | [`types`] | Shared types: viewport mode, pages, navigation state |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Declarative Layout
//!
//! Group behaviour is configuration, not something inferred from markup.
//! A `flatten` group's children are separate pages on mobile; a `combine`
//! group is always exactly one page. The top level is an implicit flatten
//! group.
//!
//! ## Desktop Has No Paging
//!
//! On the desktop canvas every card is visible at once, so only combine
//! groups keep a page identity. Deep links on desktop resolve to any section
//! id and scroll it into view; the URL follows whichever section is at the
//! top of the canvas once scrolling settles.
//!
//! ## Owned State, No Globals
//!
//! A single [`types::NavigationState`] is owned by the navigator and passed
//! by reference to each part. Listener registrations are held in a
//! [`pager::Subscription`] that is disposed before the next one is acquired.

pub mod collect;
pub mod config;
pub mod debounce;
pub mod headless;
pub mod host;
pub mod layout;
pub mod navigator;
pub mod output;
pub mod pager;
pub mod render;
pub mod replay;
pub mod types;
pub mod url_sync;

#[cfg(test)]
pub(crate) mod test_helpers;
