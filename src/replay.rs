//! Scripted interaction replay.
//!
//! A replay script is a TOML file describing a timeline of host events. The
//! runner drives a [`Navigator`] over the in-memory host, advancing timers
//! before every step, and records what each step did to the current page
//! and the address bar.
//!
//! ```toml
//! query = "?streak"
//!
//! [[steps]]
//! at = 0
//! action = { kind = "start", width = 390 }
//!
//! [[steps]]
//! at = 50
//! action = { kind = "key", key = "ArrowRight" }
//!
//! [[steps]]
//! at = 400
//! action = { kind = "scroll", offset = 1560.0 }
//!
//! [[steps]]
//! at = 600
//! action = { kind = "tick" }
//! ```
//!
//! Step times are milliseconds from the start of the replay and must not
//! decrease.

use crate::headless::{HeadlessSurface, MemoryLocation};
use crate::host::Location;
use crate::layout::Layout;
use crate::navigator::{Navigator, NavigatorOptions};
use crate::pager::Key;
use crate::types::{PageChange, ViewportMode};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Script error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Query string the page is loaded with.
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Milliseconds since the replay began.
    pub at: u64,
    pub action: Action,
}

/// One host event.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Action {
    /// Initial layout pass ("ready").
    Start { width: u32 },
    Resize { width: u32 },
    /// Scroll the page container (mobile) or the canvas (desktop).
    Scroll { offset: f64 },
    /// DOM key name, e.g. `ArrowRight`.
    Key { key: String },
    Click { index: usize },
    /// User navigates to a new URL in the same document.
    Navigate { query: String },
    Back,
    Forward,
    GoTo { index: isize },
    GoToId { id: String },
    /// Only advance timers.
    Tick,
}

impl Action {
    pub fn label(&self) -> String {
        match self {
            Action::Start { width } => format!("start {width}px"),
            Action::Resize { width } => format!("resize {width}px"),
            Action::Scroll { offset } => format!("scroll {offset}"),
            Action::Key { key } => format!("key {key}"),
            Action::Click { index } => format!("click {index}"),
            Action::Navigate { query } => format!("navigate {query}"),
            Action::Back => "back".to_string(),
            Action::Forward => "forward".to_string(),
            Action::GoTo { index } => format!("go-to {index}"),
            Action::GoToId { id } => format!("go-to-id {id}"),
            Action::Tick => "tick".to_string(),
        }
    }
}

impl Script {
    pub fn parse(content: &str) -> Result<Self, ScriptError> {
        let script: Script = toml::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        for pair in self.steps.windows(2) {
            if pair[1].at < pair[0].at {
                return Err(ScriptError::Validation(format!(
                    "step at {}ms comes after step at {}ms",
                    pair[1].at, pair[0].at
                )));
            }
        }
        Ok(())
    }
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub at: u64,
    pub label: String,
    pub mode: ViewportMode,
    pub index: usize,
    /// Page changes observed during the step, including timers that fired
    /// just before it.
    pub changes: Vec<PageChange>,
    /// New query string, when the step rewrote or navigated the URL.
    pub url: Option<String>,
    /// Whether a key step asked the host to suppress its default action.
    pub prevent_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub final_query: String,
    pub final_index: usize,
    pub final_mode: ViewportMode,
    /// Rewrites of the current history entry over the whole run.
    pub replacements: usize,
}

/// Run `script` against `layout` on the in-memory host.
pub fn run(script: &Script, layout: Layout, options: NavigatorOptions) -> ReplayReport {
    let base = Instant::now();
    let surface = HeadlessSurface::new(&layout, ViewportMode::Desktop, 0);
    let location = MemoryLocation::new(&script.query);
    let mut nav = Navigator::new(layout, options, surface, location);

    let changes: Rc<RefCell<Vec<PageChange>>> = Rc::default();
    let sink = Rc::clone(&changes);
    nav.on_page_changed(move |id, index| {
        sink.borrow_mut().push(PageChange {
            index,
            id: id.map(str::to_string),
        });
    });

    let mut steps = Vec::with_capacity(script.steps.len());
    for step in &script.steps {
        let now = base + Duration::from_millis(step.at);
        let before = nav.location().query();
        nav.tick(now);
        let prevent_default = apply(&mut nav, &step.action, options.breakpoint, now);
        let after = nav.location().query();

        tracing::debug!(at = step.at, action = %step.action.label(), "replayed step");
        steps.push(StepReport {
            at: step.at,
            label: step.action.label(),
            mode: nav.state().viewport_mode,
            index: nav.state().current_index,
            changes: changes.borrow_mut().drain(..).collect(),
            url: (after != before).then_some(after),
            prevent_default,
        });
    }

    ReplayReport {
        steps,
        final_query: nav.location().query(),
        final_index: nav.state().current_index,
        final_mode: nav.state().viewport_mode,
        replacements: nav.location().replacements(),
    }
}

fn apply(
    nav: &mut Navigator<HeadlessSurface, MemoryLocation>,
    action: &Action,
    breakpoint: u32,
    now: Instant,
) -> bool {
    match action {
        Action::Start { width } | Action::Resize { width } => {
            let mode = ViewportMode::from_width(*width, breakpoint);
            let layout = nav.layout().clone();
            nav.surface_mut().relayout(&layout, mode, *width);
            if matches!(action, Action::Start { .. }) {
                nav.start(*width, now);
            } else {
                nav.resize(*width, now);
            }
        }
        Action::Scroll { offset } => {
            match nav.state().viewport_mode {
                ViewportMode::Mobile => nav.surface_mut().set_scroll_offset(*offset),
                ViewportMode::Desktop => nav.surface_mut().set_canvas_offset(*offset),
            }
            nav.scroll(*offset, now);
        }
        Action::Key { key } => return nav.key(Key::from_dom(key), now),
        Action::Click { index } => nav.indicator_click(*index, now),
        Action::Navigate { query } => {
            nav.location_mut().push(query);
            nav.popstate(now);
        }
        Action::Back => {
            if nav.location_mut().back() {
                nav.popstate(now);
            }
        }
        Action::Forward => {
            if nav.location_mut().forward() {
                nav.popstate(now);
            }
        }
        Action::GoTo { index } => nav.go_to(*index, now),
        Action::GoToId { id } => {
            if !nav.go_to_id(id, now) {
                tracing::warn!(id = %id, "go-to-id target not found");
            }
        }
        Action::Tick => {}
    }
    false
}
