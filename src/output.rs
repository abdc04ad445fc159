//! CLI output formatting.
//!
//! Output is **page-centric**: every line leads with a page's positional
//! index and its deep-link token, with layout detail (section paths, card
//! titles, membership) indented underneath.
//!
//! # Output Format
//!
//! ## Pages
//!
//! ```text
//! Mobile (4 pages)
//! 001 a
//!     card /0
//! 002 g
//!     combine /1 (2 cards)
//! 003 d
//!     card /2/0
//! 004 e
//!     card /2/1
//! ```
//!
//! ## Resolve
//!
//! ```text
//! ?d on mobile → page 003 d
//! ```
//!
//! ## Replay
//!
//! ```text
//!      0ms start 390px     [mobile 003]
//!     20ms key ArrowRight  [mobile 004] → e  url ?e
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::collect::CardMembership;
use crate::layout::{Layout, SectionKind};
use crate::replay::ReplayReport;
use crate::types::{PageList, ViewportMode};
use crate::url_sync::Resolution;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn page_label(id: Option<&str>) -> &str {
    id.unwrap_or("(anonymous)")
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Page list for one mode, with the section each page is anchored at.
pub fn format_pages(layout: &Layout, mode: ViewportMode, pages: &PageList) -> Vec<String> {
    let mut lines = Vec::new();
    let title = match mode {
        ViewportMode::Mobile => "Mobile",
        ViewportMode::Desktop => "Desktop",
    };
    lines.push(format!("{} ({})", title, plural(pages.len(), "page")));

    for (i, page) in pages.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            page_label(page.id.as_deref())
        ));
        let kind = layout
            .section_at(&page.anchor)
            .map(|section| section.kind)
            .unwrap_or_default();
        let detail = match kind {
            SectionKind::Combine => format!(
                "{} {} ({})",
                kind,
                page.anchor,
                plural(page.sources.len(), "card")
            ),
            _ => format!("{} {}", kind, page.anchor),
        };
        lines.push(format!("{}{}", indent(1), detail));
    }

    lines
}

pub fn print_pages(layout: &Layout, mode: ViewportMode, pages: &PageList) {
    for line in format_pages(layout, mode, pages) {
        println!("{}", line);
    }
}

/// Per-card membership, one line per card.
///
/// ```text
/// Cards (mobile)
/// /0 a: separate page
/// /1/0 B: part of parent page
/// ```
pub fn format_membership(mode: ViewportMode, cards: &[CardMembership<'_>]) -> Vec<String> {
    let mut lines = vec![format!("Cards ({})", mode)];
    for entry in cards {
        let name = entry
            .card
            .id
            .as_deref()
            .or(entry.card.title.as_deref())
            .unwrap_or("(untitled)");
        lines.push(format!("{} {}: {}", entry.path, name, entry.membership));
    }
    lines
}

pub fn print_membership(mode: ViewportMode, cards: &[CardMembership<'_>]) {
    for line in format_membership(mode, cards) {
        println!("{}", line);
    }
}

// ============================================================================
// Resolve
// ============================================================================

pub fn format_resolution(
    query: &str,
    mode: ViewportMode,
    pages: &PageList,
    resolution: &Resolution,
) -> Vec<String> {
    let shown = if query.is_empty() { "(no query)" } else { query };
    let outcome = match resolution {
        Resolution::NoTarget => format!("no token, first page {}", first_page(pages)),
        Resolution::Page(index) => format!(
            "page {} {}",
            format_index(index + 1),
            page_label(pages.id_at(*index))
        ),
        Resolution::ScrollTo(id) => format!("scroll to section {}", id),
        Resolution::NotFound(token) => {
            format!("{} not found, first page {}", token, first_page(pages))
        }
    };
    vec![format!("{} on {} → {}", shown, mode, outcome)]
}

fn first_page(pages: &PageList) -> String {
    match pages.get(0) {
        Some(page) => format!("{} {}", format_index(1), page_label(page.id.as_deref())),
        None => "(none)".to_string(),
    }
}

pub fn print_resolution(query: &str, mode: ViewportMode, pages: &PageList, resolution: &Resolution) {
    for line in format_resolution(query, mode, pages, resolution) {
        println!("{}", line);
    }
}

// ============================================================================
// Replay
// ============================================================================

pub fn format_replay(report: &ReplayReport) -> Vec<String> {
    let width = report
        .steps
        .iter()
        .map(|step| step.label.len())
        .max()
        .unwrap_or(0);
    let mut lines = Vec::new();

    for step in &report.steps {
        let mut line = format!(
            "{:>6}ms {:<width$} [{} {}]",
            step.at,
            step.label,
            step.mode,
            format_index(step.index + 1),
        );
        for change in &step.changes {
            line.push_str(&format!(" → {}", page_label(change.id.as_deref())));
        }
        if let Some(url) = &step.url {
            line.push_str(&format!("  url {}", if url.is_empty() { "(none)" } else { url.as_str() }));
        }
        if step.prevent_default {
            line.push_str("  (default prevented)");
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "Final: {} page {}, url {}, {}",
        report.final_mode,
        format_index(report.final_index + 1),
        if report.final_query.is_empty() {
            "(none)"
        } else {
            report.final_query.as_str()
        },
        plural(report.replacements, "history rewrite"),
    ));
    lines
}

pub fn print_replay(report: &ReplayReport) {
    for line in format_replay(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Layout summary for `check`.
pub fn format_check(layout: &Layout, mobile: &PageList, desktop: &PageList) -> Vec<String> {
    let mut cards = 0;
    let mut anonymous = 0;
    layout.walk(|_, section| {
        if section.is_card() {
            cards += 1;
            if section.id.is_none() {
                anonymous += 1;
            }
        }
    });
    let mut lines = vec![
        "Config OK".to_string(),
        format!(
            "{}{}, {} mobile, {} desktop",
            indent(1),
            plural(cards, "card"),
            plural(mobile.len(), "page"),
            plural(desktop.len(), "page"),
        ),
    ];
    if anonymous > 0 {
        lines.push(format!(
            "{}{} without an id cannot be deep-linked",
            indent(1),
            plural(anonymous, "card"),
        ));
    }
    lines
}

pub fn print_check(layout: &Layout, mobile: &PageList, desktop: &PageList) {
    for line in format_check(layout, mobile, desktop) {
        println!("{}", line);
    }
}
