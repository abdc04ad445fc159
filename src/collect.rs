//! Section collector: layout tree → ordered page list.
//!
//! Depth-first, children in declaration order. What becomes a page depends
//! on the viewport mode:
//!
//! | Section  | Mobile                         | Desktop            |
//! |----------|--------------------------------|--------------------|
//! | card     | one page                       | none (scroll-tracked) |
//! | combine  | one page (whole subtree)       | one page           |
//! | flatten  | recurse; transitive            | recurse            |
//!
//! The desktop canvas shows every card at once, so only combine groups keep
//! a page identity there. A combine group nested in a flatten group is still
//! exactly one page in both modes.
//!
//! Everything here is a pure function of its inputs and is safe to call on
//! every viewport transition.

use crate::layout::{Layout, Section, SectionKind};
use crate::types::{Membership, Page, PageList, SectionPath, ViewportMode};

/// Collect the pages of a whole layout.
pub fn collect(layout: &Layout, mode: ViewportMode) -> PageList {
    collect_tree(layout.root(), mode)
}

/// Collect the pages of an arbitrary subtree, rooted at the empty path.
pub fn collect_tree(tree: &Section, mode: ViewportMode) -> PageList {
    let mut pages = Vec::new();
    collect_into(tree, &SectionPath::root(), mode, &mut pages);
    PageList::new(pages)
}

fn collect_into(section: &Section, path: &SectionPath, mode: ViewportMode, pages: &mut Vec<Page>) {
    match section.kind {
        SectionKind::Card => {
            if mode.is_mobile() {
                pages.push(Page {
                    id: section.id.clone(),
                    anchor: path.clone(),
                    sources: vec![path.clone()],
                });
            }
        }
        SectionKind::Combine => {
            let mut sources = Vec::new();
            card_paths(section, path, &mut sources);
            pages.push(Page {
                id: section.id.clone(),
                anchor: path.clone(),
                sources,
            });
        }
        SectionKind::Flatten => {
            for (index, child) in section.children.iter().enumerate() {
                collect_into(child, &path.child(index), mode, pages);
            }
        }
    }
}

fn card_paths(section: &Section, path: &SectionPath, out: &mut Vec<SectionPath>) {
    if section.is_card() {
        out.push(path.clone());
        return;
    }
    for (index, child) in section.children.iter().enumerate() {
        card_paths(child, &path.child(index), out);
    }
}

/// Every section id in declaration order.
///
/// On desktop these are the deep-link targets: a token need not name a
/// whole page there, any visible section can be scrolled into view.
pub fn trackable_ids(layout: &Layout) -> Vec<&str> {
    let mut ids = Vec::new();
    layout.walk(|_, section| {
        if let Some(id) = section.id.as_deref() {
            ids.push(id);
        }
    });
    ids
}

/// Per-card membership under `mode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMembership<'a> {
    pub path: SectionPath,
    pub card: &'a Section,
    pub membership: Membership,
}

/// Report how each card participates in navigation under `mode`.
pub fn membership(layout: &Layout, mode: ViewportMode) -> Vec<CardMembership<'_>> {
    let mut out = Vec::new();
    membership_into(layout.root(), &SectionPath::root(), mode, false, &mut out);
    out
}

fn membership_into<'a>(
    section: &'a Section,
    path: &SectionPath,
    mode: ViewportMode,
    in_combine: bool,
    out: &mut Vec<CardMembership<'a>>,
) {
    if section.is_card() {
        let membership = if in_combine {
            Membership::PartOfParentPage
        } else if mode.is_mobile() {
            Membership::SeparatePage
        } else {
            Membership::Absorbed
        };
        out.push(CardMembership {
            path: path.clone(),
            card: section,
            membership,
        });
        return;
    }
    let in_combine = in_combine || section.kind == SectionKind::Combine;
    for (index, child) in section.children.iter().enumerate() {
        membership_into(child, &path.child(index), mode, in_combine, out);
    }
}
