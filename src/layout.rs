//! Declarative layout tree.
//!
//! The dashboard's structure is an explicit tree of cards and groups rather
//! than something inferred from markup nesting and CSS display rules:
//!
//! ```text
//! root (implicit flatten)
//! ├── card  first-conversation
//! ├── card  overview
//! ├── flatten
//! │   ├── card  longest-conversation
//! │   ├── card  longest-message
//! │   └── card  streak
//! ├── combine  perspective
//! │   ├── card
//! │   └── card
//! └── ...
//! ```
//!
//! Group behaviour is configuration: a `flatten` group's cards become
//! separate pages on mobile and share the canvas on desktop; a `combine`
//! group is always exactly one page. Which product groups get which kind is
//! decided in `review-deck.toml`, not in code.

use crate::types::SectionPath;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("duplicate section id '{0}'")]
    DuplicateId(String),
    #[error("invalid section id '{0}': ids must be non-empty and free of whitespace, '?', '&', '=' and '#'")]
    InvalidId(String),
    #[error("card at {0} has children; only flatten and combine groups may nest sections")]
    CardWithChildren(SectionPath),
    #[error("{kind} group at {path} has no children")]
    EmptyGroup { kind: SectionKind, path: SectionPath },
}

/// Node type in the layout tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Leaf card.
    #[default]
    Card,
    /// Children become independent pages on mobile, merged on desktop.
    Flatten,
    /// Always exactly one page/unit.
    Combine,
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Card => f.write_str("card"),
            SectionKind::Flatten => f.write_str("flatten"),
            SectionKind::Combine => f.write_str("combine"),
        }
    }
}

/// A node in the layout tree; either a card or a group of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    #[serde(default)]
    pub kind: SectionKind,
    /// Deep-link id. Sections without one can still be pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Heading shown on the card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// JSON pointer into `data.json` for the card body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Markdown shown under the card body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Section>,
}

impl Section {
    pub fn card(id: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Card,
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn anonymous_card() -> Self {
        Self::default()
    }

    pub fn flatten(children: Vec<Section>) -> Self {
        Self {
            kind: SectionKind::Flatten,
            children,
            ..Self::default()
        }
    }

    pub fn combine(id: Option<&str>, children: Vec<Section>) -> Self {
        Self {
            kind: SectionKind::Combine,
            id: id.map(str::to_string),
            children,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_data(mut self, pointer: impl Into<String>) -> Self {
        self.data = Some(pointer.into());
        self
    }

    pub fn is_card(&self) -> bool {
        self.kind == SectionKind::Card
    }
}

/// The whole layout: an implicit flatten group over the top-level sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: Section,
}

impl Layout {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            root: Section::flatten(sections),
        }
    }

    /// The dashboard layout used when the config declares no sections.
    ///
    /// Cards map onto the sections of `data.json` written by the analysis
    /// pipeline.
    pub fn stock() -> Self {
        Self::new(stock_sections())
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    pub fn sections(&self) -> &[Section] {
        &self.root.children
    }

    /// Look up the section at `path`.
    pub fn section_at(&self, path: &SectionPath) -> Option<&Section> {
        let mut node = &self.root;
        for &index in path.indices() {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Path of the section carrying `id`.
    pub fn find_id(&self, id: &str) -> Option<SectionPath> {
        let mut found = None;
        self.walk(|path, section| {
            if found.is_none() && section.id.as_deref() == Some(id) {
                found = Some(path.clone());
            }
        });
        found
    }

    /// Visit every section below the root depth-first in declaration order.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&SectionPath, &'a Section)) {
        fn recurse<'a>(
            section: &'a Section,
            path: &SectionPath,
            visit: &mut impl FnMut(&SectionPath, &'a Section),
        ) {
            for (index, child) in section.children.iter().enumerate() {
                let child_path = path.child(index);
                visit(&child_path, child);
                recurse(child, &child_path, visit);
            }
        }
        recurse(&self.root, &SectionPath::root(), &mut visit);
    }

    /// Check ids and nesting rules.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut seen = HashSet::new();
        let mut result = Ok(());
        self.walk(|path, section| {
            if result.is_err() {
                return;
            }
            result = check_section(path, section, &mut seen);
        });
        result
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::stock()
    }
}

fn check_section<'a>(
    path: &SectionPath,
    section: &'a Section,
    seen: &mut HashSet<&'a str>,
) -> Result<(), LayoutError> {
    if let Some(id) = section.id.as_deref() {
        if !is_valid_id(id) {
            return Err(LayoutError::InvalidId(id.to_string()));
        }
        if !seen.insert(id) {
            return Err(LayoutError::DuplicateId(id.to_string()));
        }
    }
    match section.kind {
        SectionKind::Card if !section.children.is_empty() => {
            Err(LayoutError::CardWithChildren(path.clone()))
        }
        SectionKind::Flatten | SectionKind::Combine if section.children.is_empty() => {
            Err(LayoutError::EmptyGroup {
                kind: section.kind,
                path: path.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Ids travel as a bare query token, so they must not contain query syntax.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '?' | '&' | '=' | '#'))
}

fn stock_sections() -> Vec<Section> {
    vec![
        Section::card("first-conversation")
            .with_title("Your first conversation")
            .with_data("/static/firstConversation"),
        Section::card("overview")
            .with_title("The year at a glance")
            .with_data("/static/overview"),
        Section::flatten(vec![
            Section::card("longest-conversation")
                .with_title("Longest conversation")
                .with_data("/static/longestConversation"),
            Section::card("longest-message")
                .with_title("Longest message")
                .with_data("/static/longestMessage"),
            Section::card("streak")
                .with_title("Longest streak")
                .with_data("/static/streak"),
        ]),
        Section::combine(
            Some("perspective"),
            vec![
                Section::anonymous_card()
                    .with_title("In perspective")
                    .with_data("/static/perspective"),
                Section::anonymous_card()
                    .with_title("Nutrition facts")
                    .with_data("/static/nutrition"),
            ],
        )
        .with_title("Perspective"),
        Section::card("topics")
            .with_title("What you talked about")
            .with_data("/topics"),
        Section::flatten(vec![
            Section::card("activity")
                .with_title("When you talked")
                .with_data("/charts"),
            Section::card("topic-stream")
                .with_title("Topics over time")
                .with_data("/streamgraph"),
        ]),
        Section::flatten(vec![
            Section::card("frustration")
                .with_title("Frustration index")
                .with_data("/frustration"),
            Section::card("emojis")
                .with_title("Emoji habits")
                .with_data("/emojis"),
        ]),
        Section::card("tarot")
            .with_title("Your tarot card")
            .with_data("/tarot"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_layout_is_valid() {
        assert_eq!(Layout::stock().validate(), Ok(()));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let layout = Layout::new(vec![
            Section::card("a"),
            Section::flatten(vec![Section::card("a")]),
        ]);
        assert_eq!(layout.validate(), Err(LayoutError::DuplicateId("a".into())));
    }

    #[test]
    fn query_syntax_in_id_rejected() {
        for bad in ["", "a b", "a=b", "a&b", "?a", "a#b"] {
            let layout = Layout::new(vec![Section::card(bad)]);
            assert_eq!(
                layout.validate(),
                Err(LayoutError::InvalidId(bad.into())),
                "id {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn card_with_children_rejected() {
        let mut card = Section::card("a");
        card.children.push(Section::card("b"));
        let layout = Layout::new(vec![card]);
        assert_eq!(
            layout.validate(),
            Err(LayoutError::CardWithChildren(SectionPath::from(vec![0])))
        );
    }

    #[test]
    fn empty_group_rejected() {
        let layout = Layout::new(vec![Section::card("a"), Section::combine(Some("g"), vec![])]);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::EmptyGroup {
                kind: SectionKind::Combine,
                ..
            })
        ));
    }

    #[test]
    fn find_id_and_section_at_agree() {
        let layout = Layout::new(vec![
            Section::card("a"),
            Section::flatten(vec![Section::card("d"), Section::card("e")]),
        ]);
        let path = layout.find_id("e").unwrap();
        assert_eq!(path, SectionPath::from(vec![1, 1]));
        assert_eq!(layout.section_at(&path).unwrap().id.as_deref(), Some("e"));
        assert!(layout.find_id("zzz").is_none());
        assert!(layout.section_at(&SectionPath::from(vec![5])).is_none());
    }

    #[test]
    fn walk_is_depth_first_in_declaration_order() {
        let layout = Layout::new(vec![
            Section::card("a"),
            Section::combine(Some("g"), vec![Section::card("b"), Section::card("c")]),
            Section::card("z"),
        ]);
        let mut ids = Vec::new();
        layout.walk(|_, s| ids.push(s.id.clone().unwrap_or_default()));
        assert_eq!(ids, vec!["a", "g", "b", "c", "z"]);
    }

    #[test]
    fn parse_sections_from_toml() {
        let toml = r#"
[[sections]]
id = "a"

[[sections]]
kind = "combine"
id = "g"

[[sections.children]]
title = "B"

[[sections.children]]
title = "C"
"#;
        #[derive(Deserialize)]
        struct Doc {
            sections: Vec<Section>,
        }
        let doc: Doc = toml::from_str(toml).unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].kind, SectionKind::Card);
        assert_eq!(doc.sections[1].kind, SectionKind::Combine);
        assert_eq!(doc.sections[1].children.len(), 2);
        assert_eq!(doc.sections[1].children[1].title.as_deref(), Some("C"));
    }

    #[test]
    fn unknown_section_keys_rejected() {
        let result: Result<Section, _> = toml::from_str("id = \"a\"\ncolour = \"red\"\n");
        assert!(result.is_err());
    }
}
