//! Dashboard shell rendering.
//!
//! Writes a single `index.html` containing every section of the layout, in
//! declaration order, as nested markup:
//!
//! - **Cards** (`article.card`): title plus a body built from the `data.json`
//!   value the card's JSON pointer selects
//! - **Flatten groups** (`div.flatten-group`): transparent wrappers
//! - **Combine groups** (`div.combine-group`): one page-sized unit
//!
//! Every element carries `data-path`, the [`SectionPath`] the navigation
//! host uses as a page anchor, and `id` when the section has one, so
//! `?<id>` deep links can find it.
//!
//! The page map for both viewport modes is embedded as JSON in
//! `<script type="application/json" id="deck-pages">`.
//!
//! ## Data binding
//!
//! | Bound value     | Card body                          |
//! |-----------------|------------------------------------|
//! | object          | `<dl>` of its scalar fields        |
//! | array           | `<ul>` of its scalar items         |
//! | string / number | `<p>`                              |
//! | missing         | empty card (`card-empty`)          |
//!
//! A missing binding is never an error: the shell still renders and the
//! card is reported as unbound.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::collect::collect;
use crate::config::{ConfigError, DeckConfig};
use crate::layout::{Layout, Section, SectionKind};
use crate::types::{PageList, SectionPath, ViewportMode};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

const CSS: &str = include_str!("../static/deck.css");

/// What a render produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub output: PathBuf,
    pub cards: usize,
    /// Cards whose data binding is absent or selects nothing, by path.
    pub unbound: Vec<String>,
}

/// Render `data_path` through `config`'s layout into `output_dir/index.html`.
pub fn render(
    config: &DeckConfig,
    data_path: &Path,
    output_dir: &Path,
) -> Result<RenderSummary, RenderError> {
    config.validate()?;
    let data: Value = serde_json::from_str(&fs::read_to_string(data_path)?)?;
    let layout = config.layout();

    let page_map = page_map_json(&layout)?;
    let document = render_document(&config.site.title, &layout, &data, &page_map);

    fs::create_dir_all(output_dir)?;
    let output = output_dir.join("index.html");
    fs::write(&output, document.into_string())?;

    let mut cards = 0;
    let mut unbound = Vec::new();
    layout.walk(|path, section| {
        if section.is_card() {
            cards += 1;
            if bound_value(section, &data).is_none() {
                unbound.push(describe(path, section));
            }
        }
    });
    for card in &unbound {
        tracing::warn!(card = %card, "card has no data");
    }

    Ok(RenderSummary {
        output,
        cards,
        unbound,
    })
}

fn describe(path: &SectionPath, section: &Section) -> String {
    match section.id.as_deref().or(section.title.as_deref()) {
        Some(name) => format!("{} {}", path, name),
        None => path.to_string(),
    }
}

#[derive(Serialize)]
struct PageMap<'a> {
    mobile: Vec<Option<&'a str>>,
    desktop: Vec<Option<&'a str>>,
    anchors: Anchors,
}

#[derive(Serialize)]
struct Anchors {
    mobile: Vec<String>,
    desktop: Vec<String>,
}

fn anchors(pages: &PageList) -> Vec<String> {
    pages.iter().map(|page| page.anchor.to_string()).collect()
}

/// Page ids and anchors for both modes, safe to embed in a `<script>` body.
pub fn page_map_json(layout: &Layout) -> Result<String, serde_json::Error> {
    let mobile = collect(layout, ViewportMode::Mobile);
    let desktop = collect(layout, ViewportMode::Desktop);
    let map = PageMap {
        mobile: mobile.ids(),
        desktop: desktop.ids(),
        anchors: Anchors {
            mobile: anchors(&mobile),
            desktop: anchors(&desktop),
        },
    };
    Ok(serde_json::to_string(&map)?.replace("</", "<\\/"))
}

pub fn render_document(title: &str, layout: &Layout, data: &Value, page_map: &str) -> Markup {
    let mobile_pages = collect(layout, ViewportMode::Mobile).len();
    let content = html! {
        header.site-header {
            h1 { (title) }
        }
        main.deck {
            @for (index, section) in layout.sections().iter().enumerate() {
                (render_section(section, &SectionPath::root().child(index), data))
            }
        }
        (render_indicators(mobile_pages))
        script type="application/json" id="deck-pages" {
            (PreEscaped(page_map))
        }
    };
    base_document(title, CSS, content)
}

fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn render_section(section: &Section, path: &SectionPath, data: &Value) -> Markup {
    let children = html! {
        @for (index, child) in section.children.iter().enumerate() {
            (render_section(child, &path.child(index), data))
        }
    };
    match section.kind {
        SectionKind::Card => render_card(section, path, data),
        SectionKind::Flatten => html! {
            div.flatten-group id=[section.id.as_deref()] data-path=(path.to_string()) { (children) }
        },
        SectionKind::Combine => html! {
            div.combine-group id=[section.id.as_deref()] data-path=(path.to_string()) { (children) }
        },
    }
}

fn render_card(card: &Section, path: &SectionPath, data: &Value) -> Markup {
    let value = bound_value(card, data);
    let heading = card.title.as_deref().or(card.id.as_deref());
    html! {
        article.card.card-empty[value.is_none()] id=[card.id.as_deref()] data-path=(path.to_string()) {
            @if let Some(heading) = heading {
                h2 { (heading) }
            }
            @if let Some(value) = value {
                (render_value(value))
            }
            @if let Some(notes) = &card.notes {
                div.card-notes { (render_markdown(notes)) }
            }
        }
    }
}

fn bound_value<'a>(card: &Section, data: &'a Value) -> Option<&'a Value> {
    let pointer = card.data.as_deref()?;
    data.pointer(pointer).filter(|value| !value.is_null())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn render_value(value: &Value) -> Markup {
    match value {
        Value::Object(fields) => html! {
            dl {
                @for (key, field) in fields {
                    @if let Some(text) = scalar_text(field) {
                        dt { (key) }
                        dd { (text) }
                    }
                }
            }
        },
        Value::Array(items) => html! {
            ul {
                @for item in items {
                    @if let Some(text) = scalar_text(item) {
                        li { (text) }
                    }
                }
            }
        },
        scalar => html! {
            @if let Some(text) = scalar_text(scalar) {
                p { (text) }
            }
        },
    }
}

fn render_indicators(count: usize) -> Markup {
    html! {
        nav.page-indicators aria-label="Pages" {
            @for index in 0..count {
                button type="button" data-index=(index) aria-label=(format!("Page {}", index + 1)) {}
            }
        }
    }
}

fn render_markdown(source: &str) -> Markup {
    let parser = Parser::new(source);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    PreEscaped(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn render_scenario(data: &Value) -> String {
        let layout = scenario_layout();
        let map = page_map_json(&layout).unwrap();
        render_document("Test", &layout, data, &map).into_string()
    }

    #[test]
    fn document_starts_with_doctype() {
        let html = render_scenario(&json!({}));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test</title>"));
    }

    #[test]
    fn sections_carry_ids_and_paths() {
        let html = render_scenario(&json!({}));
        assert!(html.contains(r#"id="a" data-path="/0""#));
        assert!(html.contains(r#"class="combine-group" id="g" data-path="/1""#));
        assert!(html.contains(r#"class="flatten-group" data-path="/2""#));
        assert!(html.contains(r#"id="e" data-path="/2/1""#));
    }

    #[test]
    fn indicators_match_mobile_page_count() {
        let html = render_scenario(&json!({}));
        assert_eq!(html.matches("data-index=").count(), 4);
    }

    #[test]
    fn page_map_lists_both_modes() {
        let map: Value = serde_json::from_str(&page_map_json(&scenario_layout()).unwrap()).unwrap();
        assert_eq!(map["mobile"], json!(["a", "g", "d", "e"]));
        assert_eq!(map["desktop"], json!(["g"]));
        assert_eq!(map["anchors"]["mobile"], json!(["/0", "/1", "/2/0", "/2/1"]));
    }

    #[test]
    fn page_map_escapes_script_close() {
        let layout = Layout::new(vec![Section::card("x</script>y")]);
        let map = page_map_json(&layout).unwrap();
        assert!(!map.contains("</script>"));
    }

    #[test]
    fn object_binding_renders_scalar_fields_only() {
        let layout = Layout::new(vec![
            Section::card("overview")
                .with_title("Overview")
                .with_data("/static/overview"),
        ]);
        let data = json!({
            "static": { "overview": { "conversations": 812, "busiest": "March", "months": [1, 2] } }
        });
        let html = render_document("T", &layout, &data, "{}").into_string();
        assert!(html.contains("<dt>conversations</dt><dd>812</dd>"));
        assert!(html.contains("<dt>busiest</dt><dd>March</dd>"));
        assert!(!html.contains("months"));
        assert!(html.contains(r#"class="card" id="overview""#));
        assert!(!html.contains(r#"class="card card-empty""#));
    }

    #[test]
    fn missing_binding_renders_empty_card() {
        let layout = Layout::new(vec![Section::card("tarot").with_data("/tarot")]);
        let html = render_document("T", &layout, &json!({}), "{}").into_string();
        assert!(html.contains(r#"class="card card-empty" id="tarot""#));
    }

    #[test]
    fn notes_render_as_markdown() {
        let mut card = Section::card("emojis");
        card.notes = Some("Mostly **thumbs up**".to_string());
        let layout = Layout::new(vec![card]);
        let html = render_document("T", &layout, &json!({}), "{}").into_string();
        assert!(html.contains("<strong>thumbs up</strong>"));
    }

    #[test]
    fn text_is_escaped() {
        let layout = Layout::new(vec![Section::card("a").with_data("/a")]);
        let html = render_document("T", &layout, &json!({ "a": "<b>hi</b>" }), "{}").into_string();
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
    }

    #[test]
    fn render_writes_index_and_reports_unbound_cards() {
        let tmp = TempDir::new().unwrap();
        let data_path = tmp.path().join("data.json");
        fs::write(
            &data_path,
            r#"{ "static": { "overview": { "conversations": 3 } } }"#,
        )
        .unwrap();
        let out = tmp.path().join("dist");

        let summary = render(&DeckConfig::default(), &data_path, &out).unwrap();
        assert_eq!(summary.output, out.join("index.html"));
        assert!(summary.output.exists());
        assert_eq!(summary.cards, 13);
        assert_eq!(summary.unbound.len(), 12);
        assert!(!summary.unbound.iter().any(|c| c.contains("overview")));
    }

    #[test]
    fn render_rejects_malformed_data() {
        let tmp = TempDir::new().unwrap();
        let data_path = tmp.path().join("data.json");
        fs::write(&data_path, "{ not json").unwrap();
        let err = render(&DeckConfig::default(), &data_path, tmp.path()).unwrap_err();
        assert!(matches!(err, RenderError::Json(_)));
    }

    #[test]
    fn render_missing_data_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = render(
            &DeckConfig::default(),
            &tmp.path().join("nope.json"),
            tmp.path(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
