//! Deck configuration module.
//!
//! Handles loading, validating, and merging `review-deck.toml`. Stock
//! defaults are the base layer; a user file overrides any subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "GPT in Review"
//!
//! [viewport]
//! breakpoint = 768          # mobile when width <= breakpoint (logical px)
//!
//! [timing]
//! scroll_settle_ms = 120    # quiet interval before snapping to a page
//! self_write_guard_ms = 100 # ignore popstate this long after our own URL write
//!
//! [[sections]]              # layout tree; replaces the stock layout entirely
//! kind = "card"             # card | flatten | combine
//! id = "overview"
//! title = "The year at a glance"
//! data = "/static/overview" # JSON pointer into data.json
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [viewport]
//! breakpoint = 640
//! ```
//!
//! Tables merge key by key; arrays (including `sections`) replace the stock
//! value wholesale. Unknown keys are rejected to catch typos early.

use crate::layout::{Layout, LayoutError, Section};
use crate::navigator::NavigatorOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Deck configuration loaded from `review-deck.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    /// Page-level settings for the rendered shell.
    pub site: SiteConfig,
    /// Desktop/mobile breakpoint.
    pub viewport: ViewportConfig,
    /// Debounce and guard intervals.
    pub timing: TimingConfig,
    /// Layout tree. Defaults to the stock dashboard layout.
    pub sections: Vec<Section>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            viewport: ViewportConfig::default(),
            timing: TimingConfig::default(),
            sections: Layout::stock().sections().to_vec(),
        }
    }
}

impl DeckConfig {
    /// Validate config values and the layout tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport.breakpoint == 0 {
            return Err(ConfigError::Validation(
                "viewport.breakpoint must be non-zero".into(),
            ));
        }
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        self.layout().validate()?;
        Ok(())
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.sections.clone())
    }

    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            breakpoint: self.viewport.breakpoint,
            scroll_settle: Duration::from_millis(self.timing.scroll_settle_ms),
            self_write_guard: Duration::from_millis(self.timing.self_write_guard_ms),
        }
    }
}

/// Page-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Document title and masthead.
    pub title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "GPT in Review".to_string(),
        }
    }
}

/// Viewport regime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    /// Widths at or below this many logical pixels use the mobile deck.
    pub breakpoint: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { breakpoint: 768 }
    }
}

/// Timer settings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Quiet interval after the last scroll event before snapping.
    pub scroll_settle_ms: u64,
    /// How long popstate is ignored after the deck rewrites the URL.
    pub self_write_guard_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 120,
            self_write_guard_ms: 100,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(DeckConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<DeckConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DeckConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<DeckConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `review-deck.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Review Deck Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Document title and masthead of the rendered dashboard.
title = "GPT in Review"

# ---------------------------------------------------------------------------
# Viewport
# ---------------------------------------------------------------------------
[viewport]
# Widths at or below this many logical pixels get the swipeable mobile deck;
# wider viewports get the desktop grid.
breakpoint = 768

# ---------------------------------------------------------------------------
# Timing
# ---------------------------------------------------------------------------
[timing]
# Quiet interval (ms) after the last scroll event before the deck snaps to
# the nearest page and updates the URL.
scroll_settle_ms = 120

# How long (ms) back/forward events are ignored after the deck rewrites the
# URL itself.
self_write_guard_ms = 100

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
# Declaring any [[sections]] replaces the stock layout entirely.
#
# kind = "card"     a single card (default)
# kind = "flatten"  children are separate pages on mobile, one canvas on desktop
# kind = "combine"  always exactly one page, on every viewport
#
# id     deep-link token (?id); no spaces, '?', '&', '=' or '#'
# title  card heading
# data   JSON pointer into data.json for the card body
# notes  markdown shown under the card body
#
# [[sections]]
# id = "overview"
# title = "The year at a glance"
# data = "/static/overview"
#
# [[sections]]
# kind = "flatten"
#
# [[sections.children]]
# id = "longest-conversation"
# data = "/static/longestConversation"
#
# [[sections.children]]
# id = "streak"
# data = "/static/streak"
#
# [[sections]]
# kind = "combine"
# id = "perspective"
#
# [[sections.children]]
# title = "In perspective"
# data = "/static/perspective"
#
# [[sections.children]]
# title = "Nutrition facts"
# data = "/static/nutrition"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SectionKind;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = DeckConfig::default();
        assert_eq!(config.viewport.breakpoint, 768);
        assert_eq!(config.timing.scroll_settle_ms, 120);
        assert_eq!(config.timing.self_write_guard_ms, 100);
        assert_eq!(config.site.title, "GPT in Review");
        assert_eq!(config.layout(), Layout::stock());
    }

    #[test]
    fn stock_defaults_round_trip_through_toml() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config, DeckConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let overlay: toml::Value = toml::from_str("[viewport]\nbreakpoint = 640\n").unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.viewport.breakpoint, 640);
        // Default values preserved
        assert_eq!(config.timing.scroll_settle_ms, 120);
        assert_eq!(config.layout(), Layout::stock());
    }

    #[test]
    fn user_sections_replace_stock_layout() {
        let overlay: toml::Value = toml::from_str(
            r#"
[[sections]]
id = "a"

[[sections]]
kind = "flatten"

[[sections.children]]
id = "d"
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.sections.len(), 2);
        assert_eq!(config.sections[1].kind, SectionKind::Flatten);
    }

    #[test]
    fn navigator_options_from_config() {
        let mut config = DeckConfig::default();
        config.timing.scroll_settle_ms = 250;
        let options = config.navigator_options();
        assert_eq!(options.breakpoint, 768);
        assert_eq!(options.scroll_settle, Duration::from_millis(250));
        assert_eq!(options.self_write_guard, Duration::from_millis(100));
    }

    #[test]
    fn merge_toml_overlay_wins_and_keeps_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("review-deck.toml")).unwrap();
        assert_eq!(config, DeckConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("review-deck.toml");
        fs::write(
            &path,
            r#"
[site]
title = "My year"

[timing]
self_write_guard_ms = 50
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.site.title, "My year");
        assert_eq!(config.timing.self_write_guard_ms, 50);
        assert_eq!(config.timing.scroll_settle_ms, 120);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("review-deck.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("review-deck.toml");
        fs::write(&path, "[viewport]\nbreakpont = 700\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_breakpoint_is_invalid() {
        let mut config = DeckConfig::default();
        config.viewport.breakpoint = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn duplicate_section_ids_are_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("review-deck.toml");
        fs::write(&path, "[[sections]]\nid = \"a\"\n\n[[sections]]\nid = \"a\"\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Layout(LayoutError::DuplicateId(_)))
        ));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let overlay: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config, DeckConfig::default());
    }
}
