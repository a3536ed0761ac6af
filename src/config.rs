//! Site configuration module.
//!
//! Handles loading, validating, and merging the site's `config.toml`. User
//! values are layered over stock defaults, so a config file only needs the
//! keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [hero]
//! period_ms = 5000          # Time each slide stays on screen
//! commit_delay_ms = 1000    # Cross-fade start → slide committed
//! crossfade_ms = 1200       # Image cross-fade animation length
//! text_fade_ms = 800        # Title/description fade length
//!
//! [viewport]
//! narrow_below = 768        # Widths below this use the alternate (mobile) images
//! initial_width = 1280      # Assumed width before the first resize report
//!
//! [gallery]
//! visible_items = 6                 # Leading items preloaded one at a time
//! reload_on_viewport_change = true  # Restart the reveal when narrow ↔ wide flips
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::reveal::RevealOptions;
use crate::sequencer::SequencerTiming;
use crate::viewport::ViewportObserver;
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
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Hero slideshow timing.
    pub hero: HeroConfig,
    /// Viewport classification.
    pub viewport: ViewportConfig,
    /// Gallery reveal behaviour.
    pub gallery: GalleryConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hero.commit_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "hero.commit_delay_ms must be non-zero".into(),
            ));
        }
        if self.hero.period_ms <= self.hero.commit_delay_ms {
            return Err(ConfigError::Validation(
                "hero.period_ms must be greater than hero.commit_delay_ms".into(),
            ));
        }
        if self.viewport.narrow_below == 0 {
            return Err(ConfigError::Validation(
                "viewport.narrow_below must be non-zero".into(),
            ));
        }
        if self.gallery.visible_items == 0 {
            return Err(ConfigError::Validation(
                "gallery.visible_items must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn sequencer_timing(&self) -> SequencerTiming {
        SequencerTiming {
            period: Duration::from_millis(self.hero.period_ms),
            commit_delay: Duration::from_millis(self.hero.commit_delay_ms),
            crossfade: Duration::from_millis(self.hero.crossfade_ms),
        }
    }

    pub fn reveal_options(&self) -> RevealOptions {
        RevealOptions {
            visible_items: self.gallery.visible_items,
            reload_on_viewport_change: self.gallery.reload_on_viewport_change,
        }
    }

    /// A viewport observer seeded with the configured initial width.
    pub fn viewport_observer(&self) -> ViewportObserver {
        ViewportObserver::new(self.viewport.initial_width, self.viewport.narrow_below)
    }
}

/// Hero slideshow timing, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeroConfig {
    pub period_ms: u64,
    pub commit_delay_ms: u64,
    /// Presentation only: the sequencer never waits on it.
    pub crossfade_ms: u64,
    /// Presentation only.
    pub text_fade_ms: u64,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            period_ms: 5000,
            commit_delay_ms: 1000,
            crossfade_ms: 1200,
            text_fade_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub narrow_below: u32,
    pub initial_width: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            narrow_below: crate::viewport::DEFAULT_NARROW_BELOW,
            initial_width: 1280,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub visible_items: usize,
    pub reload_on_viewport_change: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            visible_items: crate::reveal::DEFAULT_VISIBLE_ITEMS,
            reload_on_viewport_change: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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

/// Load `config.toml` from a site directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(site: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = site.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the site config: user values over stock defaults, validated.
pub fn load_config(site: &Path) -> Result<SiteConfig, ConfigError> {
    let config = resolve_config(stock_defaults_value(), load_raw_config(site)?)?;
    tracing::debug!(?config, "site config resolved");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Studio Reel Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.

# ---------------------------------------------------------------------------
# Hero slideshow
# ---------------------------------------------------------------------------
[hero]
# How long each slide stays on screen after it becomes current, in milliseconds.
period_ms = 5000

# Time from the start of the image cross-fade until the next slide becomes
# the current one. Must be smaller than period_ms.
commit_delay_ms = 1000

# Length of the image cross-fade animation. Purely visual.
crossfade_ms = 1200

# Length of the title/description fade. Purely visual.
text_fade_ms = 800

# ---------------------------------------------------------------------------
# Viewport
# ---------------------------------------------------------------------------
[viewport]
# Viewports narrower than this use each slide's alternate image.
narrow_below = 768

# Width assumed until the first resize is reported.
initial_width = 1280

# ---------------------------------------------------------------------------
# Gallery
# ---------------------------------------------------------------------------
[gallery]
# Number of leading gallery items preloaded, one at a time, on page load.
visible_items = 6

# Start the reveal over when the viewport flips between narrow and wide.
reload_on_viewport_change = true
"##
}
