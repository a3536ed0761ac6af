//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (slide, gallery item) is shown by positional index and title,
//! with file references as indented context lines underneath. The same index
//! appears in `check` and `preview` output, so a slide can be followed from
//! the inventory into the live timeline.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Slides
//! 001 Where Love Becomes Art
//!     Highlight: Love
//!     Images: hero/hero1.jpg, hero/hero1-mobile.jpg
//!
//! Gallery (8 items, first 6 preloaded)
//! 001 Golden Hour
//!     Source: gallery/010-Golden-Hour.jpg
//!
//! Timing
//!     period 5000ms, commit after 1000ms, narrow below 768
//! ```
//!
//! ## Preview
//!
//! ```text
//! [  0.412s] hero     cycling     001 Where Love Becomes Art
//! [  5.412s] hero     text fade   001 → 002
//! [  5.530s] hero     crossfade   001 → 002 (hero/hero1.jpg)
//! [  6.530s] hero     showing     002 Crafting Timeless Wedding Tales
//! [  0.090s] gallery  ■□□□□□ 1/6
//! [  3.000s] viewport narrow (width 500)
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return strings and do no I/O so they can be tested
//! directly; the binary prints them. [`PreviewEvent`] is the same timeline in
//! machine-readable form for `--json`.

use crate::content::{ContentWarning, SiteContent};
use crate::reveal::RevealState;
use crate::sequencer::{Phase, SequencerState};
use crate::types::{GalleryItem, Slide};
use crate::viewport::ViewportClass;
use serde::Serialize;
use std::time::Duration;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 0-based position as a 1-based, 3-digit zero-padded index.
fn format_index(position: usize) -> String {
    format!("{:0>3}", position + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn timestamp(elapsed: Duration) -> String {
    format!("[{:>8.3}s]", elapsed.as_secs_f64())
}

fn slide_title(slides: &[Slide], index: usize) -> &str {
    slides.get(index).map(|s| s.title.as_str()).unwrap_or("")
}

// ============================================================================
// Check
// ============================================================================

/// Inventory of a loaded site plus any warnings.
pub fn format_check_output(content: &SiteContent, warnings: &[ContentWarning]) -> Vec<String> {
    let mut lines = vec!["Slides".to_string()];
    if content.slides.is_empty() {
        lines.push(format!("{}(none, hero stays on its loading spinner)", indent(1)));
    }
    for (index, slide) in content.slides.iter().enumerate() {
        lines.push(format!("{} {}", format_index(index), slide.title));
        if !slide.highlight.is_empty() {
            lines.push(format!("{}Highlight: {}", indent(1), slide.highlight));
        }
        lines.push(format!(
            "{}Images: {}, {}",
            indent(1),
            slide.primary,
            slide.alternate
        ));
    }

    lines.push(String::new());
    let visible = content.config.gallery.visible_items.min(content.gallery.len());
    lines.push(format!(
        "Gallery ({} items, first {} preloaded)",
        content.gallery.len(),
        visible
    ));
    for (position, item) in content.gallery.iter().enumerate() {
        lines.push(format!("{} {}", format_index(position), item.display_name));
        lines.push(format!("{}Source: {}", indent(1), item.image));
    }

    lines.push(String::new());
    lines.push("Timing".to_string());
    let config = &content.config;
    lines.push(format!(
        "{}period {}ms, commit after {}ms, narrow below {}",
        indent(1),
        config.hero.period_ms,
        config.hero.commit_delay_ms,
        config.viewport.narrow_below
    ));

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("Warnings ({})", warnings.len()));
        for warning in warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    lines
}

pub fn print_check_output(content: &SiteContent, warnings: &[ContentWarning]) {
    for line in format_check_output(content, warnings) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview timeline
// ============================================================================

/// One line describing a sequencer snapshot.
pub fn format_sequencer_event(elapsed: Duration, state: &SequencerState, slides: &[Slide]) -> String {
    let next = if slides.is_empty() {
        0
    } else {
        (state.current_index + 1) % slides.len()
    };
    let detail = match state.phase() {
        Phase::Preloading => "preloading".to_string(),
        Phase::Showing if state.committed == 0 => format!(
            "cycling     {} {}",
            format_index(state.current_index),
            slide_title(slides, state.current_index)
        ),
        Phase::Showing => format!(
            "showing     {} {}",
            format_index(state.current_index),
            slide_title(slides, state.current_index)
        ),
        Phase::LoadingNext => format!(
            "text fade   {} → {}",
            format_index(state.current_index),
            format_index(next)
        ),
        Phase::Crossfading => format!(
            "crossfade   {} → {} ({})",
            format_index(state.current_index),
            format_index(next),
            state
                .transition_image
                .as_ref()
                .map(|i| i.as_str())
                .unwrap_or("")
        ),
    };
    format!("{} hero     {}", timestamp(elapsed), detail)
}

/// One line describing a reveal snapshot, as a filled/empty bar.
pub fn format_reveal_event(elapsed: Duration, state: &RevealState) -> String {
    let bar: String = state
        .loaded()
        .iter()
        .map(|loaded| if *loaded { '■' } else { '□' })
        .collect();
    let mut line = format!(
        "{} gallery  {} {}/{}",
        timestamp(elapsed),
        bar,
        state.loaded_count(),
        state.visible()
    );
    if state.generation > 0 {
        line.push_str(&format!(" (reload {})", state.generation));
    }
    if state.fully_loaded && state.visible() > 0 {
        line.push_str(" done");
    }
    line
}

pub fn format_viewport_event(elapsed: Duration, width: u32, class: ViewportClass) -> String {
    format!(
        "{} viewport {} (width {})",
        timestamp(elapsed),
        class.as_str(),
        width
    )
}

/// Machine-readable preview timeline entry (`--json`).
#[derive(Debug, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum PreviewEvent<'a> {
    Hero {
        t_ms: u128,
        phase: Phase,
        state: &'a SequencerState,
    },
    Gallery {
        t_ms: u128,
        state: &'a RevealState,
        items: &'a [GalleryItem],
    },
    Viewport {
        t_ms: u128,
        width: u32,
        class: ViewportClass,
    },
}
