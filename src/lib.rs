//! # Studio Reel
//!
//! The moving parts of a photography studio's landing page: a hero slideshow
//! that cross-fades between full-bleed photographs, and a gallery grid that
//! reveals its first few images one by one as they finish loading.
//!
//! # Architecture: Two Timed State Machines
//!
//! ```text
//! content/config ──► SlideSequencer ──► SequencerState ──┐
//!                         │                               ├──► render (Maud)
//!                    ImageLoader  ◄── ViewportSignal      │
//!                         │                               │
//! content/config ──► RevealTracker  ──► RevealState ──────┘
//! ```
//!
//! Each component runs as one tokio task that owns its state and publishes
//! snapshots on a `watch` channel. Readers never mutate; the only command a
//! reader can issue is teardown, which stops the task before its next step.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sequencer`] | Hero slideshow: preload every image, then cycle with a commit delay per transition |
//! | [`reveal`] | Gallery reveal: load the first N items strictly in order, restart on viewport class change |
//! | [`loader`] | `ImageLoader` seam, `preload_all` barrier, filesystem loader backed by the `image` crate |
//! | [`viewport`] | Narrow/wide classification with one writer and change notification |
//! | [`content`] | Loads `slides.toml` and the `gallery/` directory, reports content warnings |
//! | [`config`] | `config.toml` loading, stock defaults, merging and validation |
//! | [`naming`] | `NNN-name` file name convention for gallery ordering and captions |
//! | [`render`] | HTML fragments for the hero and the gallery from state snapshots |
//! | [`output`] | CLI output formatting: content inventory and the preview timeline |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//! | [`types`] | Slides, gallery items, image references |
//!
//! # Design Decisions
//!
//! ## Preload Everything Before Cycling
//!
//! The slideshow does not advance until every slide image (both viewport
//! variants) has settled. A failed image counts as settled, so one broken file
//! delays nothing beyond its own failure and never blocks the show.
//!
//! ## Commit After the Fade Starts
//!
//! A transition raises its flags immediately but moves the current index only
//! after a fixed commit delay. The new image is drawn over the old one during
//! that window, so the visible swap happens under the cross-fade.
//!
//! ## Teardown Is a Flag and an Abort
//!
//! A pending commit and the cycle timer live inside the same task. Teardown
//! raises a shared flag checked before every state change, then aborts the
//! task, so nothing lands after teardown even if the task is mid-step.

pub mod config;
pub mod content;
pub mod loader;
pub mod logging;
pub mod naming;
pub mod output;
pub mod render;
pub mod reveal;
pub mod sequencer;
pub mod types;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_helpers;
