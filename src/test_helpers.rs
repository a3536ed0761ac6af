//! Shared test utilities for the studio-reel test suite.
//!
//! Provides a scripted in-memory [`ImageLoader`] with per-image latency and
//! failures, synthetic slide/gallery lists, and helpers that write small real
//! image files and whole site directories into a temp dir.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let loader = Arc::new(ScriptedLoader::new().delay("hero/1.jpg", 200).fail("hero/2.jpg"));
//! let handle = SlideSequencer::new(sample_slides(4), SequencerTiming::default())
//!     .spawn(loader.clone(), ViewportSignal::fixed(ViewportClass::Wide));
//! ```

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::loader::{ImageLoader, Settlement};
use crate::types::{GalleryItem, ImageRef, Slide};

// =========================================================================
// Scripted loader
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Started(String),
    Settled(String),
}

/// Loader whose latency and outcome are scripted per image reference.
///
/// Unscripted images settle successfully with the default delay (zero unless
/// set with [`delay_all`](Self::delay_all)). Every start and settlement is
/// recorded in order.
#[derive(Debug, Default)]
pub struct ScriptedLoader {
    delays: HashMap<String, u64>,
    default_delay: u64,
    failures: HashSet<String>,
    events: Arc<Mutex<Vec<LoadEvent>>>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, image: &str, millis: u64) -> Self {
        self.delays.insert(image.to_string(), millis);
        self
    }

    pub fn delay_all(mut self, millis: u64) -> Self {
        self.default_delay = millis;
        self
    }

    pub fn fail(mut self, image: &str) -> Self {
        self.failures.insert(image.to_string());
        self
    }

    pub fn events(&self) -> Vec<LoadEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn started_order(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LoadEvent::Started(name) => Some(name),
                LoadEvent::Settled(_) => None,
            })
            .collect()
    }

    pub fn settled_order(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LoadEvent::Settled(name) => Some(name),
                LoadEvent::Started(_) => None,
            })
            .collect()
    }
}

impl ImageLoader for ScriptedLoader {
    fn load(&self, image: &ImageRef) -> impl Future<Output = Settlement> + Send {
        let name = image.as_str().to_string();
        let delay = self
            .delays
            .get(&name)
            .copied()
            .unwrap_or(self.default_delay);
        let fails = self.failures.contains(&name);
        let events = Arc::clone(&self.events);
        async move {
            events.lock().unwrap().push(LoadEvent::Started(name.clone()));
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            events.lock().unwrap().push(LoadEvent::Settled(name));
            if fails {
                Settlement::Failed
            } else {
                Settlement::Loaded
            }
        }
    }
}

// =========================================================================
// Synthetic content
// =========================================================================

/// `n` slides: `hero/{i}.jpg` wide, `hero/{i}-mobile.jpg` narrow, titled `Slide {i}`.
pub fn sample_slides(n: usize) -> Vec<Slide> {
    (0..n)
        .map(|i| Slide {
            primary: ImageRef::new(format!("hero/{i}.jpg")),
            alternate: ImageRef::new(format!("hero/{i}-mobile.jpg")),
            title: format!("Slide {i}"),
            highlight: "Slide".to_string(),
            description: format!("Description {i}"),
        })
        .collect()
}

/// `n` gallery items: `gallery/000.jpg`, `gallery/001.jpg`, ...
pub fn sample_gallery(n: usize) -> Vec<GalleryItem> {
    (0..n)
        .map(|i| GalleryItem {
            image: ImageRef::new(format!("gallery/{i:03}.jpg")),
            display_name: format!("Photo {i}"),
        })
        .collect()
}

// =========================================================================
// Files on disk
// =========================================================================

/// Write a small valid PNG, creating parent directories.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Build a site directory: two slides with both variants on disk, a
/// `config.toml`, and the given gallery file names under `gallery/`.
pub fn setup_site(gallery: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    for name in ["hero1.png", "hero1-mobile.png", "hero2.png", "hero2-mobile.png"] {
        write_test_png(&root.join("hero").join(name), 4, 4);
    }
    std::fs::write(
        root.join("slides.toml"),
        r#"
[[slides]]
primary = "hero/hero1.png"
alternate = "hero/hero1-mobile.png"
title = "Where Love Becomes Art"
highlight = "Love"
description = "Every glance, every smile."

[[slides]]
primary = "hero/hero2.png"
alternate = "hero/hero2-mobile.png"
title = "Crafting Timeless Wedding Tales"
highlight = "Timeless"
description = "Moments that live forever."
"#,
    )
    .unwrap();
    std::fs::write(
        root.join("config.toml"),
        "[hero]\nperiod_ms = 4000\n",
    )
    .unwrap();
    for name in gallery {
        write_test_png(&root.join("gallery").join(name), 4, 4);
    }
    tmp
}
