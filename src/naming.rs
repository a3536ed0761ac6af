//! Gallery file naming convention.
//!
//! Gallery images are ordered and captioned by their file name alone:
//! an optional numeric prefix (`NNN-`) sets the position, and the rest of the
//! stem becomes the caption with dashes turned into spaces.
//!
//! - `010-Golden-Hour.jpg` → position 10, "Golden Hour"
//! - `020.jpg`             → position 20, no caption of its own
//! - `candid-laughter.jpg` → unnumbered (sorted after numbered items), "candid laughter"

use std::cmp::Ordering;

/// Parsed gallery file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryName {
    /// Position prefix, if the stem has one.
    pub number: Option<u32>,
    /// Caption: the stem without its prefix, dashes converted to spaces.
    /// Empty for number-only stems.
    pub caption: String,
}

impl GalleryName {
    /// Caption to show, falling back to `fallback` when the stem had none.
    pub fn display_name(&self, fallback: &str) -> String {
        if self.caption.trim().is_empty() {
            fallback.to_string()
        } else {
            self.caption.clone()
        }
    }
}

/// Parse a gallery file stem (file name without extension).
pub fn parse_gallery_name(stem: &str) -> GalleryName {
    let (prefix, rest) = match stem.split_once('-') {
        Some((prefix, rest)) => (prefix, rest),
        None => (stem, ""),
    };
    match prefix.parse::<u32>() {
        Ok(number) => GalleryName {
            number: Some(number),
            caption: rest.replace('-', " "),
        },
        Err(_) => GalleryName {
            number: None,
            caption: stem.replace('-', " "),
        },
    }
}

/// Gallery order: numbered stems by number, then unnumbered stems by name.
pub fn gallery_order(a: &(GalleryName, String), b: &(GalleryName, String)) -> Ordering {
    match (a.0.number, b.0.number) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.cmp(&b.1)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    }
}
