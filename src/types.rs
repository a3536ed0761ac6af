//! Shared content types consumed by the sequencer, the reveal tracker and the
//! renderer.
//!
//! All of these are immutable once loaded: the static content provider builds
//! them at startup and the core only ever reads them.

use crate::viewport::ViewportClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an image, relative to the site root (e.g. `hero/hero1.jpg`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// One hero slide.
///
/// `alternate` is the variant shown on narrow viewports. `highlight` names the
/// part of `title` rendered with emphasis; see [`Slide::title_parts`] for what
/// happens when it is not actually part of the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Slide {
    pub primary: ImageRef,
    pub alternate: ImageRef,
    pub title: String,
    #[serde(default)]
    pub highlight: String,
    #[serde(default)]
    pub description: String,
}

/// A slide title split around its emphasized substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleParts<'a> {
    Emphasized {
        before: &'a str,
        highlight: &'a str,
        after: &'a str,
    },
    /// Highlight missing or not found: the whole title, unstyled.
    Plain(&'a str),
}

impl Slide {
    /// Image variant for the given viewport classification.
    pub fn image_for(&self, class: ViewportClass) -> &ImageRef {
        match class {
            ViewportClass::Narrow => &self.alternate,
            ViewportClass::Wide => &self.primary,
        }
    }

    /// Both image variants, primary first.
    pub fn images(&self) -> [&ImageRef; 2] {
        [&self.primary, &self.alternate]
    }

    /// Split the title on the first occurrence of `highlight`.
    ///
    /// - `"Where Love Becomes Art"` / `"Love"` → before=`"Where "`, after=`" Becomes Art"`
    /// - `"Every Frame"` / `"Art"` → `Plain("Every Frame")`
    /// - `"Every Frame"` / `""` → `Plain("Every Frame")`
    pub fn title_parts(&self) -> TitleParts<'_> {
        if self.highlight.is_empty() {
            return TitleParts::Plain(&self.title);
        }
        match self.title.find(&self.highlight) {
            Some(start) => {
                let end = start + self.highlight.len();
                TitleParts::Emphasized {
                    before: &self.title[..start],
                    highlight: &self.title[start..end],
                    after: &self.title[end..],
                }
            }
            None => TitleParts::Plain(&self.title),
        }
    }
}

/// A gallery entry. Identity is its position in the gallery list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub image: ImageRef,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(title: &str, highlight: &str) -> Slide {
        Slide {
            primary: "hero/a.jpg".into(),
            alternate: "hero/a-mobile.jpg".into(),
            title: title.to_string(),
            highlight: highlight.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn title_split_around_highlight() {
        let s = slide("Where Love Becomes Art", "Love");
        assert_eq!(
            s.title_parts(),
            TitleParts::Emphasized {
                before: "Where ",
                highlight: "Love",
                after: " Becomes Art",
            }
        );
    }

    #[test]
    fn title_split_uses_first_occurrence() {
        let s = slide("Art for Art", "Art");
        assert_eq!(
            s.title_parts(),
            TitleParts::Emphasized {
                before: "",
                highlight: "Art",
                after: " for Art",
            }
        );
    }

    #[test]
    fn highlight_at_end_leaves_empty_tail() {
        let s = slide("Every Frame, a Work of Art", "Art");
        match s.title_parts() {
            TitleParts::Emphasized { after, .. } => assert_eq!(after, ""),
            other => panic!("expected emphasis, got {other:?}"),
        }
    }

    #[test]
    fn missing_highlight_degrades_to_plain() {
        let s = slide("Every Frame", "Memories");
        assert_eq!(s.title_parts(), TitleParts::Plain("Every Frame"));
    }

    #[test]
    fn empty_highlight_is_plain() {
        let s = slide("Every Frame", "");
        assert_eq!(s.title_parts(), TitleParts::Plain("Every Frame"));
    }

    #[test]
    fn highlight_match_is_case_sensitive() {
        let s = slide("Where love Becomes Art", "Love");
        assert_eq!(s.title_parts(), TitleParts::Plain("Where love Becomes Art"));
    }

    #[test]
    fn image_variant_follows_classification() {
        let s = slide("t", "");
        assert_eq!(s.image_for(ViewportClass::Wide).as_str(), "hero/a.jpg");
        assert_eq!(
            s.image_for(ViewportClass::Narrow).as_str(),
            "hero/a-mobile.jpg"
        );
    }

    #[test]
    fn slide_parses_from_toml() {
        let s: Slide = toml::from_str(
            r#"
primary = "hero/1.jpg"
alternate = "hero/1-mobile.jpg"
title = "Crafting Timeless Wedding Tales"
highlight = "Timeless"
"#,
        )
        .unwrap();
        assert_eq!(s.primary.as_str(), "hero/1.jpg");
        assert_eq!(s.description, "");
    }
}
