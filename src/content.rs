//! Static site content: hero slides, gallery items and config.
//!
//! ## Directory Structure
//!
//! ```text
//! site/
//! ├── config.toml              # Settings (optional, see `config`)
//! ├── slides.toml              # Hero slides (optional)
//! ├── hero/                    # Slide images, referenced from slides.toml
//! │   ├── hero1.jpg
//! │   └── hero1-mobile.jpg
//! └── gallery/                 # Gallery images (optional)
//!     ├── 010-Golden-Hour.jpg  # Ordered by number prefix
//!     ├── 020-First-Dance.jpg
//!     └── candid.jpg           # Unnumbered: after numbered items
//! ```
//!
//! `slides.toml` is a list of `[[slides]]` tables:
//!
//! ```toml
//! [[slides]]
//! primary = "hero/hero1.jpg"
//! alternate = "hero/hero1-mobile.jpg"
//! title = "Where Love Becomes Art"
//! highlight = "Love"
//! description = "Every glance, every smile, every heartbeat."
//! ```
//!
//! Loading never touches image contents. Problems that should not stop a
//! site from running (a highlight that is not in its title, a slide image that
//! does not exist) are reported by [`check_content`] as warnings.

use crate::config::{self, SiteConfig};
use crate::naming::{GalleryName, gallery_order, parse_gallery_name};
use crate::types::{GalleryItem, ImageRef, Slide, TitleParts};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image extensions picked up from the gallery directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

pub const SLIDES_FILE: &str = "slides.toml";
pub const GALLERY_DIR: &str = "gallery";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid {}: {source}", path.display())]
    Slides {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Duplicate gallery number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
}

/// Everything the core needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct SiteContent {
    pub slides: Vec<Slide>,
    pub gallery: Vec<GalleryItem>,
    pub config: SiteConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlidesFile {
    #[serde(default)]
    slides: Vec<Slide>,
}

/// Load slides, gallery and config from a site directory.
pub fn load_site(root: &Path) -> Result<SiteContent, ContentError> {
    let config = config::load_config(root)?;
    let slides = load_slides(root)?;
    let gallery = scan_gallery(root)?;
    tracing::debug!(
        slides = slides.len(),
        gallery = gallery.len(),
        "site content loaded"
    );
    Ok(SiteContent {
        slides,
        gallery,
        config,
    })
}

fn load_slides(root: &Path) -> Result<Vec<Slide>, ContentError> {
    let path = root.join(SLIDES_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)?;
    let file: SlidesFile =
        toml::from_str(&content).map_err(|source| ContentError::Slides { path, source })?;
    Ok(file.slides)
}

fn scan_gallery(root: &Path) -> Result<Vec<GalleryItem>, ContentError> {
    let dir = root.join(GALLERY_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<(GalleryName, String)> = Vec::new();
    let mut numbers = BTreeSet::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if !is_image(&path) {
            continue;
        }
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = parse_gallery_name(&stem);
        if let Some(number) = name.number {
            if !numbers.insert(number) {
                return Err(ContentError::DuplicateNumber(number, dir));
            }
        }
        entries.push((name, file_name));
    }

    entries.sort_by(gallery_order);
    Ok(entries
        .into_iter()
        .map(|(name, file_name)| GalleryItem {
            display_name: name.display_name(&file_name),
            image: ImageRef::new(format!("{GALLERY_DIR}/{file_name}")),
        })
        .collect())
}

fn is_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// A content problem that does not prevent the site from running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentWarning {
    /// The title renders unstyled.
    HighlightNotInTitle { slide: usize, highlight: String },
    EmptyTitle { slide: usize },
    /// The image will settle as failed every time it is loaded.
    MissingImage { image: ImageRef },
}

impl fmt::Display for ContentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighlightNotInTitle { slide, highlight } => write!(
                f,
                "slide {}: highlight \"{highlight}\" is not part of the title, title shown unstyled",
                slide + 1
            ),
            Self::EmptyTitle { slide } => write!(f, "slide {}: empty title", slide + 1),
            Self::MissingImage { image } => write!(f, "missing image: {image}"),
        }
    }
}

/// Report non-fatal content problems, in slide order.
pub fn check_content(root: &Path, content: &SiteContent) -> Vec<ContentWarning> {
    let mut warnings = Vec::new();
    for (index, slide) in content.slides.iter().enumerate() {
        if slide.title.trim().is_empty() {
            warnings.push(ContentWarning::EmptyTitle { slide: index });
        } else if !slide.highlight.is_empty()
            && matches!(slide.title_parts(), TitleParts::Plain(_))
        {
            warnings.push(ContentWarning::HighlightNotInTitle {
                slide: index,
                highlight: slide.highlight.clone(),
            });
        }
        for image in slide.images() {
            if !root.join(image.as_str()).is_file() {
                warnings.push(ContentWarning::MissingImage {
                    image: image.clone(),
                });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{setup_site, write_test_png};
    use tempfile::TempDir;

    #[test]
    fn loads_fixture_site() {
        let tmp = setup_site(&["010-Golden-Hour.png", "020-First-Dance.png"]);
        let site = load_site(tmp.path()).unwrap();

        assert_eq!(site.slides.len(), 2);
        assert_eq!(site.slides[0].highlight, "Love");
        assert_eq!(site.config.hero.period_ms, 4000);
        let names: Vec<&str> = site.gallery.iter().map(|g| g.display_name.as_str()).collect();
        assert_eq!(names, vec!["Golden Hour", "First Dance"]);
        assert_eq!(site.gallery[0].image.as_str(), "gallery/010-Golden-Hour.png");
    }

    #[test]
    fn gallery_sorted_by_number_then_name() {
        let tmp = setup_site(&["candid.png", "020-b.png", "003-a.png", "album.png"]);
        let site = load_site(tmp.path()).unwrap();
        let refs: Vec<&str> = site.gallery.iter().map(|g| g.image.as_str()).collect();
        assert_eq!(
            refs,
            vec![
                "gallery/003-a.png",
                "gallery/020-b.png",
                "gallery/album.png",
                "gallery/candid.png"
            ]
        );
    }

    #[test]
    fn gallery_skips_non_images_and_hidden_files() {
        let tmp = setup_site(&["001-a.png"]);
        let gallery = tmp.path().join(GALLERY_DIR);
        fs::write(gallery.join("notes.txt"), "hello").unwrap();
        write_test_png(&gallery.join(".hidden.png"), 2, 2);
        fs::create_dir_all(gallery.join("002-subdir.png")).unwrap();

        let site = load_site(tmp.path()).unwrap();
        assert_eq!(site.gallery.len(), 1);
    }

    #[test]
    fn number_only_gallery_file_uses_file_name() {
        let tmp = setup_site(&["005.png"]);
        let site = load_site(tmp.path()).unwrap();
        assert_eq!(site.gallery[0].display_name, "005.png");
    }

    #[test]
    fn duplicate_gallery_number_is_error() {
        let tmp = setup_site(&["001-first.png", "001-second.png"]);
        let result = load_site(tmp.path());
        assert!(matches!(result, Err(ContentError::DuplicateNumber(1, _))));
    }

    #[test]
    fn empty_site_has_no_content() {
        let tmp = TempDir::new().unwrap();
        let site = load_site(tmp.path()).unwrap();
        assert!(site.slides.is_empty());
        assert!(site.gallery.is_empty());
        assert_eq!(site.config, SiteConfig::default());
    }

    #[test]
    fn malformed_slides_file_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SLIDES_FILE), "[[slides]]\ntitle = \"no images\"\n").unwrap();
        let result = load_site(tmp.path());
        assert!(matches!(result, Err(ContentError::Slides { .. })));
    }

    #[test]
    fn invalid_config_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[hero]\ncommit_delay_ms = 0\n").unwrap();
        let result = load_site(tmp.path());
        assert!(matches!(result, Err(ContentError::Config(_))));
    }

    #[test]
    fn check_clean_site_has_no_warnings() {
        let tmp = setup_site(&[]);
        let site = load_site(tmp.path()).unwrap();
        assert!(check_content(tmp.path(), &site).is_empty());
    }

    #[test]
    fn check_reports_highlight_and_missing_images() {
        let tmp = setup_site(&[]);
        let mut site = load_site(tmp.path()).unwrap();
        site.slides[0].highlight = "Memories".to_string();
        site.slides[1].alternate = ImageRef::from("hero/gone.png");

        let warnings = check_content(tmp.path(), &site);
        assert_eq!(
            warnings,
            vec![
                ContentWarning::HighlightNotInTitle {
                    slide: 0,
                    highlight: "Memories".to_string()
                },
                ContentWarning::MissingImage {
                    image: ImageRef::from("hero/gone.png")
                },
            ]
        );
        assert!(warnings[0].to_string().contains("slide 1"));
    }

    #[test]
    fn check_reports_empty_title() {
        let tmp = setup_site(&[]);
        let mut site = load_site(tmp.path()).unwrap();
        site.slides[1].title = "  ".to_string();
        let warnings = check_content(tmp.path(), &site);
        assert_eq!(warnings, vec![ContentWarning::EmptyTitle { slide: 1 }]);
    }
}
