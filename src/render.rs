//! HTML fragments for the hero and the gallery grid.
//!
//! Rendering is a pure function of a state snapshot: the same
//! [`SequencerState`] or [`RevealState`] always produces the same markup.
//! Animation is left to CSS, driven by the classes and custom properties
//! emitted here (`fading`, `text-fading`, `--crossfade`, `--period`).

use crate::reveal::RevealState;
use crate::sequencer::{SequencerState, SequencerTiming};
use crate::types::{GalleryItem, Slide, TitleParts};
use crate::viewport::ViewportClass;
use maud::{DOCTYPE, Markup, html};

/// Link target of the button shown once the gallery is fully loaded.
pub const PORTFOLIO_HREF: &str = "/portfolio";

/// Renders the hero section for one sequencer snapshot.
pub fn render_hero(
    slides: &[Slide],
    state: &SequencerState,
    class: ViewportClass,
    timing: &SequencerTiming,
) -> Markup {
    let current = slides.get(state.current_index).filter(|_| state.is_preloaded);
    let style = format!(
        "--crossfade: {}ms; --period: {}ms",
        timing.crossfade.as_millis(),
        timing.period.as_millis()
    );

    html! {
        section.hero data-phase=(state.phase().as_str()) data-viewport=(class.as_str()) style=(style) {
            @match current {
                None => {
                    div.hero-spinner role="status" aria-label="Loading" {}
                }
                Some(slide) => {
                    img.hero-image.current.fading[state.is_transitioning]
                        src=(slide.image_for(class).as_str()) alt="";
                    @if let Some(next) = &state.transition_image {
                        img.hero-image.next src=(next.as_str()) alt="";
                    }
                    div.hero-overlay {}
                    div.hero-content.text-fading[state.is_text_fading] data-slide=(state.current_index) {
                        h1 { (render_title(slide)) }
                        @if !slide.description.is_empty() {
                            p.hero-description { (slide.description) }
                        }
                    }
                    div.hero-progress data-slide=(state.current_index) {}
                }
            }
        }
    }
}

/// Title with the highlighted part wrapped in a span, or plain if the
/// highlight does not occur in the title.
pub fn render_title(slide: &Slide) -> Markup {
    match slide.title_parts() {
        TitleParts::Emphasized {
            before,
            highlight,
            after,
        } => html! {
            (before) span.highlight { (highlight) } (after)
        },
        TitleParts::Plain(title) => html! { (title) },
    }
}

/// Renders the tracked gallery items for one reveal snapshot.
pub fn render_gallery(items: &[GalleryItem], state: &RevealState) -> Markup {
    html! {
        section.portfolio {
            div.gallery-grid {
                @for (position, item) in items.iter().take(state.visible()).enumerate() {
                    @let loaded = state.is_loaded(position);
                    figure.gallery-item.loaded[loaded] data-position=(position) {
                        @if loaded {
                            img src=(item.image.as_str()) alt=(item.display_name)
                                decoding="async" loading="lazy";
                            div.sweep aria-hidden="true" {}
                            figcaption { (item.display_name) }
                        } @else {
                            div.placeholder aria-hidden="true" {}
                        }
                    }
                }
            }
            @if state.fully_loaded && state.visible() > 0 {
                a.view-more href=(PORTFOLIO_HREF) { "View Full Portfolio" }
            }
        }
    }
}

/// A standalone page wrapping rendered sections, for previews.
pub fn render_page(title: &str, sections: &[Markup]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                @for section in sections {
                    (section)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::{RevealOptions, RevealTracker};
    use crate::test_helpers::{ScriptedLoader, sample_gallery, sample_slides};
    use crate::types::ImageRef;
    use crate::viewport::ViewportSignal;
    use std::sync::Arc;

    fn cycling() -> SequencerState {
        SequencerState {
            is_preloaded: true,
            ..SequencerState::default()
        }
    }

    fn hero(state: &SequencerState, class: ViewportClass) -> String {
        render_hero(&sample_slides(3), state, class, &SequencerTiming::default()).into_string()
    }

    #[test]
    fn spinner_while_preloading() {
        let html = hero(&SequencerState::default(), ViewportClass::Wide);
        assert!(html.contains("hero-spinner"));
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"data-phase="preloading""#));
    }

    #[test]
    fn spinner_when_no_slides() {
        let html = render_hero(&[], &cycling(), ViewportClass::Wide, &SequencerTiming::default())
            .into_string();
        assert!(html.contains("hero-spinner"));
    }

    #[test]
    fn current_slide_uses_viewport_variant() {
        let wide = hero(&cycling(), ViewportClass::Wide);
        assert!(wide.contains(r#"src="hero/0.jpg""#));

        let narrow = hero(&cycling(), ViewportClass::Narrow);
        assert!(narrow.contains(r#"src="hero/0-mobile.jpg""#));
    }

    #[test]
    fn title_highlight_wrapped_in_span() {
        let html = hero(&cycling(), ViewportClass::Wide);
        assert!(html.contains(r#"<span class="highlight">Slide</span> 0"#));
    }

    #[test]
    fn missing_highlight_renders_plain_title() {
        let mut slides = sample_slides(1);
        slides[0].highlight = "Nowhere".to_string();
        let html = render_title(&slides[0]).into_string();
        assert_eq!(html, "Slide 0");
    }

    #[test]
    fn title_is_escaped() {
        let mut slides = sample_slides(1);
        slides[0].title = "Rings & <Vows>".to_string();
        slides[0].highlight = "Rings".to_string();
        let html = render_title(&slides[0]).into_string();
        assert!(html.contains("&amp; &lt;Vows&gt;"));
    }

    #[test]
    fn crossfade_renders_both_layers() {
        let state = SequencerState {
            is_text_fading: true,
            is_transitioning: true,
            transition_image: Some(ImageRef::from("hero/1.jpg")),
            ..cycling()
        };
        let html = hero(&state, ViewportClass::Wide);
        assert!(html.contains(r#"class="hero-image current fading""#));
        assert!(html.contains(r#"class="hero-image next" src="hero/1.jpg""#));
        assert!(html.contains("text-fading"));
        assert!(html.contains(r#"data-phase="crossfading""#));
    }

    #[test]
    fn timing_exposed_as_custom_properties() {
        let html = hero(&cycling(), ViewportClass::Wide);
        assert!(html.contains("--crossfade: 1200ms; --period: 5000ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn gallery_placeholders_until_loaded() {
        let loader = Arc::new(ScriptedLoader::new().delay_all(100));
        let items = sample_gallery(3);
        let handle = RevealTracker::new(items.clone(), RevealOptions::default())
            .spawn(loader, ViewportSignal::fixed(ViewportClass::Wide));

        let html = render_gallery(&items, &handle.state()).into_string();
        assert_eq!(html.matches("placeholder").count(), 3);
        assert!(!html.contains("view-more"));

        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        let html = render_gallery(&items, &handle.state()).into_string();
        assert_eq!(html.matches("placeholder").count(), 2);
        assert!(html.contains(r#"src="gallery/000.jpg" alt="Photo 0""#));
        assert!(html.contains("sweep"));
    }

    #[tokio::test(start_paused = true)]
    async fn view_more_once_fully_loaded() {
        let loader = Arc::new(ScriptedLoader::new());
        let items = sample_gallery(8);
        let mut handle = RevealTracker::new(items.clone(), RevealOptions::default())
            .spawn(loader, ViewportSignal::fixed(ViewportClass::Wide));
        assert!(handle.wait_fully_loaded().await);

        let html = render_gallery(&items, &handle.state()).into_string();
        assert!(html.contains(r#"href="/portfolio""#));
        assert_eq!(html.matches("<figure").count(), 6);
    }

    #[test]
    fn page_wraps_sections() {
        let page = render_page("Preview", &[html! { p { "hi" } }]).into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Preview</title>"));
    }
}
