use clap::{Parser, Subcommand};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use studio_reel::config;
use studio_reel::content::{self, SiteContent};
use studio_reel::loader::FsImageLoader;
use studio_reel::logging::{self, LogConfig, LogFormat};
use studio_reel::output::{self, PreviewEvent};
use studio_reel::render;
use studio_reel::reveal::{RevealState, RevealTracker};
use studio_reel::sequencer::{SequencerState, SlideSequencer};
use studio_reel::types::{GalleryItem, Slide};
use studio_reel::viewport::{ViewportClass, ViewportObserver};
use tokio::time::Instant;

#[derive(Parser)]
#[command(name = "studio-reel")]
#[command(about = "Hero slideshow and gallery reveal engine for a photography studio site")]
#[command(long_about = "\
Hero slideshow and gallery reveal engine for a photography studio site

The site directory holds everything the engine needs:

  site/
  ├── config.toml                  # Timing and responsive settings (optional)
  ├── slides.toml                  # [[slides]] with primary, alternate, title, highlight
  ├── hero/                        # Slide images referenced from slides.toml
  │   ├── hero1.jpg
  │   └── hero1-mobile.jpg         # Alternate shown below the narrow breakpoint
  └── gallery/                     # Gallery images, ordered by number prefix
      ├── 010-Golden-Hour.jpg      # Shown as \"Golden Hour\"
      └── 020-First-Dance.jpg

Every hero image is loaded before the slideshow starts cycling. The first
gallery items are loaded one at a time, in order, and revealed as they land.

Run 'studio-reel gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory
    #[arg(long, default_value = "site", global = true)]
    site: PathBuf,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the site and list slides, gallery items and warnings
    Check,
    /// Run the slideshow and gallery reveal, printing every state change
    Preview(PreviewArgs),
    /// Load everything, then print the hero and gallery HTML
    Render(RenderArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct PreviewArgs {
    /// How long to run before tearing down
    #[arg(long, default_value = "12", value_parser = parse_seconds)]
    seconds: Duration,

    /// Viewport width at start (defaults to viewport.initial_width)
    #[arg(long)]
    width: Option<u32>,

    /// Report a new viewport width at a point in time, e.g. 3.5:480
    #[arg(long = "resize-at", value_name = "SECONDS:WIDTH", value_parser = parse_resize)]
    resize_at: Vec<Resize>,

    /// Artificial delay added to every image load
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Print one JSON object per state change instead of text lines
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Viewport width to render for (defaults to viewport.initial_width)
    #[arg(long)]
    width: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Resize {
    at: Duration,
    width: u32,
}

/// Longest preview run, one day.
const MAX_PREVIEW_SECONDS: f64 = 86_400.0;

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("invalid seconds '{value}'"))?;
    if !(0.0..=MAX_PREVIEW_SECONDS).contains(&seconds) {
        return Err(format!(
            "seconds must be between 0 and {MAX_PREVIEW_SECONDS}, got '{value}'"
        ));
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn parse_resize(value: &str) -> Result<Resize, String> {
    let (seconds, width) = value
        .split_once(':')
        .ok_or_else(|| format!("expected SECONDS:WIDTH, got '{value}'"))?;
    let at = parse_seconds(seconds)?;
    let width: u32 = width.parse().map_err(|_| format!("invalid width '{width}'"))?;
    Ok(Resize { at, width })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format));

    match cli.command {
        Command::Check => {
            println!("==> Checking {}", cli.site.display());
            let site = content::load_site(&cli.site)?;
            let warnings = content::check_content(&cli.site, &site);
            for warning in &warnings {
                tracing::warn!(%warning, "content problem");
            }
            output::print_check_output(&site, &warnings);
            println!("==> Content is valid");
        }
        Command::Preview(args) => {
            let site = content::load_site(&cli.site)?;
            runtime()?.block_on(preview(&cli.site, site, args))?;
        }
        Command::Render(args) => {
            let site = content::load_site(&cli.site)?;
            let html = runtime()?.block_on(render_settled(&cli.site, site, args));
            println!("{}", html);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
}

/// Prints timeline entries as text or JSON lines.
struct Timeline<'a> {
    start: Instant,
    json: bool,
    slides: &'a [Slide],
}

impl Timeline<'_> {
    fn hero(&self, state: &SequencerState) -> serde_json::Result<()> {
        let elapsed = self.start.elapsed();
        if self.json {
            self.emit(&PreviewEvent::Hero {
                t_ms: elapsed.as_millis(),
                phase: state.phase(),
                state,
            })
        } else {
            println!("{}", output::format_sequencer_event(elapsed, state, self.slides));
            Ok(())
        }
    }

    fn gallery(&self, state: &RevealState, items: &[GalleryItem]) -> serde_json::Result<()> {
        let elapsed = self.start.elapsed();
        if self.json {
            self.emit(&PreviewEvent::Gallery {
                t_ms: elapsed.as_millis(),
                state,
                items,
            })
        } else {
            println!("{}", output::format_reveal_event(elapsed, state));
            Ok(())
        }
    }

    fn viewport(&self, width: u32, class: ViewportClass) -> serde_json::Result<()> {
        let elapsed = self.start.elapsed();
        if self.json {
            self.emit(&PreviewEvent::Viewport {
                t_ms: elapsed.as_millis(),
                width,
                class,
            })
        } else {
            println!("{}", output::format_viewport_event(elapsed, width, class));
            Ok(())
        }
    }

    fn emit(&self, event: &PreviewEvent<'_>) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string(event)?);
        Ok(())
    }
}

async fn preview(
    root: &Path,
    site: SiteContent,
    args: PreviewArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &site.config;
    let initial_width = args.width.unwrap_or(config.viewport.initial_width);
    let observer = ViewportObserver::new(initial_width, config.viewport.narrow_below);
    let loader = Arc::new(
        FsImageLoader::new(root).with_latency(Duration::from_millis(args.latency_ms)),
    );

    let mut hero = SlideSequencer::new(site.slides.clone(), config.sequencer_timing())
        .spawn(Arc::clone(&loader), observer.signal());
    let mut gallery = RevealTracker::new(site.gallery.clone(), config.reveal_options())
        .spawn(loader, observer.signal());
    let mut hero_rx = hero.subscribe();
    let mut gallery_rx = gallery.subscribe();

    let timeline = Timeline {
        start: Instant::now(),
        json: args.json,
        slides: &site.slides,
    };
    tracing::info!(
        slides = site.slides.len(),
        gallery = site.gallery.len(),
        seconds = args.seconds.as_secs_f64(),
        "preview started"
    );

    let mut resizes: Vec<Resize> = args.resize_at;
    resizes.sort_by_key(|r| r.at);
    let mut resizes: VecDeque<Resize> = resizes.into();

    timeline.viewport(initial_width, observer.classification())?;
    timeline.hero(&hero_rx.borrow_and_update())?;
    timeline.gallery(&gallery_rx.borrow_and_update(), gallery.visible_items())?;

    let deadline = tokio::time::sleep(args.seconds);
    tokio::pin!(deadline);
    let mut hero_live = true;
    let mut gallery_live = true;

    loop {
        let next_resize = resizes
            .front()
            .map(|r| timeline.start + r.at)
            .unwrap_or(timeline.start);
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::time::sleep_until(next_resize), if !resizes.is_empty() => {
                if let Some(resize) = resizes.pop_front() {
                    if observer.report_width(resize.width) {
                        timeline.viewport(resize.width, observer.classification())?;
                    }
                }
            }
            changed = hero_rx.changed(), if hero_live => match changed {
                Ok(()) => timeline.hero(&hero_rx.borrow_and_update())?,
                Err(_) => hero_live = false,
            },
            changed = gallery_rx.changed(), if gallery_live => match changed {
                Ok(()) => timeline.gallery(&gallery_rx.borrow_and_update(), gallery.visible_items())?,
                Err(_) => gallery_live = false,
            },
        }
    }

    hero.teardown();
    gallery.teardown();
    let hero_state = hero.state();
    let gallery_state = gallery.state();
    tracing::info!(
        commits = hero_state.committed,
        index = hero_state.current_index,
        revealed = gallery_state.loaded_count(),
        "preview finished"
    );
    Ok(())
}

async fn render_settled(root: &Path, site: SiteContent, args: RenderArgs) -> String {
    let config = &site.config;
    let observer = ViewportObserver::new(
        args.width.unwrap_or(config.viewport.initial_width),
        config.viewport.narrow_below,
    );
    let loader = Arc::new(FsImageLoader::new(root));
    let timing = config.sequencer_timing();

    let mut hero = SlideSequencer::new(site.slides.clone(), timing)
        .spawn(Arc::clone(&loader), observer.signal());
    let mut gallery = RevealTracker::new(site.gallery.clone(), config.reveal_options())
        .spawn(loader, observer.signal());

    if !hero.wait_until_preloaded().await {
        tracing::info!("no slides, rendering the loading state");
    }
    gallery.wait_fully_loaded().await;
    hero.teardown();
    gallery.teardown();

    let class = observer.classification();
    let sections = [
        render::render_hero(&site.slides, &hero.state(), class, &timing),
        render::render_gallery(gallery.visible_items(), &gallery.state()),
    ];
    render::render_page("Preview", &sections).into_string()
}
