//! Hero slideshow sequencing.
//!
//! A [`SlideSequencer`] runs as a single task that owns its [`SequencerState`]
//! and publishes every change on a `watch` channel. The presentation layer only
//! ever reads snapshots through the [`SequencerHandle`]; the only commands it
//! can issue are "spawn" and "tear down".
//!
//! # Lifecycle
//!
//! ```text
//! Preloading ──all 2×N variants settled──▶ Cycling ──teardown──▶ Torn down
//!     │                                                              ▲
//!     └────────────────────────── teardown ──────────────────────────┘
//! ```
//!
//! With zero slides there is nothing to preload towards, so the sequencer stays
//! in `Preloading` forever instead of dividing by zero.
//!
//! # One transition
//!
//! Each slide stays on screen for `period` after it is committed (the first
//! one from the end of preloading), then:
//!
//! 1. `is_text_fading = true`
//! 2. choose the next slide's image variant from the viewport classification
//!    as it is *now*; later resizes only affect later transitions
//! 3. load that image (a failed load still counts)
//! 4. `transition_image = Some(..)`, `is_transitioning = true` (the cross-fade
//!    itself is animated by the presentation layer)
//! 5. after `commit_delay`: advance `current_index`, clear every flag
//!
//! The dwell timer is armed again after every commit, so a slow load
//! lengthens the cycle instead of eating into the next slide's time on screen.
//! Transitions run inline in the task and can never overlap.
//!
//! # Teardown
//!
//! Both timers (the periodic trigger and the pending commit) live inside the
//! one task, so aborting it cancels them together. A shared flag is also
//! raised and checked after every suspension point, so no mutation can slip
//! through between the abort request and the task being dropped.

use crate::loader::{ImageLoader, preload_all, preload_one};
use crate::types::{ImageRef, Slide};
use crate::viewport::ViewportSignal;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_PERIOD: Duration = Duration::from_millis(5000);
pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_CROSSFADE: Duration = Duration::from_millis(1200);

/// Shortest accepted `period` and `commit_delay`.
pub const MIN_STEP: Duration = Duration::from_millis(1);

/// Timing of the slide cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTiming {
    /// Time a committed slide stays on screen before the next transition.
    pub period: Duration,
    /// Time from the cross-fade starting to the transition being committed.
    pub commit_delay: Duration,
    /// Cross-fade length. Informational: the presentation layer animates it.
    pub crossfade: Duration,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            commit_delay: DEFAULT_COMMIT_DELAY,
            crossfade: DEFAULT_CROSSFADE,
        }
    }
}

/// Snapshot of the sequencer, as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencerState {
    pub current_index: usize,
    pub is_preloaded: bool,
    pub transition_image: Option<ImageRef>,
    pub is_transitioning: bool,
    pub is_text_fading: bool,
    /// Number of committed transitions so far.
    pub committed: u64,
    /// When the current slide was committed (or cycling began), for the
    /// progress bar.
    #[serde(skip)]
    pub cycle_started: Option<Instant>,
}

impl Default for SequencerState {
    fn default() -> Self {
        Self {
            current_index: 0,
            is_preloaded: false,
            transition_image: None,
            is_transitioning: false,
            is_text_fading: false,
            committed: 0,
            cycle_started: None,
        }
    }
}

/// Coarse phase derived from the state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Preloading,
    /// Showing the current slide, waiting for the next trigger.
    Showing,
    /// Text fading out while the next image loads.
    LoadingNext,
    /// Image cross-fade running, commit pending.
    Crossfading,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preloading => "preloading",
            Self::Showing => "showing",
            Self::LoadingNext => "loading-next",
            Self::Crossfading => "crossfading",
        }
    }
}

impl SequencerState {
    pub fn phase(&self) -> Phase {
        if !self.is_preloaded {
            Phase::Preloading
        } else if self.is_transitioning {
            Phase::Crossfading
        } else if self.is_text_fading {
            Phase::LoadingNext
        } else {
            Phase::Showing
        }
    }

    pub fn in_flight(&self) -> bool {
        self.is_text_fading || self.is_transitioning
    }

    /// Fraction of the current period that has elapsed, clamped to `[0, 1]`.
    ///
    /// Always 0 before cycling starts.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, now: Instant, period: Duration) -> f32 {
        let Some(started) = self.cycle_started else {
            return 0.0;
        };
        if period.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started);
        (elapsed.as_secs_f64() / period.as_secs_f64()).clamp(0.0, 1.0) as f32
    }
}

/// A slideshow ready to be started.
#[derive(Debug, Clone)]
pub struct SlideSequencer {
    slides: Arc<[Slide]>,
    timing: SequencerTiming,
}

impl SlideSequencer {
    /// `period` and `commit_delay` below [`MIN_STEP`] are raised to it.
    pub fn new(slides: Vec<Slide>, timing: SequencerTiming) -> Self {
        let clamped = SequencerTiming {
            period: timing.period.max(MIN_STEP),
            commit_delay: timing.commit_delay.max(MIN_STEP),
            ..timing
        };
        if clamped != timing {
            tracing::warn!(?timing, "zero sequencer timing raised to {:?}", MIN_STEP);
        }
        Self {
            slides: slides.into(),
            timing: clamped,
        }
    }

    /// Start the sequencer on the current tokio runtime.
    ///
    /// Preloading begins immediately; cycling starts once it completes.
    pub fn spawn<L: ImageLoader>(self, loader: Arc<L>, viewport: ViewportSignal) -> SequencerHandle {
        let (tx, rx) = watch::channel(SequencerState::default());
        let cancelled = Arc::new(AtomicBool::new(false));
        let run = Run {
            slides: Arc::clone(&self.slides),
            timing: self.timing,
            loader,
            viewport,
            tx,
            cancelled: Arc::clone(&cancelled),
        };
        let task = tokio::spawn(run.drive());
        SequencerHandle {
            slides: self.slides,
            timing: self.timing,
            state: rx,
            task: Some(task),
            cancelled,
        }
    }
}

/// Read access to a running sequencer, plus teardown.
///
/// Dropping the handle tears the sequencer down.
#[derive(Debug)]
pub struct SequencerHandle {
    slides: Arc<[Slide]>,
    timing: SequencerTiming,
    state: watch::Receiver<SequencerState>,
    task: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl SequencerHandle {
    pub fn state(&self) -> SequencerState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SequencerState> {
        self.state.clone()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn timing(&self) -> SequencerTiming {
        self.timing
    }

    /// The slide currently on screen, or `None` when there are no slides.
    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.state.borrow().current_index)
    }

    /// Wait until preloading has finished.
    ///
    /// Returns `false` if it never will: no slides, or torn down first.
    pub async fn wait_until_preloaded(&mut self) -> bool {
        self.state.wait_for(|s| s.is_preloaded).await.is_ok()
    }

    /// Stop the sequencer. Cancels the cycle timer and any pending commit
    /// together; no state change is published afterwards. Idempotent.
    pub fn teardown(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(
                index = self.state.borrow().current_index,
                "slide sequencer torn down"
            );
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for SequencerHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Everything the sequencer task owns.
struct Run<L> {
    slides: Arc<[Slide]>,
    timing: SequencerTiming,
    loader: Arc<L>,
    viewport: ViewportSignal,
    tx: watch::Sender<SequencerState>,
    cancelled: Arc<AtomicBool>,
}

impl<L: ImageLoader> Run<L> {
    async fn drive(self) {
        if self.slides.is_empty() {
            tracing::debug!("no slides, sequencer stays in preloading");
            return;
        }

        let images: Vec<ImageRef> = self
            .slides
            .iter()
            .flat_map(|slide| slide.images())
            .cloned()
            .collect();
        let report = preload_all(&*self.loader, &images).await;
        let started = Instant::now();
        if !self.publish(|s| {
            s.is_preloaded = true;
            s.cycle_started = Some(started);
        }) {
            return;
        }
        tracing::info!(
            slides = self.slides.len(),
            images = report.settled,
            failed = report.failed,
            "hero images preloaded, cycling"
        );

        loop {
            tokio::time::sleep(self.timing.period).await;
            if self.is_cancelled() {
                return;
            }
            if !self.transition().await {
                return;
            }
        }
    }

    /// Run one transition to completion. Returns `false` if cancelled midway.
    async fn transition(&self) -> bool {
        let current = self.tx.borrow().current_index;
        let next = (current + 1) % self.slides.len();

        if !self.publish(|s| s.is_text_fading = true) {
            return false;
        }

        let class = self.viewport.current_classification();
        let image = self.slides[next].image_for(class).clone();
        tracing::debug!(from = current, to = next, image = %image, class = class.as_str(), "transition triggered");

        preload_one(&*self.loader, &image).await;
        if !self.publish(|s| {
            s.transition_image = Some(image);
            s.is_transitioning = true;
        }) {
            return false;
        }

        tokio::time::sleep(self.timing.commit_delay).await;
        let now = Instant::now();
        let committed = self.publish(|s| {
            s.cycle_started = Some(now);
            s.current_index = next;
            s.is_transitioning = false;
            s.transition_image = None;
            s.is_text_fading = false;
            s.committed += 1;
        });
        if committed {
            tracing::debug!(index = next, "transition committed");
        }
        committed
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Apply `change` unless torn down. Returns whether it was applied.
    fn publish(&self, change: impl FnOnce(&mut SequencerState)) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.tx.send_modify(change);
        true
    }
}
