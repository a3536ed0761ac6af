//! Gallery reveal tracking.
//!
//! The first few gallery items (six by default) are loaded strictly one after
//! another: item `i + 1` does not start until item `i` has settled. That keeps
//! at most one gallery image in flight at a time and makes the grid fill in
//! order, each tile swapping its placeholder for the real image as soon as its
//! own load settles.
//!
//! The tracker publishes a [`RevealState`] per "view instance". When the
//! viewport classification changes (and reloading is enabled) the instance is
//! recreated: flags reset to unloaded, `generation` increases and the pass
//! starts again from the first item. Within one generation a `true` flag never
//! goes back to `false`.

use crate::loader::{ImageLoader, preload_one};
use crate::types::GalleryItem;
use crate::viewport::ViewportSignal;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_VISIBLE_ITEMS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealOptions {
    /// How many leading gallery items are preloaded and tracked.
    pub visible_items: usize,
    /// Restart the pass when the viewport classification changes.
    pub reload_on_viewport_change: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            visible_items: DEFAULT_VISIBLE_ITEMS,
            reload_on_viewport_change: true,
        }
    }
}

/// Per-position load flags for the visible gallery items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealState {
    loaded: Vec<bool>,
    /// Set exactly once per generation, when the last visible item settles.
    pub fully_loaded: bool,
    /// Incremented each time the view instance is recreated.
    pub generation: u64,
}

impl RevealState {
    fn new(visible: usize, generation: u64) -> Self {
        Self {
            loaded: vec![false; visible],
            // Nothing to wait for.
            fully_loaded: visible == 0,
            generation,
        }
    }

    /// Whether the item at `position` has settled. Out-of-range positions
    /// are never loaded.
    pub fn is_loaded(&self, position: usize) -> bool {
        self.loaded.get(position).copied().unwrap_or(false)
    }

    pub fn loaded(&self) -> &[bool] {
        &self.loaded
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.iter().filter(|l| **l).count()
    }

    pub fn visible(&self) -> usize {
        self.loaded.len()
    }
}

/// A gallery ready to be revealed.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    items: Arc<[GalleryItem]>,
    options: RevealOptions,
}

impl RevealTracker {
    pub fn new(items: Vec<GalleryItem>, options: RevealOptions) -> Self {
        Self {
            items: items.into(),
            options,
        }
    }

    fn visible_count(&self) -> usize {
        self.options.visible_items.min(self.items.len())
    }

    /// Start tracking on the current tokio runtime.
    pub fn spawn<L: ImageLoader>(self, loader: Arc<L>, viewport: ViewportSignal) -> RevealHandle {
        let visible = self.visible_count();
        let (tx, rx) = watch::channel(RevealState::new(visible, 0));
        let cancelled = Arc::new(AtomicBool::new(false));
        let run = Run {
            items: Arc::clone(&self.items),
            visible,
            reload_on_viewport_change: self.options.reload_on_viewport_change,
            loader,
            viewport,
            tx,
            cancelled: Arc::clone(&cancelled),
        };
        let task = tokio::spawn(run.drive());
        RevealHandle {
            items: self.items,
            visible,
            state: rx,
            task: Some(task),
            cancelled,
        }
    }
}

/// Read access to a running tracker, plus teardown. Dropping tears down.
#[derive(Debug)]
pub struct RevealHandle {
    items: Arc<[GalleryItem]>,
    visible: usize,
    state: watch::Receiver<RevealState>,
    task: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl RevealHandle {
    pub fn state(&self) -> RevealState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RevealState> {
        self.state.clone()
    }

    /// The tracked items, in display order.
    pub fn visible_items(&self) -> &[GalleryItem] {
        &self.items[..self.visible]
    }

    /// Wait for the current generation to finish loading.
    ///
    /// Returns `false` if the tracker stopped before that happened.
    pub async fn wait_fully_loaded(&mut self) -> bool {
        self.state.wait_for(|s| s.fully_loaded).await.is_ok()
    }

    pub fn teardown(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("gallery reveal tracker torn down");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct Run<L> {
    items: Arc<[GalleryItem]>,
    visible: usize,
    reload_on_viewport_change: bool,
    loader: Arc<L>,
    viewport: ViewportSignal,
    tx: watch::Sender<RevealState>,
    cancelled: Arc<AtomicBool>,
}

impl<L: ImageLoader> Run<L> {
    async fn drive(self) {
        let Run {
            items,
            visible,
            reload_on_viewport_change,
            loader,
            mut viewport,
            tx,
            cancelled,
        } = self;
        let visible_items = &items[..visible];
        let mut watching = reload_on_viewport_change;

        loop {
            let restarted = {
                let pass = load_in_order(&*loader, visible_items, &tx, &cancelled);
                tokio::pin!(pass);
                loop {
                    tokio::select! {
                        () = &mut pass => break false,
                        change = viewport.changed(), if watching => match change {
                            Some(_) => break true,
                            None => watching = false,
                        },
                    }
                }
            };

            if !restarted {
                if !watching {
                    return;
                }
                // Pass complete; idle until the view is recreated.
                if viewport.changed().await.is_none() {
                    return;
                }
            }

            if cancelled.load(Ordering::Acquire) {
                return;
            }
            tx.send_modify(|state| *state = RevealState::new(visible, state.generation + 1));
            tracing::debug!(
                class = viewport.current_classification().as_str(),
                "viewport changed, restarting gallery reveal"
            );
        }
    }
}

/// Load `items` one at a time, marking each position as it settles.
async fn load_in_order<L: ImageLoader>(
    loader: &L,
    items: &[GalleryItem],
    tx: &watch::Sender<RevealState>,
    cancelled: &AtomicBool,
) {
    for (position, item) in items.iter().enumerate() {
        preload_one(loader, &item.image).await;
        if cancelled.load(Ordering::Acquire) {
            return;
        }
        let last = position + 1 == items.len();
        tx.send_modify(|state| {
            state.loaded[position] = true;
            if last {
                state.fully_loaded = true;
            }
        });
        tracing::trace!(position, name = %item.display_name, "gallery item revealed");
    }
    if !items.is_empty() {
        tracing::debug!(items = items.len(), "gallery fully loaded");
    }
}
