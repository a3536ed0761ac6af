//! Image loading: turning image references into "settled" notifications.
//!
//! The [`ImageLoader`] trait is the seam to whatever actually displays images.
//! A load either succeeds or fails, and callers deliberately do not care which:
//! a broken image is a better outcome than a stalled slideshow, so failures are
//! reported as [`Settlement::Failed`] and never as errors. There are no retries
//! and no caching here; if the display environment caches, that is its business.
//!
//! The production implementation is [`FsImageLoader`], which fully decodes
//! files under a site root with the `image` crate on the blocking pool.

use crate::types::ImageRef;
use futures_util::stream::{FuturesUnordered, StreamExt};
use image::ImageReader;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Outcome of a single load. Both variants mean "settled".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Loaded,
    Failed,
}

impl Settlement {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Something that can bring an image into a displayable state.
pub trait ImageLoader: Send + Sync + 'static {
    /// Start loading `image` and resolve once it has settled.
    fn load(&self, image: &ImageRef) -> impl Future<Output = Settlement> + Send;
}

/// Totals from a [`preload_all`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub settled: usize,
    pub failed: usize,
}

/// Load a single image, resolving when it has settled.
pub async fn preload_one<L: ImageLoader>(loader: &L, image: &ImageRef) -> Settlement {
    let settlement = loader.load(image).await;
    if settlement.is_failure() {
        tracing::warn!(image = %image, "image failed to load, continuing");
    }
    settlement
}

/// Load every image concurrently, resolving once all of them have settled.
///
/// Settlement order is whatever the loader produces; completion is decided by
/// counting, not by order. An empty input completes immediately.
pub async fn preload_all<L: ImageLoader>(loader: &L, images: &[ImageRef]) -> PreloadReport {
    let mut pending: FuturesUnordered<_> = images
        .iter()
        .map(move |image| async move { (image, loader.load(image).await) })
        .collect();

    let mut report = PreloadReport::default();
    while let Some((image, settlement)) = pending.next().await {
        report.settled += 1;
        if settlement.is_failure() {
            report.failed += 1;
            tracing::warn!(image = %image, "image failed to load, continuing");
        }
        tracing::trace!(settled = report.settled, total = images.len(), "preload progress");
    }
    debug_assert_eq!(report.settled, images.len());
    report
}

/// Loads images from disk relative to a site root.
///
/// "Loaded" means the file was read and decoded successfully. A missing file
/// and a corrupt file are both just [`Settlement::Failed`].
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
    latency: Duration,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            latency: Duration::ZERO,
        }
    }

    /// Add a fixed delay before each load, to mimic a slow network.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, image: &ImageRef) -> PathBuf {
        self.root.join(image.as_str())
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, image: &ImageRef) -> impl Future<Output = Settlement> + Send {
        let path = self.resolve(image);
        let latency = self.latency;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            match tokio::task::spawn_blocking(move || decode(&path)).await {
                Ok(Ok(())) => Settlement::Loaded,
                Ok(Err(error)) => {
                    tracing::debug!(%error, "decode failed");
                    Settlement::Failed
                }
                Err(join_error) => {
                    tracing::debug!(%join_error, "decode task did not complete");
                    Settlement::Failed
                }
            }
        }
    }
}

/// Why a file could not be turned into pixels.
///
/// Only logged: to callers every failure is just [`Settlement::Failed`].
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Fully decode the image at `path`.
pub fn decode(path: &Path) -> Result<(), LoadError> {
    let io = |source: std::io::Error| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path).map_err(io)?.with_guessed_format().map_err(io)?;
    reader.decode().map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
