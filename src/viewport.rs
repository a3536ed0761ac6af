//! Viewport width classification.
//!
//! The classification is a single process-wide value with exactly one writer,
//! the [`ViewportObserver`] fed by resize reports. Everything else holds a
//! [`ViewportSignal`], which can query the current class and wait for changes
//! but has no way to write it.
//!
//! Only classification changes are broadcast: resizing from 1280 to 1024 wide
//! wakes nobody, crossing the narrow threshold does.

use serde::Serialize;
use tokio::sync::watch;

/// Default width below which a viewport counts as narrow.
pub const DEFAULT_NARROW_BELOW: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Narrow,
    Wide,
}

impl ViewportClass {
    /// Widths strictly below `narrow_below` are narrow.
    pub fn classify(width: u32, narrow_below: u32) -> Self {
        if width < narrow_below {
            Self::Narrow
        } else {
            Self::Wide
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::Wide => "wide",
        }
    }
}

/// The single writer of the viewport classification.
#[derive(Debug)]
pub struct ViewportObserver {
    tx: watch::Sender<ViewportClass>,
    narrow_below: u32,
}

impl ViewportObserver {
    pub fn new(initial_width: u32, narrow_below: u32) -> Self {
        let (tx, _) = watch::channel(ViewportClass::classify(initial_width, narrow_below));
        Self { tx, narrow_below }
    }

    /// Record a new viewport width. Returns `true` if the classification changed.
    pub fn report_width(&self, width: u32) -> bool {
        let class = ViewportClass::classify(width, self.narrow_below);
        let changed = self.tx.send_if_modified(|current| {
            if *current == class {
                false
            } else {
                *current = class;
                true
            }
        });
        if changed {
            tracing::debug!(width, class = class.as_str(), "viewport classification changed");
        }
        changed
    }

    pub fn classification(&self) -> ViewportClass {
        *self.tx.borrow()
    }

    /// A read-only handle on the classification.
    pub fn signal(&self) -> ViewportSignal {
        ViewportSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of the viewport classification.
#[derive(Debug, Clone)]
pub struct ViewportSignal {
    rx: watch::Receiver<ViewportClass>,
}

impl ViewportSignal {
    /// A signal pinned to one classification that never changes.
    pub fn fixed(class: ViewportClass) -> Self {
        let (_tx, rx) = watch::channel(class);
        Self { rx }
    }

    pub fn current_classification(&self) -> ViewportClass {
        *self.rx.borrow()
    }

    /// Wait for the next classification change.
    ///
    /// Returns `None` once the observer is gone, after which the value can
    /// never change again.
    pub async fn changed(&mut self) -> Option<ViewportClass> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_threshold_is_exclusive() {
        assert_eq!(ViewportClass::classify(767, 768), ViewportClass::Narrow);
        assert_eq!(ViewportClass::classify(768, 768), ViewportClass::Wide);
        assert_eq!(ViewportClass::classify(0, 768), ViewportClass::Narrow);
    }

    #[test]
    fn report_width_only_signals_class_changes() {
        let observer = ViewportObserver::new(1280, 768);
        assert!(!observer.report_width(1024));
        assert!(observer.report_width(400));
        assert!(!observer.report_width(320));
        assert_eq!(observer.classification(), ViewportClass::Narrow);
    }

    #[tokio::test]
    async fn signal_sees_changes() {
        let observer = ViewportObserver::new(1280, 768);
        let mut signal = observer.signal();
        assert_eq!(signal.current_classification(), ViewportClass::Wide);

        observer.report_width(500);
        assert_eq!(signal.changed().await, Some(ViewportClass::Narrow));
        assert_eq!(signal.current_classification(), ViewportClass::Narrow);
    }

    #[tokio::test]
    async fn signal_ends_when_observer_dropped() {
        let observer = ViewportObserver::new(1280, 768);
        let mut signal = observer.signal();
        drop(observer);
        assert_eq!(signal.changed().await, None);
        assert_eq!(signal.current_classification(), ViewportClass::Wide);
    }

    #[tokio::test]
    async fn fixed_signal_never_changes() {
        let mut signal = ViewportSignal::fixed(ViewportClass::Narrow);
        assert_eq!(signal.current_classification(), ViewportClass::Narrow);
        assert_eq!(signal.changed().await, None);
    }
}
