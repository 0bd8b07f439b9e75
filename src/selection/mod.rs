//! Selection State
//!
//! Which lake is currently active (marker clicked, detail view open).
//! Subscribers get a `watch` receiver and re-render on change.
//!
//! Notifications are keyed on value equality by lake id: selecting the lake
//! that is already selected does not notify. Going through `None` first
//! (see [`SelectionState::reselect`]) always produces two notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::catalog::LakeRecord;

pub type Selection = Option<Arc<LakeRecord>>;

// == Selection State ==
#[derive(Debug)]
pub struct SelectionState {
    tx: watch::Sender<Selection>,
    notifications: AtomicU64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            notifications: AtomicU64::new(0),
        }
    }

    /// Sets the active lake. Returns whether subscribers were notified.
    pub fn select(&self, lake: Selection) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            let same = match (current.as_ref(), lake.as_ref()) {
                (None, None) => true,
                (Some(a), Some(b)) => a.id == b.id,
                _ => false,
            };
            if !same {
                *current = lake;
            }
            !same
        });

        if changed {
            self.notifications.fetch_add(1, Ordering::SeqCst);
            debug!(
                "Selection changed to {}",
                self.current()
                    .map(|l| l.id.clone())
                    .unwrap_or_else(|| "none".to_string())
            );
        }
        changed
    }

    pub fn deselect(&self) -> bool {
        self.select(None)
    }

    /// Clears the selection, lets subscribers observe the empty state, then
    /// selects `lake`. Used when the detail view must unmount and remount
    /// even for the same lake.
    pub async fn reselect(&self, lake: Arc<LakeRecord>) {
        self.deselect();
        tokio::task::yield_now().await;
        self.select(Some(lake));
    }

    pub fn current(&self) -> Selection {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }

    /// Total notifications sent since creation.
    pub fn notification_count(&self) -> u64 {
        self.notifications.load(Ordering::SeqCst)
    }

    /// Id and name of the selected lake, handed to the issue report form.
    pub fn report_target(&self) -> Option<(String, String)> {
        self.current().map(|lake| (lake.id.clone(), lake.name.clone()))
    }
}
