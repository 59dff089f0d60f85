//! One interaction = load, apply one intent, save, build a view.

use crate::controller::{apply, Intent, Outcome};
use crate::error::QueueError;
use crate::settings::Settings;
use crate::store::{FileStore, StateStore};
use crate::view::QueueView;

pub struct QueueSession<S: StateStore> {
    store: S,
    reject_stale_writes: bool,
}

impl QueueSession<FileStore> {
    pub fn open(settings: &Settings) -> Self {
        crate::dlog!("[Queue] Using queue file {}", settings.queue_file.display());
        Self::new(FileStore::new(settings.queue_file.clone()))
            .reject_stale_writes(settings.reject_stale_writes)
    }
}

impl<S: StateStore> QueueSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            reject_stale_writes: false,
        }
    }

    pub fn reject_stale_writes(mut self, enabled: bool) -> Self {
        self.reject_stale_writes = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state as `caller` should see it. Never writes.
    pub fn view(&self, caller: &str) -> QueueView {
        QueueView::new(&self.store.load(), caller)
    }

    pub fn dispatch(&self, caller: &str, intent: Intent) -> (Outcome, QueueView) {
        self.dispatch_seen(caller, intent, None)
    }

    /// `seen_revision` is the revision the caller's view was built from.
    /// With stale-write rejection on, a mismatch rejects the intent.
    pub fn dispatch_seen(
        &self,
        caller: &str,
        intent: Intent,
        seen_revision: Option<u64>,
    ) -> (Outcome, QueueView) {
        let current = self.store.load();

        if self.reject_stale_writes {
            if let Some(seen) = seen_revision.filter(|seen| *seen != current.revision()) {
                let err = QueueError::StaleRevision {
                    seen,
                    current: current.revision(),
                };
                tracing::warn!("[Queue] {caller:?}: {err}");
                let view = QueueView::new(&current, caller);
                return (Outcome::Warning(err), view);
            }
        }

        let (mut next, outcome) = apply(current.clone(), caller, intent);
        if next == current {
            let view = QueueView::new(&next, caller);
            return (outcome, view);
        }

        next.bump_revision();
        if let Err(err) = self.store.save(&next) {
            tracing::warn!("[Queue] Failed to save queue: {err}");
            let view = QueueView::new(&current, caller);
            return (Outcome::Warning(err.into()), view);
        }
        let view = QueueView::new(&next, caller);
        (outcome, view)
    }
}
