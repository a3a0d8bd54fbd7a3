//! Toasts and modal dialogs mounted on the content surface

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::dashboard::bindings::modal_bindings;
use crate::dashboard::{Action, Binding};
use crate::navigation::ContentSurface;
use crate::ui::{
    close_button_id, Modal, ModalAction, ModalOutcome, NotificationCenter, NotificationKind,
};

pub const NOTIFICATION_AREA: &str = "notification-area";
pub const MODAL_AREA: &str = "modal-area";

/// Notification center that re-renders its stack after every change
pub struct Notifier {
    center: Mutex<NotificationCenter>,
    surface: Arc<dyn ContentSurface>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

impl Notifier {
    pub fn new(center: NotificationCenter, surface: Arc<dyn ContentSurface>) -> Self {
        Self {
            center: Mutex::new(center),
            surface,
        }
    }

    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        let now = clock();
        let mut center = self.center.lock().unwrap_or_else(PoisonError::into_inner);
        center.sweep(now);
        let id = center.notify_at(message, kind, now);
        self.mount(&center, now);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Info)
    }

    /// Close button
    pub fn dismiss(&self, id: Uuid) -> bool {
        let now = clock();
        let mut center = self.center.lock().unwrap_or_else(PoisonError::into_inner);
        let found = center.dismiss(id, now);
        self.mount(&center, now);
        found
    }

    /// Drop expired toasts and re-render the stack so fading toasts pick up
    /// their class; returns how many were removed
    pub fn sweep(&self) -> usize {
        let now = clock();
        let mut center = self.center.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = center.sweep(now);
        if removed > 0 || !center.items().is_empty() {
            self.mount(&center, now);
        }
        removed
    }

    /// Sweep every `every` until the task is aborted
    pub fn start_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = self.sweep();
                if removed > 0 {
                    tracing::trace!(removed, "Expired notifications removed");
                }
            }
        })
    }

    /// Kind and text of the newest toast
    pub fn latest(&self) -> Option<(NotificationKind, String)> {
        self.center
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest()
            .map(|n| (n.kind, n.message.clone()))
    }

    pub fn messages(&self) -> Vec<String> {
        self.center
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .items()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    fn mount(&self, center: &NotificationCenter, now: Instant) {
        let bindings = center
            .visible(now)
            .map(|n| Binding::new(close_button_id(n.id), Action::DismissNotification(n.id)))
            .collect();
        if !self.surface.replace(NOTIFICATION_AREA, &center.render(now), bindings) {
            tracing::debug!("Notification area not mounted");
        }
    }
}

/// Runtime clock, so paused test time drives toast expiry too
fn clock() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// At most one open modal
pub struct ModalHost {
    open: Mutex<Option<Modal>>,
    surface: Arc<dyn ContentSurface>,
}

impl std::fmt::Debug for ModalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalHost")
            .field("open", &self.is_open())
            .finish()
    }
}

impl ModalHost {
    pub fn new(surface: Arc<dyn ContentSurface>) -> Self {
        Self {
            open: Mutex::new(None),
            surface,
        }
    }

    /// Show `modal`. A modal that is already open is cancelled first.
    pub fn open(&self, modal: Modal) {
        let previous = {
            let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = open.take();
            self.surface.replace(MODAL_AREA, &modal.render(), modal_bindings());
            *open = Some(modal);
            previous
        };
        if let Some(previous) = previous {
            previous.resolve(ModalAction::CloseButton);
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Close the open modal. `None` when nothing was open.
    pub fn resolve(&self, action: ModalAction) -> Option<ModalOutcome> {
        let modal = self.open.lock().unwrap_or_else(PoisonError::into_inner).take()?;
        self.surface.replace(MODAL_AREA, "", Vec::new());
        Some(modal.resolve(action))
    }
}
