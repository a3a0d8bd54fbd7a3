//! Toast Notifications
//!
//! Notifications auto-dismiss after a fixed lifetime followed by a short
//! fade-out. A close button starts the fade early.

use maud::html;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::UiConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

/// Element id of a toast's close button
pub fn close_button_id(id: Uuid) -> String {
    format!("notification-close-{}", id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    FadingOut,
    Gone,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: Instant,
    /// Set when the user closes the toast before it expires
    closing_since: Option<Instant>,
}

/// Stack of live toasts
#[derive(Debug)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    lifetime: Duration,
    fade: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

impl NotificationCenter {
    pub fn new(lifetime: Duration, fade: Duration) -> Self {
        Self {
            items: Vec::new(),
            lifetime,
            fade,
        }
    }

    pub fn from_config(config: &UiConfig) -> Self {
        Self::new(
            Duration::from_millis(config.toast_ms),
            Duration::from_millis(config.toast_fade_ms),
        )
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        self.notify_at(message, kind, Instant::now())
    }

    pub fn notify_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> Uuid {
        let message = message.into();
        match kind {
            NotificationKind::Error => tracing::warn!(%message, "Error notification"),
            _ => tracing::debug!(kind = kind.as_str(), %message, "Notification"),
        }

        let id = Uuid::new_v4();
        self.items.push(Notification {
            id,
            message,
            kind,
            created_at: now,
            closing_since: None,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Error)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Warning)
    }

    pub fn info(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(message, NotificationKind::Info)
    }

    /// Start the fade-out of a toast (close button). Returns false for unknown ids.
    pub fn dismiss(&mut self, id: Uuid, now: Instant) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                if n.closing_since.is_none() {
                    n.closing_since = Some(now);
                }
                true
            }
            None => false,
        }
    }

    pub fn visibility(&self, notification: &Notification, now: Instant) -> Visibility {
        let fade_start = notification
            .closing_since
            .unwrap_or(notification.created_at + self.lifetime);

        if now < fade_start {
            Visibility::Shown
        } else if now < fade_start + self.fade {
            Visibility::FadingOut
        } else {
            Visibility::Gone
        }
    }

    /// Drop toasts whose fade-out has finished; returns how many were removed
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        let (lifetime, fade) = (self.lifetime, self.fade);
        self.items.retain(|n| {
            let fade_start = n.closing_since.unwrap_or(n.created_at + lifetime);
            now < fade_start + fade
        });
        before - self.items.len()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    /// Toasts still on screen at `now`, fading ones included
    pub fn visible(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        self.items
            .iter()
            .filter(move |n| self.visibility(n, now) != Visibility::Gone)
    }

    pub fn render(&self, now: Instant) -> String {
        html! {
            div class="notification-stack" {
                @for n in &self.items {
                    @let visibility = self.visibility(n, now);
                    @if visibility != Visibility::Gone {
                        @let class = if visibility == Visibility::FadingOut {
                            format!("notification {} fade-out", n.kind.as_str())
                        } else {
                            format!("notification {}", n.kind.as_str())
                        };
                        div class=(class) data-id=(n.id.to_string()) {
                            div class="notification-content" {
                                span class="notification-message" { (n.message) }
                                button id=(close_button_id(n.id)) class="notification-close" { "×" }
                            }
                        }
                    }
                }
            }
        }
        .into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> NotificationCenter {
        NotificationCenter::new(Duration::from_millis(5000), Duration::from_millis(300))
    }

    #[test]
    fn test_auto_dismiss_lifecycle() {
        let mut center = center();
        let t0 = Instant::now();
        center.notify_at("Saved", NotificationKind::Success, t0);

        let n = center.latest().unwrap().clone();
        assert_eq!(center.visibility(&n, t0 + Duration::from_millis(4999)), Visibility::Shown);
        assert_eq!(
            center.visibility(&n, t0 + Duration::from_millis(5100)),
            Visibility::FadingOut
        );
        assert_eq!(center.visibility(&n, t0 + Duration::from_millis(5300)), Visibility::Gone);

        assert_eq!(center.sweep(t0 + Duration::from_millis(5200)), 0);
        assert_eq!(center.sweep(t0 + Duration::from_millis(5300)), 1);
        assert!(center.items().is_empty());
    }

    #[test]
    fn test_close_button_starts_fade() {
        let mut center = center();
        let t0 = Instant::now();
        let id = center.notify_at("Oops", NotificationKind::Error, t0);

        let closed_at = t0 + Duration::from_millis(1000);
        assert!(center.dismiss(id, closed_at));
        assert!(!center.dismiss(Uuid::new_v4(), closed_at));

        assert_eq!(center.sweep(closed_at + Duration::from_millis(300)), 1);
    }

    #[test]
    fn test_render_escapes_message() {
        let mut center = center();
        let t0 = Instant::now();
        center.notify_at("<b>tag</b>", NotificationKind::Warning, t0);

        let html = center.render(t0);
        assert!(html.contains("notification warning"));
        assert!(html.contains("&lt;b&gt;tag&lt;/b&gt;"));
    }

    #[test]
    fn test_close_button_id_per_toast() {
        let mut center = center();
        let t0 = Instant::now();
        let id = center.notify_at("Saved", NotificationKind::Success, t0);

        let html = center.render(t0);
        assert!(html.contains(&format!(r#"id="notification-close-{}""#, id)));
        assert_eq!(center.visible(t0).count(), 1);
        assert_eq!(center.visible(t0 + Duration::from_millis(5300)).count(), 0);
    }
}
