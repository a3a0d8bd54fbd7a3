//! Modal Dialogs
//!
//! A modal resolves exactly once. The close button, the cancel button and a
//! click outside the dialog all cancel.

use maud::{html, PreEscaped};

type Callback = Box<dyn FnOnce() + Send>;

/// What the user did to close the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    ConfirmButton,
    CancelButton,
    CloseButton,
    OutsideClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOutcome {
    Confirmed,
    Cancelled,
}

pub struct Modal {
    pub title: String,
    /// Trusted HTML fragment produced by this crate's templates
    pub body_html: String,
    pub confirm_text: String,
    pub cancel_text: String,
    on_confirm: Option<Callback>,
    on_cancel: Option<Callback>,
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("title", &self.title)
            .field("confirm_text", &self.confirm_text)
            .field("cancel_text", &self.cancel_text)
            .finish()
    }
}

impl Modal {
    pub fn new(title: impl Into<String>, body_html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body_html: body_html.into(),
            confirm_text: "OK".to_string(),
            cancel_text: "Cancel".to_string(),
            on_confirm: None,
            on_cancel: None,
        }
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    pub fn on_confirm(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn render(&self) -> String {
        html! {
            div class="modal show" id="modal-backdrop" {
                div class="modal-content" {
                    div class="modal-header" {
                        h3 { (self.title) }
                        button class="modal-close" id="modal-close" { "×" }
                    }
                    div class="modal-body" { (PreEscaped(&self.body_html)) }
                    div class="modal-footer" {
                        button class="btn btn-secondary" id="modal-cancel" { (self.cancel_text) }
                        button class="btn btn-primary" id="modal-confirm" { (self.confirm_text) }
                    }
                }
            }
        }
        .into_string()
    }

    /// Close the dialog, running the matching callback
    pub fn resolve(self, action: ModalAction) -> ModalOutcome {
        match action {
            ModalAction::ConfirmButton => {
                if let Some(f) = self.on_confirm {
                    f();
                }
                ModalOutcome::Confirmed
            }
            ModalAction::CancelButton | ModalAction::CloseButton | ModalAction::OutsideClick => {
                if let Some(f) = self.on_cancel {
                    f();
                }
                ModalOutcome::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_outside_click_cancels() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let confirmed = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&cancelled);
        let k = Arc::clone(&confirmed);
        let modal = Modal::new("Delete?", "<p>Really?</p>")
            .on_cancel(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .on_confirm(move || {
                k.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(modal.resolve(ModalAction::OutsideClick), ModalOutcome::Cancelled);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
        assert_eq!(confirmed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_render_defaults() {
        let modal = Modal::new("Scan <tag>", "<p>body</p>").confirm_text("Scan");
        let html = modal.render();
        assert!(html.contains("Scan &lt;tag&gt;"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains(">Cancel<"));
        assert!(html.contains(">Scan<"));
        assert_eq!(modal.resolve(ModalAction::ConfirmButton), ModalOutcome::Confirmed);
    }
}
