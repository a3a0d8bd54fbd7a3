//! Content provider registry
//!
//! Feature areas register a provider for a page key at startup. Both the
//! controller and the shell server resolve pages through
//! [`ContentRegistry::resolve`], which falls back to the built-in templates.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

use crate::blockchain::ConnectionStatus;
use crate::dashboard::{self, fragments, Binding};
use crate::session::{Role, Session};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{0}")]
    Provider(String),

    #[error("Missing page data: {0}")]
    MissingData(String),
}

/// What a provider sees when asked for a page
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub page: &'a str,
    pub role: Option<Role>,
    pub session: Option<&'a Session>,
    pub status: &'a ConnectionStatus,
}

/// Rendered content plus the listeners it needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub bindings: Vec<Binding>,
}

impl RenderedPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }
}

pub type ContentProvider =
    Arc<dyn Fn(&PageContext<'_>) -> Result<RenderedPage, RenderError> + Send + Sync>;

#[derive(Default)]
pub struct ContentRegistry {
    providers: RwLock<HashMap<String, ContentProvider>>,
}

impl std::fmt::Debug for ContentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRegistry")
            .field("pages", &self.pages())
            .finish()
    }
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider; a later registration for the same key wins
    pub fn register<F>(&self, page: impl Into<String>, provider: F)
    where
        F: Fn(&PageContext<'_>) -> Result<RenderedPage, RenderError> + Send + Sync + 'static,
    {
        let page = page.into();
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        if providers.insert(page.clone(), Arc::new(provider)).is_some() {
            tracing::debug!(page = %page, "Replaced content provider");
        } else {
            tracing::debug!(page = %page, "Registered content provider");
        }
    }

    pub fn unregister(&self, page: &str) -> bool {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(page)
            .is_some()
    }

    pub fn get(&self, page: &str) -> Option<ContentProvider> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(page)
            .cloned()
    }

    pub fn contains(&self, page: &str) -> bool {
        self.get(page).is_some()
    }

    /// Content for `ctx.page`: the registered provider, else the built-in
    /// template or placeholder. Provider errors and panics become the inline
    /// error panel.
    pub fn resolve(&self, ctx: &PageContext<'_>) -> RenderedPage {
        let Some(provider) = self.get(ctx.page) else {
            return RenderedPage {
                html: dashboard::page_content(ctx.role, ctx.page, ctx.status),
                bindings: dashboard::bindings_for(ctx.page, ctx.role),
            };
        };

        let result = catch_unwind(AssertUnwindSafe(|| provider(ctx))).unwrap_or_else(|_| {
            Err(RenderError::Provider(format!(
                "content provider for '{}' panicked",
                ctx.page
            )))
        });

        result.unwrap_or_else(|e| {
            tracing::error!(page = ctx.page, error = %e, "Error loading page content");
            RenderedPage::new(fragments::error_panel(&e.to_string()))
        })
    }

    pub fn pages(&self) -> Vec<String> {
        let mut pages: Vec<String> = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        pages.sort();
        pages
    }
}
