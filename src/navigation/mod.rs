//! Navigation/Routing Controller
//!
//! Hash-style routing over a page back-stack. Feature areas extend the
//! built-in pages through a [`ContentRegistry`]; every content swap goes
//! through a [`ContentSurface`], which replaces the listener bindings with
//! the markup.

pub mod controller;
pub mod registry;
pub mod state;
pub mod surface;

pub use controller::{
    route_from_hash, AppPhase, NavigationController, NavigationOutcome, NavigationToken,
    CONTENT_ID, DEFAULT_PAGE,
};
pub use registry::{ContentProvider, ContentRegistry, PageContext, RenderError, RenderedPage};
pub use state::NavigationState;
pub use surface::{ContentSurface, MemorySurface};
