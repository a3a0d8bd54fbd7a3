//! # ChemTrack
//!
//! Client side of a blockchain-backed chemical traceability application:
//! role-based dashboards for admins, manufacturers, distributors and
//! customers, who register chemicals, log movements and check on-chain
//! verification through a REST backend.
//!
//! ## Modules
//!
//! - [`session`]: sign-in, persisted session, route guard
//! - [`blockchain`]: backend client, connection status, status poller
//! - [`dashboard`]: HTML templates per role and page
//! - [`navigation`]: routing state machine and content surface
//! - [`workflows`]: form handlers behind the dashboard buttons
//! - [`ui`]: toast notifications and modal dialogs
//! - [`app`]: service wiring
//! - [`web`]: shell server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chemtrack::app::App;
//! use chemtrack::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::new(Config::from_env())?;
//!     app.boot(Some("#dashboard")).await;
//!
//!     // Click the manufacturer quick action, if it is on screen
//!     app.dispatch("register-chemical-btn").await;
//!     println!("Now on {:?}", app.nav().current_page());
//!
//!     app.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod blockchain;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod navigation;
pub mod session;
pub mod transport;
pub mod ui;
pub mod web;
pub mod workflows;

pub use app::App;

pub use blockchain::{BlockchainClient, ClientError, ConnectionStatus, StatusKind, StatusPoller};

pub use config::{Config, ConfigError};

pub use navigation::{AppPhase, ContentRegistry, ContentSurface, MemorySurface, NavigationController};

pub use session::{AuthError, AuthStore, Role, Session};

pub use transport::{ReqwestTransport, Transport, TransportError};

pub use web::{build_router, serve, ServerError};
