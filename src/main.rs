//! ChemTrack Shell Server
//!
//! Run with: cargo run --bin chemtrack
//!
//! # Configuration
//!
//! Reads `chemtrack.toml` from the user config dir, `/etc/chemtrack` or the
//! working directory. `CHEMTRACK_CONFIG` points at an explicit file.
//! `CHEMTRACK_*` variables override individual settings; `RUST_LOG` overrides
//! the log filter.

use std::path::PathBuf;
use std::sync::Arc;

use chemtrack::app::App;
use chemtrack::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var_os("CHEMTRACK_CONFIG") {
        Some(path) => Config::load_with_env(&PathBuf::from(path))?,
        None => Config::load_default(),
    };
    chemtrack::logging::init(&config.logging);

    tracing::info!("Starting ChemTrack shell v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(backend = %config.backend.base_url, "Backend configured");

    let app = Arc::new(App::new(config)?);

    let booting = app.clone();
    tokio::spawn(async move {
        booting.boot(None).await;
    });

    chemtrack::web::serve(app).await?;
    Ok(())
}
