//! # zpt-render
//!
//! Converts a self-contained "report package" (HTML, CSS, JavaScript and
//! static assets bundled as a ZIP-format blob) into a PDF using a pooled
//! headless Chrome fleet and a pooled fleet of ephemeral loopback asset
//! servers.
//!
//! The outer HTTP API, its authentication, and multipart parsing are not
//! part of this crate — see [`coordinator`] for the boundary this crate
//! exposes to that layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │     Outer HTTP API (out of scope)            │
//! └─────────────────┬───────────────────────────┘
//!                   │  Job { package, options }
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │            RenderCoordinator                │
//! │  1. server_pool.acquire(reader) -> slot      │
//! │  2. browser_pool.get()          -> lease     │
//! │  3. navigate, await readiness, capture PDF   │
//! │  4. release lease, release slot              │
//! └───────┬───────────────────────┬──────────────┘
//!         ▼                       ▼
//! ┌───────────────────┐   ┌───────────────────────┐
//! │    ServerPool      │   │      BrowserPool       │
//! │ N loopback servers │   │ N headless Chrome procs│
//! │ (capacity N)        │   │ (capacity N)           │
//! └───────────────────┘   └───────────────────────┘
//! ```
//!
//! Both pools are sized identically (capacity `N`) and released in strict
//! LIFO order relative to acquisition on every exit path, including
//! cancellation and failure — see [`coordinator::RenderCoordinator::render`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use zpt_render::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = RenderCoordinator::builder()
//!         .capacity(5)
//!         .base_port(9500)
//!         .browser_factory(Box::new(ChromeBrowserFactory::with_defaults()))
//!         .build()?;
//!
//!     let package = PackageReader::open(std::fs::read("report.zpt")?)?;
//!     let job = Job::new(package);
//!     let result = coordinator.render(job).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment configuration
//!
//! When the `env-config` feature is enabled, [`config::env::from_env`] loads
//! pool sizing and browser lifecycle knobs from an `app.env` file or the
//! system environment:
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `RENDER_POOL_SIZE` | usize | 5 | Capacity shared by both pools |
//! | `RENDER_BASE_PORT` | u16 | 9500 | First loopback port (`base + i`) |
//! | `BROWSER_WARMUP_COUNT` | usize | 3 | Browsers to pre-create |
//! | `BROWSER_TTL_SECONDS` | u64 | 3600 | Browser lifetime (seconds) |
//! | `BROWSER_WARMUP_TIMEOUT_SECONDS` | u64 | 60 | Warmup timeout |
//! | `BROWSER_PING_INTERVAL_SECONDS` | u64 | 15 | Health check interval |
//! | `BROWSER_MAX_PING_FAILURES` | u32 | 3 | Failures before removal |
//! | `CHROME_PATH` | String | auto | Custom Chrome binary path |
//!
//! ## Feature flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `env-config` | Enable environment-based configuration |
//! | `test-utils` | Enable mock factory for testing |
//!
//! ## Error handling
//!
//! Pool-construction faults use [`PoolError`]; every terminating path of a
//! render job reports a [`error::RenderError`] inside its [`job::JobResult`]:
//!
//! ```rust,ignore
//! use zpt_render::error::RenderError;
//!
//! match result.error {
//!     Some(RenderError::BrowserUnavailable(msg)) => eprintln!("pool exhausted: {msg}"),
//!     Some(e) => eprintln!("render failed ({}): {}", e.error_code(), e),
//!     None => println!("ok, {} bytes", result.pdf_bytes.len()),
//! }
//! ```
//!
//! ## Testing
//!
//! For testing without a real Chrome binary or real sockets, enable the
//! `test-utils` feature and use [`factory::mock::MockBrowserFactory`].

#![doc(html_root_url = "https://docs.rs/zpt-render/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod asset_server;
pub mod browser_pool;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod factory;
pub mod handle;
pub mod job;
pub mod metrics;
pub mod package;
pub mod prelude;
pub mod server_pool;
pub mod stats;
pub mod traits;

// Internal modules (not publicly exposed)
pub(crate) mod tracked;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

// Core types
pub use browser_pool::{BrowserPool, BrowserPoolBuilder};
pub use config::{BrowserPoolConfig, BrowserPoolConfigBuilder, ServerPoolConfig, ServerPoolConfigBuilder};
pub use coordinator::{RenderCoordinator, RenderCoordinatorBuilder};
pub use error::{PoolError, RenderError, Result};
pub use factory::{BrowserFactory, ChromeBrowserFactory, create_chrome_options};
pub use handle::BrowserHandle;
pub use job::{Job, JobResult, MarginStyle, PageSize};
pub use package::{PackageError, PackageReader};
pub use server_pool::{ServerHandle, ServerPool};
pub use stats::PoolStats;
pub use traits::Healthcheck;

// Feature-gated re-exports
#[cfg(feature = "env-config")]
pub use config::env::{chrome_path_from_env, from_env};

#[cfg(feature = "env-config")]
pub use browser_pool::init_browser_pool;

// ============================================================================
// Convenience type aliases
// ============================================================================

/// Shared browser pool type for callers that need to hand the pool to
/// multiple worker tasks.
///
/// # Example
///
/// ```rust,ignore
/// use zpt_render::SharedBrowserPool;
///
/// let pool: SharedBrowserPool = browser_pool.into_shared();
/// ```
pub type SharedBrowserPool = std::sync::Arc<std::sync::Mutex<BrowserPool>>;
