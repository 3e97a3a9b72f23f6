//! Convenient imports for common usage patterns.
//!
//! ```rust,ignore
//! use zpt_render::prelude::*;
//! ```
//!
//! gives you the core types needed to build a [`RenderCoordinator`], submit
//! a [`Job`], and read back a [`JobResult`].

// ============================================================================
// Core Types (Always Available)
// ============================================================================

/// Orchestrates a single render job against the paired browser/server pools.
///
/// See [`crate::coordinator::RenderCoordinator`] for full documentation.
pub use crate::coordinator::RenderCoordinator;

/// Builder for [`RenderCoordinator`].
///
/// See [`crate::coordinator::RenderCoordinatorBuilder`] for full documentation.
pub use crate::coordinator::RenderCoordinatorBuilder;

/// The unit of work submitted to a [`RenderCoordinator`].
///
/// See [`crate::job::Job`] for full documentation.
pub use crate::job::Job;

/// The outcome of a single render job.
///
/// See [`crate::job::JobResult`] for full documentation.
pub use crate::job::JobResult;

/// Target page size and margin style.
///
/// See [`crate::job::PageSize`] and [`crate::job::MarginStyle`] for full
/// documentation.
pub use crate::job::{MarginStyle, Margins, PageSize};

/// Reader over a report package (ZIP-format blob of HTML/CSS/JS/assets).
///
/// See [`crate::package::PackageReader`] for full documentation.
pub use crate::package::PackageReader;

/// The main browser pool type for managing browser instances.
///
/// See [`crate::browser_pool::BrowserPool`] for full documentation.
pub use crate::browser_pool::BrowserPool;

/// Builder for creating configured [`BrowserPool`] instances.
///
/// See [`crate::browser_pool::BrowserPoolBuilder`] for full documentation.
pub use crate::browser_pool::BrowserPoolBuilder;

/// Configuration settings for the browser pool.
///
/// See [`crate::config::BrowserPoolConfig`] for full documentation.
pub use crate::config::BrowserPoolConfig;

/// Builder for creating [`BrowserPoolConfig`] instances.
///
/// See [`crate::config::BrowserPoolConfigBuilder`] for full documentation.
pub use crate::config::BrowserPoolConfigBuilder;

/// Configuration settings for the server pool.
///
/// See [`crate::config::ServerPoolConfig`] for full documentation.
pub use crate::config::ServerPoolConfig;

/// Builder for creating [`ServerPoolConfig`] instances.
///
/// See [`crate::config::ServerPoolConfigBuilder`] for full documentation.
pub use crate::config::ServerPoolConfigBuilder;

/// Error type for browser pool operations.
///
/// See [`crate::error::PoolError`] for full documentation.
pub use crate::error::PoolError;

/// The error taxonomy reported by a single render job.
///
/// See [`crate::error::RenderError`] for full documentation.
pub use crate::error::RenderError;

/// Result type alias using [`PoolError`].
///
/// Equivalent to `std::result::Result<T, PoolError>`.
pub use crate::error::Result;

/// RAII handle for a browser checked out from the pool.
///
/// When dropped, the browser is automatically returned to the pool.
/// See [`crate::handle::BrowserHandle`] for full documentation.
pub use crate::handle::BrowserHandle;

/// Leased asset-server slot, released via [`crate::server_pool::ServerPool::release`].
///
/// See [`crate::server_pool::ServerHandle`] for full documentation.
pub use crate::server_pool::ServerHandle;

/// Bounded pool of loopback asset servers.
///
/// See [`crate::server_pool::ServerPool`] for full documentation.
pub use crate::server_pool::ServerPool;

/// Real-time statistics about the browser pool.
///
/// See [`crate::stats::PoolStats`] for full documentation.
pub use crate::stats::PoolStats;

/// Trait for browser creation strategies.
///
/// Implement this trait to customize how browsers are created.
/// See [`crate::factory::BrowserFactory`] for full documentation.
pub use crate::factory::BrowserFactory;

/// Default factory for creating Chrome/Chromium browsers.
///
/// See [`crate::factory::ChromeBrowserFactory`] for full documentation.
pub use crate::factory::ChromeBrowserFactory;

/// Trait for browser health checking.
///
/// See [`crate::traits::Healthcheck`] for full documentation.
pub use crate::traits::Healthcheck;

/// Type alias for a shared, thread-safe browser pool.
///
/// This is defined as `Arc<Mutex<BrowserPool>>` and is the standard way to
/// share a pool across threads and async tasks.
pub use crate::SharedBrowserPool;

// ============================================================================
// Standard Library Re-exports
// ============================================================================

/// Thread-safe reference counting pointer.
///
/// Re-exported for convenience when working with [`SharedBrowserPool`].
pub use std::sync::Arc;

/// Mutual exclusion primitive.
///
/// Re-exported for convenience when working with [`SharedBrowserPool`].
pub use std::sync::Mutex;

// ============================================================================
// Environment Configuration (env-config feature)
// ============================================================================

/// Initialize a browser pool from environment variables.
///
/// See [`crate::browser_pool::init_browser_pool`] for full documentation.
#[cfg(feature = "env-config")]
pub use crate::browser_pool::init_browser_pool;

/// Load browser pool configuration from environment variables.
///
/// See [`crate::config::env::from_env`] for full documentation.
#[cfg(feature = "env-config")]
pub use crate::config::env::from_env;

/// Load server pool configuration from environment variables.
///
/// See [`crate::config::env::server_pool_config_from_env`] for full
/// documentation.
#[cfg(feature = "env-config")]
pub use crate::config::env::server_pool_config_from_env;

/// Get Chrome path from the `CHROME_PATH` environment variable.
///
/// Returns `Some(path)` if the variable is set, `None` otherwise.
#[cfg(feature = "env-config")]
pub use crate::config::env::chrome_path_from_env;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify all core types are accessible.
    #[test]
    fn test_core_types_exported() {
        fn _accepts_config(_: BrowserPoolConfig) {}
        fn _accepts_server_config(_: ServerPoolConfig) {}
        fn _accepts_error(_: PoolError) {}
        fn _accepts_render_error(_: RenderError) {}
        fn _accepts_stats(_: PoolStats) {}
        fn _returns_result() -> Result<()> {
            Ok(())
        }
    }

    /// Verify Arc and Mutex are re-exported.
    #[test]
    fn test_std_reexports() {
        let _: Arc<i32> = Arc::new(42);
        let _: Mutex<i32> = Mutex::new(42);
    }

    /// Verify SharedBrowserPool type alias works.
    #[test]
    fn test_shared_browser_pool_type() {
        fn _accepts_shared_pool(_: SharedBrowserPool) {}

        fn _verify_type() {
            let pool = BrowserPool::builder()
                .factory(Box::new(crate::factory::mock::MockBrowserFactory::new()))
                .build()
                .unwrap();

            let shared: SharedBrowserPool = Arc::new(Mutex::new(pool));
            _accepts_shared_pool(shared);
        }
    }

    /// Verify env-config exports when feature is enabled.
    #[cfg(feature = "env-config")]
    #[test]
    fn test_env_config_exports() {
        let _: Option<String> = chrome_path_from_env();
        fn _takes_from_env(_: fn() -> crate::error::Result<BrowserPoolConfig>) {}
        _takes_from_env(from_env);
    }
}
