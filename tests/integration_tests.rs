//! Integration tests for the browser pool.

use std::time::Duration;
use zpt_render::prelude::*;

/// Test that pool can be created with default configuration.
#[tokio::test]
async fn test_pool_creation() {
    let result = BrowserPool::builder()
        .config(
            BrowserPoolConfigBuilder::new()
                .max_pool_size(2)
                .warmup_count(0) // No warmup to avoid needing Chrome
                .build()
                .unwrap(),
        )
        .factory(Box::new(
            zpt_render::factory::mock::MockBrowserFactory::always_fails("Test mode"),
        ))
        .enable_keep_alive(false)
        .build();

    assert!(result.is_ok(), "Pool creation should succeed");
}

/// Test that pool stats work correctly.
#[tokio::test]
async fn test_pool_stats() {
    let pool = BrowserPool::builder()
        .config(
            BrowserPoolConfigBuilder::new()
                .max_pool_size(5)
                .warmup_count(0)
                .build()
                .unwrap(),
        )
        .factory(Box::new(
            zpt_render::factory::mock::MockBrowserFactory::always_fails("Test mode"),
        ))
        .enable_keep_alive(false)
        .build()
        .unwrap();

    let stats = pool.stats();

    assert_eq!(stats.available, 0);
    assert_eq!(stats.active, 0);
}

/// Test configuration validation.
#[test]
fn test_config_validation() {
    // Zero pool size should fail
    let result = BrowserPoolConfigBuilder::new().max_pool_size(0).build();
    assert!(result.is_err());

    // Warmup > pool size should fail
    let result = BrowserPoolConfigBuilder::new()
        .max_pool_size(3)
        .warmup_count(5)
        .build();
    assert!(result.is_err());

    // Valid config should succeed
    let result = BrowserPoolConfigBuilder::new()
        .max_pool_size(5)
        .warmup_count(3)
        .browser_ttl(Duration::from_secs(3600))
        .build();
    assert!(result.is_ok());
}

/// Test that shutdown prevents new operations.
#[tokio::test]
async fn test_shutdown_prevents_operations() {
    let mut pool = BrowserPool::builder()
        .config(
            BrowserPoolConfigBuilder::new()
                .max_pool_size(2)
                .warmup_count(0)
                .build()
                .unwrap(),
        )
        .factory(Box::new(
            zpt_render::factory::mock::MockBrowserFactory::always_fails("Test mode"),
        ))
        .enable_keep_alive(false)
        .build()
        .unwrap();

    // Shutdown the pool
    pool.shutdown();

    // Get should fail with ShuttingDown error
    let result = pool.get();
    assert!(matches!(result, Err(PoolError::ShuttingDown)));
}

/// Test a full render job against mocked pools: path resolution, server
/// pool acquisition, and coordinator teardown on a browser-lease failure
/// (no real Chrome binary is available in CI).
#[tokio::test]
async fn test_render_reports_browser_unavailable_without_chrome() {
    use std::io::Write as _;
    use zip::write::{SimpleFileOptions, ZipWriter};

    let mut buf = Vec::new();
    {
        let cursor = std::io::Cursor::new(&mut buf);
        let mut writer = ZipWriter::new(cursor);
        writer
            .start_file("report.html", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<html><body>hi</body></html>").unwrap();
        writer.finish().unwrap();
    }

    let coordinator = RenderCoordinator::builder()
        .capacity(2)
        .base_port(22500)
        .browser_factory(Box::new(zpt_render::factory::mock::MockBrowserFactory::always_fails(
            "no chrome in CI",
        )))
        .build()
        .expect("coordinator should build with matching pool capacities");

    let package = PackageReader::open(buf).unwrap();
    let job_id = uuid::Uuid::new_v4().to_string();
    let job = Job::new(job_id, package);
    let result = coordinator.render(job).await;

    assert!(!result.success);
    match result.error {
        Some(RenderError::BrowserUnavailable(_)) => {}
        other => panic!("expected BrowserUnavailable, got {other:?}"),
    }
}
