//! Concurrent access tests for the browser pool and server pool.

use std::sync::Arc;
use tokio::task::JoinSet;
use zpt_render::prelude::*;

/// Test concurrent access to pool stats.
#[tokio::test]
async fn test_concurrent_stats_access() {
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

    let shared_pool = Arc::new(std::sync::Mutex::new(pool));

    let mut tasks = JoinSet::new();

    // Spawn multiple tasks accessing stats concurrently
    for _ in 0..10 {
        let pool = Arc::clone(&shared_pool);
        tasks.spawn(async move {
            for _ in 0..100 {
                let pool_guard = pool.lock().unwrap();
                let _stats = pool_guard.stats();
            }
        });
    }

    // Wait for all tasks to complete
    while let Some(result) = tasks.join_next().await {
        assert!(result.is_ok(), "Task should complete without panic");
    }
}

/// Test that concurrent acquisitions against a multi-slot server pool never
/// exceed capacity and all eventually succeed.
#[tokio::test]
async fn test_concurrent_server_pool_acquire_release() {
    use std::io::Write as _;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn fixture() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut writer = ZipWriter::new(cursor);
            writer
                .start_file("report.html", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"<html></html>").unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    let pool = ServerPool::new(3, 23000);
    let mut tasks = JoinSet::new();

    for _ in 0..9 {
        let pool = Arc::clone(&pool);
        tasks.spawn_blocking(move || {
            let reader = PackageReader::open(fixture()).unwrap();
            let handle = pool
                .acquire(reader, "report.html".to_string())
                .unwrap()
                .expect("slot should eventually become available");
            assert!(handle.port() >= 23000 && handle.port() < 23003);
            pool.release(handle);
        });
    }

    while let Some(result) = tasks.join_next().await {
        assert!(result.is_ok(), "acquire/release task should not panic");
    }

    assert_eq!(pool.live_count(), 0);
}
