//! Server pool (C3): a bounded set of loopback asset-server slots.
//!
//! Mirrors the reference implementation's `ServerPool` (`pkg/zpt/pool.go`):
//! a fixed-length slot vector guarded by one mutex, plus a permit channel
//! pre-filled with `N` tokens that IS the backpressure mechanism (§5). No
//! I/O is performed while the slot-table lock is held, matching the
//! lock-ordering discipline already used by [`crate::browser_pool`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::asset_server::AssetServer;
use crate::package::PackageReader;

struct Slot {
    server: Arc<AssetServer>,
    join: JoinHandle<()>,
}

struct SlotTable {
    slots: Vec<Option<Slot>>,
}

/// A leased server slot. Holds the running asset server's base URL; released
/// back to the pool via [`ServerPool::release`].
pub struct ServerHandle {
    index: usize,
    port: u16,
}

impl ServerHandle {
    /// The slot index, `0..N-1`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The loopback port this slot's asset server is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://localhost:<port>/<path>` for the job's index name or any
    /// other package-relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!("http://localhost:{}/{}", self.port, path.trim_start_matches('/'))
    }
}

/// Errors raised by server-pool operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServerPoolError {
    /// The pool is shutting down and will not accept new acquisitions.
    #[error("server pool is shutting down")]
    ShuttingDown,

    /// Consumed a permit but found no empty slot — a logical inconsistency.
    #[error("server pool inconsistency: no empty slot with permit held")]
    Inconsistent,
}

/// Bounded pool of `N` loopback asset-server slots bound to
/// `base_port..base_port+N`.
pub struct ServerPool {
    capacity: usize,
    base_port: u16,
    table: Mutex<SlotTable>,
    permits_tx: SyncSender<()>,
    permits_rx: Mutex<Receiver<()>>,
    live_servers: AtomicUsize,
    shutting_down: std::sync::atomic::AtomicBool,
}

impl ServerPool {
    /// Builds a pool with `capacity` slots starting at `base_port`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0` — validate via [`crate::config::ServerPoolConfig`]
    /// before constructing.
    pub fn new(capacity: usize, base_port: u16) -> Arc<Self> {
        assert!(capacity > 0, "server pool capacity must be >= 1");
        let (tx, rx) = sync_channel(capacity);
        for _ in 0..capacity {
            tx.send(()).expect("fresh channel cannot be full");
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Arc::new(Self {
            capacity,
            base_port,
            table: Mutex::new(SlotTable { slots }),
            permits_tx: tx,
            permits_rx: Mutex::new(rx),
            live_servers: AtomicUsize::new(0),
            shutting_down: std::sync::atomic::AtomicBool::new(false),
        })
    }

    /// Pool capacity `N`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of asset servers currently live.
    pub fn live_count(&self) -> usize {
        self.live_servers.load(Ordering::Acquire)
    }

    /// Blocks until a slot permit is available, then installs and starts an
    /// asset server bound to that slot's port against `reader`.
    ///
    /// Returns `Ok(None)` if the pool is shutting down or a logical
    /// inconsistency is detected (both are logged; the caller surfaces
    /// `ServerUnavailable`).
    pub fn acquire(
        self: &Arc<Self>,
        reader: PackageReader,
        default_index: String,
    ) -> Result<Option<ServerHandle>, ServerPoolError> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(ServerPoolError::ShuttingDown);
        }

        {
            let rx = self.permits_rx.lock().unwrap_or_else(|p| p.into_inner());
            if rx.recv().is_err() {
                return Err(ServerPoolError::ShuttingDown);
            }
        }

        if self.shutting_down.load(Ordering::Acquire) {
            // Permit consumed during shutdown drain; return it and bail.
            let _ = self.permits_tx.send(());
            return Ok(None);
        }

        let index = {
            let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
            match table.slots.iter().position(|s| s.is_none()) {
                Some(idx) => idx,
                None => {
                    // Inconsistency: a token was held but no slot was empty.
                    drop(table);
                    let _ = self.permits_tx.send(());
                    log::error!("server pool: no empty slot while permit held, capacity={}", self.capacity);
                    return Err(ServerPoolError::Inconsistent);
                }
            }
        };

        let port = self.base_port + index as u16;
        let server = Arc::new(AssetServer::new(reader, port, default_index));
        let run_server = Arc::clone(&server);
        let pool_for_thread = Arc::clone(self);
        let join = std::thread::spawn(move || {
            if let Err(e) = run_server.run() {
                log::error!("asset server on port {} exited with error: {}", run_server.port(), e);
            }
            pool_for_thread.live_servers.fetch_sub(1, Ordering::AcqRel);
        });
        self.live_servers.fetch_add(1, Ordering::AcqRel);

        {
            let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
            table.slots[index] = Some(Slot { server, join });
        }

        log::debug!("server pool: acquired slot {} on port {}", index, port);
        Ok(Some(ServerHandle { index, port }))
    }

    /// Shuts down the handle's asset server, clears its slot, and returns
    /// the permit. Idempotent: releasing an already-cleared slot is a no-op
    /// returning `false`.
    pub fn release(&self, handle: ServerHandle) -> bool {
        let slot = {
            let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
            table.slots.get_mut(handle.index).and_then(Option::take)
        };

        let Some(slot) = slot else {
            log::warn!("server pool: release of slot {} not currently occupied", handle.index);
            return false;
        };

        slot.server.shutdown();
        if let Err(e) = slot.join.join() {
            log::error!("server pool: asset server thread on slot {} panicked: {:?}", handle.index, e);
        }

        let _ = self.permits_tx.send(());
        log::debug!("server pool: released slot {}", handle.index);
        true
    }

    /// Drains all outstanding permits and shuts down every live server.
    /// Subsequent `acquire` calls return promptly with `ShuttingDown`.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);

        let occupied: Vec<(usize, Arc<AssetServer>)> = {
            let table = self.table.lock().unwrap_or_else(|p| p.into_inner());
            table
                .slots
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.as_ref().map(|slot| (i, Arc::clone(&slot.server))))
                .collect()
        };

        for (index, server) in &occupied {
            log::debug!("server pool: shutting down slot {} during pool shutdown", index);
            server.shutdown();
        }

        let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
        for slot in table.slots.iter_mut() {
            if let Some(s) = slot.take() {
                if let Err(e) = s.join.join() {
                    log::error!("server pool: asset server thread panicked during shutdown: {:?}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn fixture() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut writer = ZipWriter::new(cursor);
            let opts = SimpleFileOptions::default();
            writer.start_file("report.html", opts).unwrap();
            writer.write_all(b"<html></html>").unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_acquire_release_round_trip() {
        let pool = ServerPool::new(2, 21000);
        assert_eq!(pool.capacity(), 2);

        let reader = PackageReader::open(fixture()).unwrap();
        let handle = pool
            .acquire(reader, "report.html".to_string())
            .unwrap()
            .expect("slot available");
        assert_eq!(handle.port(), 21000);

        assert!(pool.release(handle));
    }

    #[test]
    fn test_release_unknown_handle_is_noop() {
        let pool = ServerPool::new(1, 21100);
        let bogus = ServerHandle { index: 0, port: 21100 };
        assert!(!pool.release(bogus));
    }

    #[test]
    fn test_capacity_exhaustion_blocks_until_release() {
        let pool = ServerPool::new(1, 21200);
        let reader1 = PackageReader::open(fixture()).unwrap();
        let handle1 = pool.acquire(reader1, "report.html".to_string()).unwrap().unwrap();

        let pool2 = Arc::clone(&pool);
        let acquired = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let acquired2 = Arc::clone(&acquired);
        let t = std::thread::spawn(move || {
            let reader2 = PackageReader::open(fixture()).unwrap();
            let handle2 = pool2.acquire(reader2, "report.html".to_string()).unwrap().unwrap();
            acquired2.store(true, Ordering::SeqCst);
            pool2.release(handle2);
        });

        std::thread::sleep(std::time::Duration::from_millis(100));
        assert!(!acquired.load(Ordering::SeqCst));

        pool.release(handle1);
        t.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
    }
}
