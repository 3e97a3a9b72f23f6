//! Render coordinator (C4): orchestrates a single job end to end.
//!
//! Owns the browser pool (capacity `N`, same `N` as the server pool) and a
//! reference to the server pool. `render` never panics up through either
//! pool — every terminating path reports a [`JobResult`], mirroring the
//! reference implementation's `Engine.RenderJob` (`pkg/render/engine.go`):
//! acquire server slot, acquire browser, navigate, await readiness, capture
//! PDF, release both in strict order on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use headless_chrome::protocol::cdp::Page::PrintToPdfOptions;
use headless_chrome::protocol::cdp::Security::SetIgnoreCertificateErrors;
use headless_chrome::Tab;

use crate::browser_pool::{BrowserPool, BrowserPoolBuilder};
use crate::config::{BrowserPoolConfig, ServerPoolConfig};
use crate::error::RenderError;
use crate::factory::BrowserFactory;
use crate::job::{Job, JobResult};
use crate::metrics;
use crate::server_pool::ServerPool;

/// Orchestrates render jobs against a browser pool and a server pool sized
/// to the same capacity.
pub struct RenderCoordinator {
    browser_pool: Arc<Mutex<BrowserPool>>,
    server_pool: Arc<ServerPool>,
    log_console_events: bool,
}

impl RenderCoordinator {
    /// Starts building a coordinator.
    pub fn builder() -> RenderCoordinatorBuilder {
        RenderCoordinatorBuilder::new()
    }

    /// Runs a single job to completion. Never panics; every outcome,
    /// including cancellation and acquisition failure, is reported inside
    /// the returned [`JobResult`].
    ///
    /// The job itself is entirely synchronous — pool acquisition blocks on a
    /// channel recv and navigation/PDF capture block on the CDP round trip —
    /// so the work runs inside [`tokio::task::spawn_blocking`]. This keeps
    /// async worker threads free and lets up to `N` jobs run concurrently,
    /// matching the pattern the browser pool's own blocking calls already
    /// follow (see `tests/concurrent_tests.rs`'s `spawn_blocking` usage).
    pub async fn render(&self, job: Job) -> JobResult {
        let job_id = job.id.clone();
        let browser_pool = Arc::clone(&self.browser_pool);
        let server_pool = Arc::clone(&self.server_pool);
        let log_console_events = self.log_console_events;

        match tokio::task::spawn_blocking(move || {
            render_blocking(browser_pool, server_pool, log_console_events, job)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                let err = RenderError::RenderFailure(format!("job {job_id}: render task panicked: {e}"));
                metrics::record_job(Duration::ZERO, false);
                JobResult::failed(0.0, err)
            }
        }
    }
}

/// The blocking body of [`RenderCoordinator::render`], run on a blocking
/// thread so the job's synchronous pool/CDP calls don't stall the async
/// runtime.
fn render_blocking(
    browser_pool: Arc<Mutex<BrowserPool>>,
    server_pool: Arc<ServerPool>,
    log_console_events: bool,
    job: Job,
) -> JobResult {
    let job_id = job.id.clone();
    log::debug!("job {}: starting", job_id);

    let Job {
        id: _,
        package,
        index_name,
        page_size,
        margin_style,
        custom_margins,
        landscape,
        settling_ms,
        job_timeout_secs,
        js_timeout_secs,
        use_js_event,
        ignore_ssl_errors,
    } = job;
    let options = RenderOptions {
        page_size,
        margin_style,
        custom_margins,
        landscape,
        settling_ms,
        job_timeout_secs,
        js_timeout_secs,
        use_js_event,
        ignore_ssl_errors,
        log_console_events,
    };

    // Step 1a: server slot.
    let server_handle = match server_pool.acquire(package, index_name.clone()) {
        Ok(Some(handle)) => handle,
        Ok(None) => {
            let err = RenderError::ServerUnavailable(format!("job {job_id}: no slot available"));
            metrics::record_job(Duration::ZERO, false);
            return JobResult::failed(0.0, err);
        }
        Err(e) => {
            let err = RenderError::ServerUnavailable(e.to_string());
            metrics::record_job(Duration::ZERO, false);
            return JobResult::failed(0.0, err);
        }
    };
    metrics::set_live_servers(server_pool.live_count());

    // Step 1b: browser lease.
    let browser_lease = {
        let pool = browser_pool.lock().unwrap_or_else(|p| p.into_inner());
        pool.get()
    };
    let browser = match browser_lease {
        Ok(b) => b,
        Err(e) => {
            server_pool.release(server_handle);
            let err = RenderError::BrowserUnavailable(format!("job {job_id}: {e}"));
            metrics::record_job(Duration::ZERO, false);
            return JobResult::failed(0.0, err);
        }
    };

    let start = Instant::now();
    let outcome = render_on_leased_resources(&job_id, &browser, &server_handle, &index_name, &options);

    // Step 6: teardown, in strict reverse-of-acquisition order, on every
    // exit path including the error branches above already released.
    drop(browser);
    server_pool.release(server_handle);
    metrics::set_live_servers(server_pool.live_count());

    let elapsed = start.elapsed();
    let result = match outcome {
        Ok(pdf_bytes) => JobResult::ok(elapsed.as_secs_f64(), pdf_bytes),
        Err(e) => JobResult::failed(elapsed.as_secs_f64(), e),
    };
    metrics::record_job(elapsed, result.success);
    log::debug!("job {}: finished success={} elapsed={:?}", job_id, result.success, elapsed);
    result
}

/// The subset of [`Job`]'s fields needed once the package has been handed
/// off to the server pool.
struct RenderOptions {
    page_size: crate::job::PageSize,
    margin_style: crate::job::MarginStyle,
    custom_margins: crate::job::Margins,
    landscape: bool,
    settling_ms: u64,
    job_timeout_secs: u64,
    js_timeout_secs: u64,
    use_js_event: bool,
    ignore_ssl_errors: bool,
    /// Mirrors the reference engine's `HttpDebug` toggle: forwards every
    /// console-API call and browser-side log entry to this coordinator's
    /// logger, tagged with the job id and event source. Orthogonal to the
    /// readiness mode — applies whether or not `use_js_event` is set.
    log_console_events: bool,
}

fn render_on_leased_resources(
    job_id: &str,
    browser: &crate::handle::BrowserHandle,
    server_handle: &crate::server_pool::ServerHandle,
    index_name: &str,
    options: &RenderOptions,
) -> Result<Vec<u8>, RenderError> {
    let tab = browser
        .new_tab()
        .map_err(|e| RenderError::RenderFailure(format!("job {job_id}: tab creation failed: {e}")))?;

    if options.ignore_ssl_errors {
        if let Err(e) = tab.call_method(SetIgnoreCertificateErrors { ignore: true }) {
            log::warn!("job {}: failed to enable ignore_ssl_errors: {}", job_id, e);
        }
    }

    tab.set_default_timeout(Duration::from_secs(options.job_timeout_secs));

    let url = server_handle.url_for(index_name);
    log::debug!("job {}: navigating to {}", job_id, url);

    // Installed once, ahead of the readiness branch below, so console/log
    // forwarding applies the same way regardless of readiness mode.
    let ready_flag = Arc::new(AtomicBool::new(false));
    let listener_guard = tab
        .add_event_listener(Arc::new(console_event_logger(
            job_id.to_string(),
            options.log_console_events,
            Arc::clone(&ready_flag),
        )))
        .map_err(|e| RenderError::RenderFailure(format!("job {job_id}: event subscription failed: {e}")))?;

    if options.use_js_event {
        run_js_triggered_readiness(job_id, &tab, &url, options, &ready_flag)?;
    } else {
        run_timed_settle(job_id, &tab, &url, options)?;
    }
    drop(listener_guard);

    let print_options = build_print_options(options);
    let pdf_bytes = tab
        .print_to_pdf(Some(print_options))
        .map_err(|e| RenderError::RenderFailure(format!("job {job_id}: pdf capture failed: {e}")))?;

    let _ = tab.close(true);
    Ok(pdf_bytes)
}

/// Builds the shared CDP event handler installed on every job's tab: logs
/// console-API calls and browser-side log entries (when enabled) and, for
/// jobs using JS-triggered readiness, flips `ready_flag` on the
/// `"zpt-view-ready"` console signal.
fn console_event_logger(
    job_id: String,
    log_console_events: bool,
    ready_flag: Arc<AtomicBool>,
) -> impl Fn(&headless_chrome::protocol::cdp::types::Event) + Send + Sync + 'static {
    use headless_chrome::protocol::cdp::types::Event;

    move |event: &Event| match event {
        Event::ConsoleAPICalled(console_event) => {
            if log_console_events {
                let text = console_event
                    .params
                    .args
                    .iter()
                    .filter_map(|arg| arg.value.as_ref().map(|v| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(" ");
                log::info!("job {}: console source=console {}", job_id, text);
            }
            if let Some(first_arg) = console_event.params.args.first() {
                let value = first_arg.value.as_ref().map(|v| v.to_string()).unwrap_or_default();
                if value.trim_matches('"') == "zpt-view-ready" {
                    ready_flag.store(true, Ordering::Release);
                }
            }
        }
        Event::EntryAdded(log_event) => {
            if log_console_events {
                log::info!(
                    "job {}: console source=log level={:?} {}",
                    job_id,
                    log_event.params.entry.level,
                    log_event.params.entry.text
                );
            }
        }
        _ => {}
    }
}

fn run_timed_settle(job_id: &str, tab: &Tab, url: &str, options: &RenderOptions) -> Result<(), RenderError> {
    tab.navigate_to(url)
        .map_err(|e| RenderError::RenderFailure(format!("job {job_id}: navigation failed: {e}")))?
        .wait_until_navigated()
        .map_err(|e| RenderError::RenderFailure(format!("job {job_id}: page load wait failed: {e}")))?;

    std::thread::sleep(Duration::from_millis(options.settling_ms));
    Ok(())
}

fn run_js_triggered_readiness(
    job_id: &str,
    tab: &Tab,
    url: &str,
    options: &RenderOptions,
    ready_flag: &Arc<AtomicBool>,
) -> Result<(), RenderError> {
    tab.navigate_to(url)
        .map_err(|e| RenderError::RenderFailure(format!("job {job_id}: navigation failed: {e}")))?
        .wait_until_navigated()
        .map_err(|e| RenderError::RenderFailure(format!("job {job_id}: page load wait failed: {e}")))?;

    let deadline = Instant::now() + Duration::from_secs(options.js_timeout_secs);
    while !ready_flag.load(Ordering::Acquire) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    if !ready_flag.load(Ordering::Acquire) {
        log::warn!("job {}: js-readiness timeout after {}s, proceeding anyway", job_id, options.js_timeout_secs);
    }

    Ok(())
}

fn build_print_options(options: &RenderOptions) -> PrintToPdfOptions {
    let (width, height) = options.page_size.dimensions_in();
    let margins = options.margin_style.resolve(options.custom_margins);

    PrintToPdfOptions {
        landscape: Some(options.landscape),
        display_header_footer: Some(false),
        print_background: Some(false),
        scale: Some(1.0),
        paper_width: Some(width),
        paper_height: Some(height),
        margin_top: Some(margins.top),
        margin_bottom: Some(margins.bottom),
        margin_left: Some(margins.left),
        margin_right: Some(margins.right),
        page_ranges: None,
        ignore_invalid_page_ranges: None,
        prefer_css_page_size: Some(false),
        transfer_mode: None,
        header_template: None,
        footer_template: None,
        generate_tagged_pdf: None,
        generate_document_outline: None,
    }
}

/// Builder for [`RenderCoordinator`], pairing a browser pool with a server
/// pool of identical capacity.
pub struct RenderCoordinatorBuilder {
    capacity: usize,
    base_port: u16,
    browser_config: BrowserPoolConfig,
    factory: Option<Box<dyn BrowserFactory>>,
    log_console_events: bool,
}

impl RenderCoordinatorBuilder {
    fn new() -> Self {
        Self {
            capacity: 5,
            base_port: 9500,
            browser_config: BrowserPoolConfig::default(),
            factory: None,
            log_console_events: false,
        }
    }

    /// Sets the shared capacity `N` for both pools.
    pub fn capacity(mut self, n: usize) -> Self {
        self.capacity = n;
        self
    }

    /// Sets the first loopback port; slot `i` binds `base_port + i`.
    pub fn base_port(mut self, port: u16) -> Self {
        self.base_port = port;
        self
    }

    /// Overrides the browser pool's health/lifecycle configuration. Its
    /// `max_pool_size` is forced to match `capacity` at `build()`.
    pub fn browser_config(mut self, config: BrowserPoolConfig) -> Self {
        self.browser_config = config;
        self
    }

    /// Sets the browser factory (e.g. [`crate::factory::ChromeBrowserFactory`]).
    pub fn browser_factory(mut self, factory: Box<dyn BrowserFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Enables forwarding of console-API calls and browser-side log entries
    /// to the coordinator's logger, tagged with the job id. Mirrors the
    /// reference engine's `HttpDebug` toggle; off by default.
    pub fn enable_console_logging(mut self, enabled: bool) -> Self {
        self.log_console_events = enabled;
        self
    }

    /// Validates and constructs the coordinator.
    pub fn build(self) -> Result<RenderCoordinator, String> {
        let server_config = ServerPoolConfig::builder()
            .capacity(self.capacity)
            .base_port(self.base_port)
            .build()?;

        let mut browser_config = self.browser_config;
        browser_config.max_pool_size = server_config.capacity;

        let factory = self
            .factory
            .unwrap_or_else(|| Box::new(crate::factory::ChromeBrowserFactory::with_defaults()));

        let mut pool_builder = BrowserPoolBuilder::new().config(browser_config).factory(factory);
        pool_builder = pool_builder.enable_keep_alive(true);
        let browser_pool = pool_builder.build().map_err(|e| e.to_string())?;

        let server_pool = ServerPool::new(server_config.capacity, server_config.base_port);

        Ok(RenderCoordinator {
            browser_pool: Arc::new(Mutex::new(browser_pool)),
            server_pool,
            log_console_events: self.log_console_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::mock::MockBrowserFactory;

    #[test]
    fn test_builder_enforces_matching_capacity() {
        let coordinator = RenderCoordinator::builder()
            .capacity(3)
            .base_port(21500)
            .browser_factory(Box::new(MockBrowserFactory::always_fails("no chrome in tests")))
            .build();
        assert!(coordinator.is_ok());
    }

    #[test]
    fn test_builder_rejects_low_base_port() {
        let result = RenderCoordinatorBuilder::new()
            .capacity(2)
            .base_port(80)
            .browser_factory(Box::new(MockBrowserFactory::always_fails("unused")))
            .build();
        assert!(result.is_err());
    }
}
