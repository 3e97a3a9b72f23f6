//! Job and job-result types for a single render (§3, §6).

use crate::error::RenderError;
use crate::package::PackageReader;

/// Target page size. Geometry values (inches) follow the reference
/// implementation's paper-size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    /// 11.7in x 16.5in.
    A3,
    /// 8.3in x 11.7in. Default fallback when unspecified at the HTTP boundary.
    A4,
    /// 5.8in x 8.3in.
    A5,
    /// 8.5in x 11in.
    Letter,
    /// 8.5in x 14in.
    Legal,
    /// 11in x 17in.
    Tabloid,
}

impl PageSize {
    /// `(width, height)` in inches, portrait orientation.
    pub fn dimensions_in(self) -> (f64, f64) {
        match self {
            PageSize::A3 => (11.7, 16.5),
            PageSize::A4 => (8.3, 11.7),
            PageSize::A5 => (5.8, 8.3),
            PageSize::Letter => (8.5, 11.0),
            PageSize::Legal => (8.5, 14.0),
            PageSize::Tabloid => (11.0, 17.0),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// Margin style. `Custom` carries explicit per-side values (inches).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginStyle {
    /// All sides 0.
    None,
    /// All sides 0.2in.
    Minimal,
    /// All sides 0.4in.
    Standard,
    /// Caller-supplied values, read from the job's `margin_*` fields.
    Custom,
}

/// Resolved margins (inches), all sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Top margin, inches.
    pub top: f64,
    /// Bottom margin, inches.
    pub bottom: f64,
    /// Left margin, inches.
    pub left: f64,
    /// Right margin, inches.
    pub right: f64,
}

impl MarginStyle {
    /// Resolves this style into concrete margins. `custom` is only consulted
    /// when `self == Custom`.
    pub fn resolve(self, custom: Margins) -> Margins {
        match self {
            MarginStyle::None => Margins { top: 0.0, bottom: 0.0, left: 0.0, right: 0.0 },
            MarginStyle::Minimal => Margins { top: 0.2, bottom: 0.2, left: 0.2, right: 0.2 },
            MarginStyle::Standard => Margins { top: 0.4, bottom: 0.4, left: 0.4, right: 0.4 },
            MarginStyle::Custom => custom,
        }
    }
}

/// The unit of work submitted to [`crate::coordinator::RenderCoordinator::render`].
///
/// Once constructed, a job's fields are immutable; it is consumed by exactly
/// one coordinator call and discarded afterward.
pub struct Job {
    /// Opaque identifier used only for log/metric correlation.
    pub id: String,
    /// The package reader this job owns. Taken by the coordinator and handed
    /// to the server slot's asset server for the job's duration.
    pub package: PackageReader,
    /// Entry within the package to open first.
    pub index_name: String,
    /// Target page size.
    pub page_size: PageSize,
    /// Margin style.
    pub margin_style: MarginStyle,
    /// Custom margins, consulted only when `margin_style == Custom`.
    pub custom_margins: Margins,
    /// Landscape orientation.
    pub landscape: bool,
    /// Settle sleep, milliseconds. Used only when `use_js_event == false`.
    pub settling_ms: u64,
    /// Total per-job navigation/PDF budget, seconds.
    pub job_timeout_secs: u64,
    /// Readiness-signal budget, seconds. Used only when `use_js_event == true`.
    pub js_timeout_secs: u64,
    /// Readiness mode selector.
    pub use_js_event: bool,
    /// Whether the browser should ignore TLS certificate errors for this job.
    pub ignore_ssl_errors: bool,
}

impl Job {
    /// Builds a job with the §6 defaults (A4, standard margins are NOT
    /// assumed here — callers must set `margin_style` explicitly, since the
    /// HTTP boundary requires it).
    pub fn new(id: impl Into<String>, package: PackageReader) -> Self {
        Self {
            id: id.into(),
            package,
            index_name: "report.html".to_string(),
            page_size: PageSize::default(),
            margin_style: MarginStyle::Standard,
            custom_margins: Margins { top: 0.0, bottom: 0.0, left: 0.0, right: 0.0 },
            landscape: false,
            settling_ms: 200,
            job_timeout_secs: 120,
            js_timeout_secs: 30,
            use_js_event: false,
            ignore_ssl_errors: false,
        }
    }
}

/// The outcome of a single render job, returned by value.
#[derive(Debug, Clone)]
pub struct JobResult {
    /// Wall-clock seconds from end of resource acquisition to end of the PDF
    /// stream read.
    pub elapsed_seconds: f64,
    /// Whether the job completed without error.
    pub success: bool,
    /// PDF bytes. Empty on failure.
    pub pdf_bytes: Vec<u8>,
    /// The captured failure cause, if any.
    pub error: Option<RenderError>,
}

impl JobResult {
    /// Builds a successful result.
    pub fn ok(elapsed_seconds: f64, pdf_bytes: Vec<u8>) -> Self {
        Self { elapsed_seconds, success: true, pdf_bytes, error: None }
    }

    /// Builds a failed result; `pdf_bytes` is always empty.
    pub fn failed(elapsed_seconds: f64, error: RenderError) -> Self {
        Self { elapsed_seconds, success: false, pdf_bytes: Vec::new(), error: Some(error) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_dimensions() {
        assert_eq!(PageSize::A3.dimensions_in(), (11.7, 16.5));
        assert_eq!(PageSize::A4.dimensions_in(), (8.3, 11.7));
        assert_eq!(PageSize::A5.dimensions_in(), (5.8, 8.3));
        assert_eq!(PageSize::Letter.dimensions_in(), (8.5, 11.0));
        assert_eq!(PageSize::Legal.dimensions_in(), (8.5, 14.0));
        assert_eq!(PageSize::Tabloid.dimensions_in(), (11.0, 17.0));
    }

    #[test]
    fn test_margin_style_resolution() {
        let custom = Margins { top: 1.0, bottom: 2.0, left: 3.0, right: 4.0 };
        assert_eq!(
            MarginStyle::None.resolve(custom),
            Margins { top: 0.0, bottom: 0.0, left: 0.0, right: 0.0 }
        );
        assert_eq!(
            MarginStyle::Minimal.resolve(custom),
            Margins { top: 0.2, bottom: 0.2, left: 0.2, right: 0.2 }
        );
        assert_eq!(
            MarginStyle::Standard.resolve(custom),
            Margins { top: 0.4, bottom: 0.4, left: 0.4, right: 0.4 }
        );
        assert_eq!(MarginStyle::Custom.resolve(custom), custom);
    }

    #[test]
    fn test_job_result_failed_has_empty_bytes() {
        let result = JobResult::failed(0.1, RenderError::RenderFailure("x".into()));
        assert!(result.pdf_bytes.is_empty());
        assert!(!result.success);
    }
}
