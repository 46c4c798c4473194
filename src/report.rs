//! Test result accumulation and pass/fail thresholds.
//!
//! The two thresholds deliberately differ in boundary inclusivity: scripted
//! exercises pass at a success rate of exactly 90.0%, while a stress run
//! fails at an error rate of exactly 5.0%. Both boundaries are load-bearing
//! and covered by tests.

/// Minimum success rate (percent) for an input or output exercise to pass.
/// The boundary is inclusive: exactly 90.0 passes.
pub const PASS_RATE_FLOOR: f64 = 90.0;

/// Error-rate ceiling (percent) for a stress run. The boundary is exclusive:
/// exactly 5.0 fails.
pub const ERROR_RATE_CEILING: f64 = 5.0;

/// Outcome of one exercise or stress run.
#[derive(Clone, Debug, PartialEq)]
pub struct TestResult {
    /// Human-readable identifier, e.g. `helm_main.throttle: input`.
    pub label: String,
    /// Whether the run met its threshold.
    pub passed: bool,
    /// The percentage the verdict was based on (success rate or error rate).
    pub metric: f64,
}

/// Aggregate counts for a finished session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    /// Number of passing results.
    pub passed: usize,
    /// Number of failing results.
    pub failed: usize,
    /// Overall pass percentage, 0 when no tests ran.
    pub pass_rate: f64,
}

/// Append-only collection of [`TestResult`] entries for a session.
#[derive(Debug, Default)]
pub struct TestReport {
    results: Vec<TestResult>,
}

impl TestReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome.
    pub fn record(&mut self, label: impl Into<String>, passed: bool, metric: f64) {
        self.results.push(TestResult {
            label: label.into(),
            passed,
            metric,
        });
    }

    /// All recorded results in insertion order.
    #[must_use]
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Compute aggregate counts.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let passed = self.results.iter().filter(|r| r.passed).count();
        let failed = self.results.len() - passed;
        let pass_rate = percentage(passed, self.results.len());
        Summary {
            passed,
            failed,
            pass_rate,
        }
    }
}

/// `100 × part / whole`, 0 when `whole` is 0.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "test counts are far below 2^52")]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

/// Whether `succeeded` out of `total` sends meets the exercise pass bar.
#[must_use]
pub fn meets_pass_rate(succeeded: usize, total: usize) -> bool {
    percentage(succeeded, total) >= PASS_RATE_FLOOR
}

/// Whether `errors` out of `errors + successes` attempts stays within the
/// stress error budget.
#[must_use]
pub fn within_error_budget(errors: usize, successes: usize) -> bool {
    error_rate(errors, successes) < ERROR_RATE_CEILING
}

/// `100 × errors / (errors + successes)`, guarded against a zero denominator.
#[must_use]
pub fn error_rate(errors: usize, successes: usize) -> f64 {
    percentage(errors, (errors + successes).max(1))
}
