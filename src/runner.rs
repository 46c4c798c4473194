//! Scripted exercises and the stress generator.
//!
//! [`PanelTester`] drives a [`PanelConnection`] strictly sequentially:
//! every exercise is a series of sends with scenario-defined pacing, and the
//! connection check is a heartbeat followed by a correlated wait for the
//! configuration reply. Failed sends are countable events, never faults; the
//! pass/fail verdicts come from the thresholds in [`crate::report`].

use leaky_bucket::RateLimiter;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::{
    connection::PanelConnection,
    message::{CONFIG, PanelMessage},
    report::{TestReport, error_rate, meets_pass_rate, percentage, within_error_budget},
    scenarios::{OutputCommand, PanelScenario},
};

/// Delay between input sends; keeps value sweeps readable in server logs.
pub const INPUT_PACING: Duration = Duration::from_millis(100);

/// Delay between output sends; long enough to observe physical effects on
/// the panel. Scenario parameter, not a protocol requirement.
pub const OUTPUT_PACING: Duration = Duration::from_millis(500);

/// How long to wait for the configuration reply to a heartbeat.
pub const CONFIG_WAIT: Duration = Duration::from_secs(10);

/// Messages per stress burst (one per synthetic device).
const STRESS_BURST: usize = 5;

/// Nominal stress send interval; 50 Hz.
const STRESS_INTERVAL: Duration = Duration::from_millis(20);

/// Orchestrates exercises over one connection, accumulating results.
#[derive(Debug)]
pub struct PanelTester {
    conn: PanelConnection,
    report: TestReport,
}

impl PanelTester {
    /// Wrap an established connection.
    #[must_use]
    pub fn new(conn: PanelConnection) -> Self {
        Self {
            conn,
            report: TestReport::new(),
        }
    }

    /// Results accumulated so far.
    #[must_use]
    pub fn report(&self) -> &TestReport {
        &self.report
    }

    /// Access the underlying connection, e.g. to disconnect.
    pub fn connection(&mut self) -> &mut PanelConnection {
        &mut self.conn
    }

    /// Send a heartbeat for `panel_id` and wait for a configuration reply.
    ///
    /// Passes iff a `panel_config` message arrives within [`CONFIG_WAIT`];
    /// the reported device count is read from the reply payload.
    pub async fn verify_connection(&mut self, panel_id: &str) -> bool {
        println!("\n=== Testing Panel Connection: {panel_id} ===");

        if self.conn.send(&PanelMessage::heartbeat(panel_id)).await.is_err() {
            self.report
                .record(format!("{panel_id}: Failed to send heartbeat"), false, 0.0);
            return false;
        }
        println!("Sent heartbeat for {panel_id}");

        match self.conn.wait_for(CONFIG, CONFIG_WAIT).await {
            Some(config) => {
                let devices = config.device_count();
                println!("Received configuration with {devices} devices");
                self.report.record(
                    format!("{panel_id}: Connection successful ({devices} devices)"),
                    true,
                    100.0,
                );
                true
            }
            None => {
                self.report.record(
                    format!("{panel_id}: No configuration received"),
                    false,
                    0.0,
                );
                false
            }
        }
    }

    /// Send each value in order as a `panel_input` message.
    ///
    /// Passes iff at least 90% of the sends succeed (inclusive boundary).
    pub async fn exercise_input(
        &mut self,
        panel_id: &str,
        device_id: &str,
        values: &[f64],
    ) -> bool {
        println!("\n--- Testing Input Device: {device_id} ---");

        let mut succeeded = 0;
        for &value in values {
            let message = PanelMessage::input(panel_id, device_id, value);
            if self.conn.send(&message).await.is_ok() {
                println!("  Sent {device_id} = {value}");
                succeeded += 1;
                tokio::time::sleep(INPUT_PACING).await;
            } else {
                println!("  Failed to send {device_id} = {value}");
            }
        }

        let rate = percentage(succeeded, values.len());
        println!("  Input test success rate: {rate:.1}%");

        let passed = meets_pass_rate(succeeded, values.len());
        self.report.record(
            format!("{panel_id}.{device_id}: Input test {rate:.1}%"),
            passed,
            rate,
        );
        passed
    }

    /// Send each command in order as a `panel_output` message.
    ///
    /// Same ≥90% pass rule as input exercises, with longer pacing so the
    /// physical effect of each command can be observed.
    pub async fn exercise_output(
        &mut self,
        panel_id: &str,
        device_id: &str,
        commands: &[OutputCommand],
    ) -> bool {
        println!("\n--- Testing Output Device: {device_id} ---");

        let mut succeeded = 0;
        for cmd in commands {
            let message = PanelMessage::output(
                panel_id,
                device_id,
                cmd.command,
                cmd.value.clone(),
                cmd.context.clone(),
            );
            if self.conn.send(&message).await.is_ok() {
                println!("  Sent {} = {}", cmd.command, cmd.value);
                succeeded += 1;
                tokio::time::sleep(OUTPUT_PACING).await;
            } else {
                println!("  Failed to send {} = {}", cmd.command, cmd.value);
            }
        }

        let rate = percentage(succeeded, commands.len());
        println!("  Output test success rate: {rate:.1}%");

        let passed = meets_pass_rate(succeeded, commands.len());
        self.report.record(
            format!("{panel_id}.{device_id}: Output test {rate:.1}%"),
            passed,
            rate,
        );
        passed
    }

    /// Run the full script for one panel: connection check, then every input
    /// sweep, then every output sequence.
    ///
    /// Returns false if the connection check fails; individual exercise
    /// verdicts land in the report either way.
    pub async fn run_scenario(&mut self, scenario: &PanelScenario) -> bool {
        if !self.verify_connection(scenario.panel_id).await {
            return false;
        }
        for exercise in &scenario.inputs {
            self.exercise_input(scenario.panel_id, exercise.device_id, &exercise.values)
                .await;
        }
        for exercise in &scenario.outputs {
            self.exercise_output(scenario.panel_id, exercise.device_id, &exercise.commands)
                .await;
        }
        true
    }

    /// Run a list of scenarios, returning how many completed their
    /// connection check.
    pub async fn run_scenarios(&mut self, scenarios: &[PanelScenario]) -> usize {
        let mut completed = 0;
        for scenario in scenarios {
            println!("\n{:=<20} {} {:=<20}", "", scenario.name, "");
            if self.run_scenario(scenario).await {
                completed += 1;
                println!("{} test completed", scenario.name);
            } else {
                println!("{} test failed", scenario.name);
            }
        }
        completed
    }

    /// Flood the connection with synthetic input messages for `duration`.
    ///
    /// Bursts of [`STRESS_BURST`] sends are paced at a nominal 50 Hz by a
    /// rate limiter. Passes iff the error rate stays strictly below 5.0%.
    pub async fn stress(&mut self, panel_id: &str, duration: Duration) -> bool {
        println!(
            "\n=== Stress Test: {panel_id} ({}s) ===",
            duration.as_secs()
        );

        if !self.verify_connection(panel_id).await {
            return false;
        }

        let limiter = RateLimiter::builder()
            .initial(1)
            .refill(1)
            .interval(STRESS_INTERVAL)
            .max(STRESS_BURST)
            .build();

        let start = Instant::now();
        let mut sent: usize = 0;
        let mut errors: usize = 0;

        while start.elapsed() < duration {
            for device in 0..STRESS_BURST {
                limiter.acquire(1).await;
                let message = PanelMessage::input_with_context(
                    panel_id,
                    &format!("test_device_{device}"),
                    synthetic_value(start.elapsed()),
                    serde_json::json!({"raw_value": sent}),
                );
                match self.conn.send(&message).await {
                    Ok(()) => sent += 1,
                    Err(e) => {
                        debug!(error = %e, "stress send failed");
                        errors += 1;
                    }
                }
            }
        }

        let rate = error_rate(errors, sent);
        println!("Stress test completed:");
        println!("  Messages sent: {sent}");
        println!("  Errors: {errors}");
        println!("  Error rate: {rate:.2}%");

        let passed = within_error_budget(errors, sent);
        self.report.record(
            format!("{panel_id}: Stress test {rate:.2}% errors"),
            passed,
            rate,
        );
        passed
    }
}

/// Sawtooth in `[0, 1)` derived from elapsed time, standing in for a real
/// input reading.
#[expect(clippy::cast_precision_loss, reason = "millisecond remainder is < 1000")]
fn synthetic_value(elapsed: Duration) -> f64 {
    (elapsed.as_millis() % 1000) as f64 / 1000.0
}
