//! `paneldiag` binary: connect to a panel backend and run the selected tests.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use paneldiag::{
    PanelConnection, PanelTester,
    report::TestReport,
    scenarios,
};
use tokio::time::Duration;

/// Bound on the initial connect attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();

    let conn = match PanelConnection::connect(&cli.host, cli.port, CONNECT_TIMEOUT).await {
        Ok(conn) => {
            println!("Connected to server {}:{}", cli.host, cli.port);
            conn
        }
        Err(e) => {
            eprintln!("Failed to connect to server: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut tester = PanelTester::new(conn);
    let ran = dispatch(&cli, &mut tester).await;

    if ran {
        print_summary(tester.report());
    } else {
        eprintln!("No test specified. Use --help for options.");
    }

    tester.connection().disconnect().await;
    if ran { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Run whichever test the arguments selected; false when none was.
async fn dispatch(cli: &cli::Cli, tester: &mut PanelTester) -> bool {
    if cli.all {
        println!("\n{:=<50}", "");
        println!("PANEL TESTER");
        println!("{:=<50}", "");
        tester.run_scenarios(&scenarios::all()).await;
        return true;
    }

    if let Some(panel_id) = &cli.panel {
        if let Some(seconds) = cli.stress {
            tester
                .stress(panel_id, Duration::from_secs(seconds))
                .await;
        } else {
            tester.verify_connection(panel_id).await;
        }
        return true;
    }

    if let Some(args) = &cli.input_test {
        let (panel_id, device_id) = (&args[0], &args[1]);
        tester
            .exercise_input(panel_id, device_id, &scenarios::default_input_sweep())
            .await;
        return true;
    }

    if let Some(args) = &cli.output_test {
        let (panel_id, device_id) = (&args[0], &args[1]);
        tester
            .exercise_output(panel_id, device_id, &scenarios::default_output_commands())
            .await;
        return true;
    }

    false
}

fn print_summary(report: &TestReport) {
    println!("\n{:=<50}", "");
    println!("TEST SUMMARY");
    println!("{:=<50}", "");

    for result in report.results() {
        let mark = if result.passed { "PASS" } else { "FAIL" };
        println!("[{mark}] {}", result.label);
    }

    let summary = report.summary();
    let total = summary.passed + summary.failed;
    if total > 0 {
        println!(
            "\nOverall Results: {}/{} tests passed ({:.1}%)",
            summary.passed, total, summary.pass_rate
        );
    } else {
        println!("\nNo tests completed");
    }
}
