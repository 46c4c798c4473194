//! Command line interface for the `paneldiag` binary.

use clap::Parser;

/// Command line arguments for the `paneldiag` binary.
#[derive(Debug, Parser)]
#[command(name = "paneldiag", version, about = "Control panel diagnostic client")]
pub struct Cli {
    /// Server host address.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port.
    #[arg(long, default_value_t = 8081)]
    pub port: u16,

    /// Test a specific panel (helm_main, tactical_weapons, comm_main, ...).
    #[arg(long)]
    pub panel: Option<String>,

    /// Test all known panel types.
    #[arg(long)]
    pub all: bool,

    /// Run a stress test against --panel for N seconds.
    #[arg(long, value_name = "SECONDS")]
    pub stress: Option<u64>,

    /// Exercise a specific input device with the default value sweep.
    #[arg(long, num_args = 2, value_names = ["PANEL", "DEVICE"])]
    pub input_test: Option<Vec<String>>,

    /// Exercise a specific output device with the default command sequence.
    #[arg(long, num_args = 2, value_names = ["PANEL", "DEVICE"])]
    pub output_test: Option<Vec<String>>,
}
