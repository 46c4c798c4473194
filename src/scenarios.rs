//! Hard-coded exercise tables for the known panel types.
//!
//! These are parameter tables only: each scenario is consumed through the
//! public send/wait operations by [`crate::runner::PanelTester`]. The value
//! sweeps and command sequences mirror the devices fitted to the helm,
//! tactical weapons and communications panels.

use serde_json::{Value, json};

/// One command for an output device.
#[derive(Clone, Debug)]
pub struct OutputCommand {
    /// Command name understood by the device, e.g. `set_brightness`.
    pub command: &'static str,
    /// Command argument; shape varies by command.
    pub value: Value,
    /// Optional free-form context forwarded with the command.
    pub context: Option<Value>,
}

impl OutputCommand {
    fn new(command: &'static str, value: Value) -> Self {
        Self {
            command,
            value,
            context: None,
        }
    }
}

/// Value sweep for one input device.
#[derive(Clone, Debug)]
pub struct InputExercise {
    /// Device under test.
    pub device_id: &'static str,
    /// Values sent in order.
    pub values: Vec<f64>,
}

/// Command sequence for one output device.
#[derive(Clone, Debug)]
pub struct OutputExercise {
    /// Device under test.
    pub device_id: &'static str,
    /// Commands sent in order.
    pub commands: Vec<OutputCommand>,
}

/// Full exercise script for one panel.
#[derive(Clone, Debug)]
pub struct PanelScenario {
    /// Display name used in progress output.
    pub name: &'static str,
    /// Panel identifier on the wire.
    pub panel_id: &'static str,
    /// Input sweeps, run first.
    pub inputs: Vec<InputExercise>,
    /// Output sequences, run after the inputs.
    pub outputs: Vec<OutputExercise>,
}

fn input(device_id: &'static str, values: &[f64]) -> InputExercise {
    InputExercise {
        device_id,
        values: values.to_vec(),
    }
}

/// Helm panel: flight controls plus the engine LED and nav display.
#[must_use]
pub fn helm() -> PanelScenario {
    PanelScenario {
        name: "Helm Panel",
        panel_id: "helm_main",
        inputs: vec![
            input("throttle", &[0.0, 0.25, 0.5, 0.75, 1.0, 0.0]),
            input("rudder", &[-1.0, -0.5, 0.0, 0.5, 1.0, 0.0]),
            input("pitch", &[-1.0, 0.0, 1.0, 0.0]),
            input("roll", &[-1.0, 0.0, 1.0, 0.0]),
            input("autopilot_btn", &[0.0, 1.0, 0.0]),
            input("warp_dial", &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 0.0]),
        ],
        outputs: vec![
            OutputExercise {
                device_id: "engine_led",
                commands: vec![
                    OutputCommand::new("set_brightness", json!(0)),
                    OutputCommand::new("set_brightness", json!(128)),
                    OutputCommand::new("set_brightness", json!(255)),
                    OutputCommand::new("blink", json!({"rate": 500, "duration": 3000})),
                    OutputCommand::new("set_brightness", json!(0)),
                ],
            },
            OutputExercise {
                device_id: "nav_display",
                commands: vec![
                    OutputCommand::new("set_text", json!("0000")),
                    OutputCommand::new("set_text", json!("1234")),
                    OutputCommand::new("set_brightness", json!(15)),
                    OutputCommand::new("set_text", json!("HELM")),
                ],
            },
        ],
    }
}

/// Tactical weapons panel: fire controls, alert lights, status and ammo
/// readouts.
#[must_use]
pub fn tactical() -> PanelScenario {
    PanelScenario {
        name: "Tactical Panel",
        panel_id: "tactical_weapons",
        inputs: vec![
            input("phaser_btn", &[0.0, 1.0, 0.0]),
            input("torpedo_btn", &[0.0, 1.0, 0.0]),
            input("target_lock", &[0.0, 1.0, 0.0]),
            input("shield_power", &[0.0, 0.5, 1.0, 0.75]),
            input("weapon_power", &[0.0, 0.8, 1.0, 0.6]),
        ],
        outputs: vec![
            OutputExercise {
                device_id: "alert_lights",
                commands: vec![
                    // Red alert, yellow alert, green all clear, off.
                    OutputCommand::new("set_all", json!([255, 0, 0])),
                    OutputCommand::new("set_all", json!([255, 255, 0])),
                    OutputCommand::new("set_all", json!([0, 255, 0])),
                    OutputCommand::new("set_all", json!([0, 0, 0])),
                ],
            },
            OutputExercise {
                device_id: "weapon_status",
                commands: vec![
                    OutputCommand::new("set_state", json!(true)),
                    OutputCommand::new("blink", json!({"rate": 200, "duration": 2000})),
                    OutputCommand::new("set_state", json!(false)),
                ],
            },
            OutputExercise {
                device_id: "ammo_display",
                commands: vec![
                    OutputCommand::new("set_text", json!("10")),
                    OutputCommand::new("set_text", json!("05")),
                    OutputCommand::new("set_text", json!("00")),
                    OutputCommand::new("set_text", json!("MAX")),
                ],
            },
        ],
    }
}

/// Communications panel: frequency and channel controls plus signal meters.
#[must_use]
pub fn communications() -> PanelScenario {
    PanelScenario {
        name: "Communication Panel",
        panel_id: "comm_main",
        inputs: vec![
            input("freq_dial", &[0.0, 10.0, 25.0, 50.0, 75.0, 100.0]),
            input("transmit_btn", &[0.0, 1.0, 0.0]),
            input("emergency_btn", &[0.0, 1.0, 0.0]),
            input("channel_sel", &[0.0, 1.0, 2.0, 3.0, 4.0, 0.0]),
        ],
        outputs: vec![
            OutputExercise {
                device_id: "signal_strength",
                commands: vec![
                    OutputCommand::new("set_level", json!(0.0)),
                    OutputCommand::new("set_level", json!(0.3)),
                    OutputCommand::new("set_level", json!(0.7)),
                    OutputCommand::new("set_level", json!(1.0)),
                ],
            },
            OutputExercise {
                device_id: "freq_display",
                commands: vec![
                    OutputCommand::new("set_text", json!("146.5")),
                    OutputCommand::new("set_text", json!("440.0")),
                    OutputCommand::new("set_text", json!("SCAN")),
                ],
            },
        ],
    }
}

/// All known panel scenarios in the order they are run by `--all`.
#[must_use]
pub fn all() -> Vec<PanelScenario> {
    vec![helm(), tactical(), communications()]
}

/// Default value sweep for an ad hoc `--input-test` run.
#[must_use]
pub fn default_input_sweep() -> Vec<f64> {
    vec![0.0, 0.25, 0.5, 0.75, 1.0, 0.0]
}

/// Default command sequence for an ad hoc `--output-test` run.
#[must_use]
pub fn default_output_commands() -> Vec<OutputCommand> {
    vec![
        OutputCommand::new("set_brightness", json!(0)),
        OutputCommand::new("set_brightness", json!(255)),
        OutputCommand::new("set_state", json!(false)),
    ]
}
