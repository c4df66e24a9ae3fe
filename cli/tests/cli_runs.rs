use std::process::{Command, Output};

use serde_json::Value;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_puzzledrop-cli"))
        .args(args)
        .env_remove("PUZZLEDROP_CONFIG")
        .output()
        .expect("run puzzledrop-cli")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("json on stdout")
}

#[test]
fn layout_dump_is_stable_for_a_seed() {
    let first = run_cli(&["layout", "--seed", "0x2a"]);
    let second = run_cli(&["layout", "--seed", "42"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let layout = stdout_json(&first);
    assert_eq!(layout["crops"].as_array().map(Vec::len), Some(20));
    assert_eq!(layout["tray"].as_array().map(Vec::len), Some(20));
    assert_eq!(layout["crops"][6]["left"].as_f64(), Some(8.0));
    assert_eq!(layout["crops"][6]["top"].as_f64(), Some(6.0));
}

#[test]
fn accurate_bot_wins_a_quick_round() {
    let output = run_cli(&[
        "play",
        "--seed",
        "7",
        "--quiet",
        "--json",
        "--accuracy",
        "1",
        "--dawdle",
        "0",
        "--think-ms",
        "0",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().expect("report line");
    let report: Value = serde_json::from_str(last).expect("report json");
    assert_eq!(report["seed"].as_u64(), Some(7));
    assert_eq!(report["timed"].as_bool(), Some(false));
    assert_eq!(report["outcome"]["phase"], "Won");
    assert_eq!(report["outcome"]["correct"].as_u64(), Some(20));
}

#[test]
fn malformed_seed_is_rejected() {
    let output = run_cli(&["layout", "--seed", "0xnope"]);
    assert!(!output.status.success());
}
