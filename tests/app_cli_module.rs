use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ebo-wizard"))
        .args(args)
        .env("HOME", home)
        .output()
        .expect("run ebo-wizard")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn assert_err_contains(output: &Output, needle: &str) {
    assert!(
        !output.status.success(),
        "expected failure, stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
    let text = format!("{}{}", stdout(output), stderr(output));
    assert!(
        text.contains(needle),
        "expected error to contain `{needle}`, got:\n{text}"
    );
}

fn write_catalog(path: &Path) {
    fs::write(
        path,
        json!({
            "workTypes": [{"id": "wt-gas", "name": "Gas"}],
            "hazards": [{"id": "hz-load", "name": "Suspended load"}],
            "tasks": [{
                "id": "t-rig",
                "name": "Rigging",
                "workTypeIds": ["wt-gas"],
                "activityGroups": [{"id": "ag-lifting", "name": "Lifting"}],
                "hazards": [{"hazardId": "hz-load", "applicability": "ALWAYS"}]
            }],
            "opcos": [{"id": "opco-south", "name": "South"}]
        })
        .to_string(),
    )
    .expect("write catalog");
}

fn details(kind: &str, fields: Value) -> Value {
    let mut payload = fields;
    payload["type"] = json!(kind);
    json!({"type": "observation_details", "payload": payload})
}

fn write_script(path: &Path, actions: Vec<Value>) {
    fs::write(
        path,
        json!({
            "now": "2024-05-10T12:00:00Z",
            "user": {"id": "u-1", "name": "Robin"},
            "actions": actions
        })
        .to_string(),
    )
    .expect("write script");
}

fn save() -> Value {
    json!({"type": "save_ebo", "payload": {"phase": "started"}})
}

fn created_ebo_id(output: &Output) -> String {
    stdout(output)
        .lines()
        .find_map(|line| line.strip_prefix("ebo: "))
        .expect("ebo line")
        .to_string()
}

#[test]
fn help_and_unknown_commands() {
    let home = tempdir().expect("tempdir");
    let output = run(home.path(), &[]);
    assert_ok(&output);
    assert!(stdout(&output).contains("Commands:"));
    assert_ok(&run(home.path(), &["--help"]));

    assert_err_contains(&run(home.path(), &["frobnicate"]), "unknown command `frobnicate`");
    assert_err_contains(&run(home.path(), &["list", "--verbose", "yes"]), "unknown flag --verbose");
}

#[test]
fn record_commands_default_to_the_home_state_root() {
    let home = tempdir().expect("tempdir");
    let output = run(home.path(), &["list"]);
    assert_ok(&output);
    assert_eq!(stdout(&output).trim(), "no ebos");
    assert!(home.path().join(".ebo-wizard/ebos").is_dir());

    assert_err_contains(
        &run(home.path(), &["show", "ebo-missing"]),
        "ebo `ebo-missing` does not exist",
    );
    assert_err_contains(
        &run(home.path(), &["delete", "ebo-missing"]),
        "ebo `ebo-missing` does not exist",
    );
    assert_err_contains(&run(home.path(), &["show"]), "usage: show <ebo-id>");
}

#[test]
fn scripted_run_saves_then_records_can_be_managed() {
    let home = tempdir().expect("tempdir");
    let state = home.path().join("state");
    let state_root = state.to_str().expect("utf-8 path");
    let tenant = home.path().join("tenant.yaml");
    fs::write(&tenant, "tenant: urbint\n").expect("write tenant");
    let catalog = home.path().join("catalog.json");
    write_catalog(&catalog);
    let script = home.path().join("script.json");
    write_script(
        &script,
        vec![
            details("observation_date_changed", json!({"value": "2024-05-09"})),
            details("observation_time_changed", json!({"value": "07:30"})),
            details("work_types_changed", json!({"work_type_ids": ["wt-gas"]})),
            details("op_co_changed", json!({"opco_id": "opco-south"})),
            details("department_changed", json!({"department_id": "dept-ops"})),
            details("work_location_changed", json!({"value": "Main St"})),
            details("location_name_changed", json!({"value": "Regulator station"})),
            save(),
        ],
    );

    let output = run(
        home.path(),
        &[
            "run",
            "--tenant",
            tenant.to_str().expect("utf-8 path"),
            "--catalog",
            catalog.to_str().expect("utf-8 path"),
            "--script",
            script.to_str().expect("utf-8 path"),
            "--state-root",
            state_root,
        ],
    );
    assert_ok(&output);
    let text = stdout(&output);
    assert!(text.contains("status: in_progress"), "{text}");
    assert!(text.contains("step: highEnergyTasks"), "{text}");
    assert!(text.contains("observationDetails=saved"), "{text}");
    let ebo_id = created_ebo_id(&output);
    assert_ne!(ebo_id, "(unsaved)");

    let listed = run(home.path(), &["list", "--state-root", state_root]);
    assert_ok(&listed);
    assert_eq!(
        stdout(&listed).trim(),
        format!("{ebo_id}\tin_progress\tRobin")
    );

    let shown = run(home.path(), &["show", &ebo_id, "--state-root", state_root]);
    assert_ok(&shown);
    let record: Value = serde_json::from_str(&stdout(&shown)).expect("show prints json");
    assert_eq!(record["contents"]["details"]["workLocation"], "Main St");
    assert_eq!(record["createdBy"]["name"], "Robin");

    fs::copy(&tenant, state.join("tenant.yaml")).expect("install tenant");
    fs::copy(&catalog, state.join("catalog.json")).expect("install catalog");
    write_script(
        &script,
        vec![json!({"type": "nav_to", "payload": "summary"}), save()],
    );
    let resumed = run(
        home.path(),
        &[
            "run",
            "--script",
            script.to_str().expect("utf-8 path"),
            "--ebo",
            &ebo_id,
            "--state-root",
            state_root,
        ],
    );
    assert_ok(&resumed);
    let text = stdout(&resumed);
    assert!(text.contains("focus: highEnergyTasks"), "{text}");
    assert!(text.contains("form error: "), "{text}");
    assert!(text.contains("step: summary"), "{text}");

    assert_err_contains(
        &run(home.path(), &["reopen", &ebo_id, "--state-root", state_root]),
        "ebo cannot move from in_progress to reopened",
    );
    let deleted = run(home.path(), &["delete", &ebo_id, "--state-root", state_root]);
    assert_ok(&deleted);
    assert_eq!(stdout(&deleted).trim(), format!("deleted ebo {ebo_id}"));

    let log = fs::read_to_string(state.join("logs/wizard.log")).expect("wizard log");
    assert!(log.contains("\"event\":\"ebo.save\""));
    assert!(log.contains("\"event\":\"ebo.delete\""));
}

#[test]
fn rejected_actions_are_reported_and_the_run_continues() {
    let home = tempdir().expect("tempdir");
    let state = home.path().join("state");
    fs::create_dir_all(&state).expect("create state");
    fs::write(state.join("tenant.yaml"), "tenant: xcelenergy\n").expect("write tenant");
    write_catalog(&state.join("catalog.json"));
    let script = home.path().join("script.json");
    write_script(
        &script,
        vec![
            json!({"type": "nav_to", "payload": "personnel"}),
            json!({"type": "nav_to", "payload": "photos"}),
        ],
    );

    let output = run(
        home.path(),
        &[
            "run",
            "--script",
            script.to_str().expect("utf-8 path"),
            "--state-root",
            state.to_str().expect("utf-8 path"),
        ],
    );
    assert_ok(&output);
    let text = stdout(&output);
    assert!(text.contains("rejected nav_to: "), "{text}");
    assert!(text.contains("step: photos"), "{text}");
    assert!(text.contains("ebo: (unsaved)"), "{text}");
    assert!(!text.contains("personnel="), "{text}");
}

#[test]
fn run_requires_a_script() {
    let home = tempdir().expect("tempdir");
    assert_err_contains(&run(home.path(), &["run"]), "missing required flag --script");
}
