#![allow(deprecated)]
use assert_cmd::Command;
use botforge_core::action::SubsystemAction;
use botforge_core::catalog::default_catalog;
use botforge_core::command::AtomicCommand;
use botforge_core::group::GroupBuilder;
use botforge_core::project::{CommandEntry, Project};
use botforge_core::step::ActionStep;
use botforge_core::subsystem::Subsystem;
use botforge_core::types::{EndCondition, ParallelEnd};
use predicates::prelude::*;
use tempfile::TempDir;

fn botforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("botforge").unwrap();
    cmd.current_dir(dir.path()).env("BOTFORGE_ROOT", dir.path());
    cmd
}

/// One-subsystem robot: Arm with a motor, a "Raise arm" action, a "Raise"
/// command, and a top-level "Auto" group that invokes it.
fn demo_project() -> Project {
    let catalog = default_catalog();
    let mut arm = Subsystem::new("Arm");
    let motor = arm.add_component("motor", "motor-controller");

    let mut action = SubsystemAction::new("Raise arm", arm.uuid);
    action.steps = vec![ActionStep::new(motor, "stopMotor")];
    action.refresh_params(&arm.components, &catalog);

    let mut raise = AtomicCommand::new("Raise", arm.uuid);
    raise.action = Some(action.uuid);
    raise.end_condition = Some(EndCondition::Once);

    let auto = GroupBuilder::sequential("Auto")
        .configure(|g| {
            g.run(&arm, &raise, []);
        })
        .build()
        .unwrap();

    arm.actions.push(action);
    arm.commands.push(raise);

    let mut project = Project::new("demo");
    project.subsystems.push(arm);
    project.commands.push(CommandEntry::Group(auto));
    project
}

/// Same robot plus a parallel "Race" group whose two children both require
/// the Arm.
fn overlap_project() -> Project {
    let mut project = demo_project();
    let arm = project.subsystems[0].clone();
    let raise = arm.commands[0].clone();
    let race = GroupBuilder::parallel("Race", ParallelEnd::All)
        .configure(|g| {
            g.run(&arm, &raise, []);
            g.run(&arm, &raise, []);
        })
        .build()
        .unwrap();
    project.commands.push(CommandEntry::Group(race));
    project
}

fn write_project(dir: &TempDir, mut project: Project) {
    project
        .save(&dir.path().join("robot.botforge.json"))
        .unwrap();
}

// ---------------------------------------------------------------------------
// botforge init
// ---------------------------------------------------------------------------

#[test]
fn init_scaffolds_workspace() {
    let dir = TempDir::new().unwrap();
    botforge(&dir).arg("init").assert().success();

    assert!(dir.path().join("botforge.yaml").exists());
    assert!(dir.path().join("robot.botforge.json").exists());
    assert!(dir.path().join("generated").is_dir());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    botforge(&dir).arg("init").assert().success();
    botforge(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
}

// ---------------------------------------------------------------------------
// botforge generate
// ---------------------------------------------------------------------------

#[test]
fn generate_all_prints_fragments() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .args(["generate", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("public void raiseArm()"))
        .stdout(predicate::str::contains("public Command raise()"))
        .stdout(predicate::str::contains("public Command auto()"))
        .stdout(predicate::str::contains("this.arm.raise()"));
}

#[test]
fn generate_all_write_creates_files() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .args(["generate", "all", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 3 fragment(s)"));

    let out = dir.path().join("generated");
    assert!(out.join("Arm.raiseArm.java").exists());
    assert!(out.join("Arm.raise.java").exists());
    let auto = std::fs::read_to_string(out.join("auto.java")).unwrap();
    assert!(auto.contains("public Command auto()"));
    assert!(auto.ends_with('\n'));
}

#[test]
fn generate_subsystem_by_name() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .args(["generate", "subsystem", "Arm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("raiseArm"));

    botforge(&dir)
        .args(["generate", "subsystem", "Claw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no subsystem named 'Claw'"));
}

#[test]
fn generate_command_by_name() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .args(["generate", "command", "Auto"])
        .assert()
        .success()
        .stdout(predicate::str::contains("public Command auto()"));

    botforge(&dir)
        .args(["generate", "command", "Teleport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no command named 'Teleport'"));
}

#[test]
fn generate_without_project_fails() {
    let dir = TempDir::new().unwrap();
    botforge(&dir)
        .args(["generate", "all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load project"));
}

// ---------------------------------------------------------------------------
// botforge validate
// ---------------------------------------------------------------------------

#[test]
fn validate_clean_project() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found."));
}

#[test]
fn validate_parallel_overlap_is_a_warning_by_default() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, overlap_project());

    botforge(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("share subsystem requirement"));
}

#[test]
fn validate_strict_config_escalates_overlap() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, overlap_project());
    std::fs::write(
        dir.path().join("botforge.yaml"),
        "strict_parallel_requirements: true\n",
    )
    .unwrap();

    botforge(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("validation failed"));
}

#[test]
fn validate_json_emits_findings() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, overlap_project());

    botforge(&dir)
        .args(["validate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"severity\": \"warning\""))
        .stdout(predicate::str::contains("share subsystem requirement"));
}

#[test]
fn validate_surfaces_dropped_entries() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("robot.botforge.json"),
        r#"{
            "name": "demo",
            "commands": [
                { "kind": "TeleportGroup", "uuid": "0f0e1db6-98c4-4f0e-8a3b-0c9f6d2e4a12" },
                { "kind": "SequentialGroup", "uuid": "1a2b1db6-98c4-4f0e-8a3b-0c9f6d2e4a13", "name": "Auto" }
            ]
        }"#,
    )
    .unwrap();

    botforge(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("entry dropped during load"));

    botforge(&dir)
        .args(["project", "commands"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Auto"));
}

// ---------------------------------------------------------------------------
// botforge project
// ---------------------------------------------------------------------------

#[test]
fn project_info_counts() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .args(["project", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: demo"))
        .stdout(predicate::str::contains("Subsystems: 1"));
}

#[test]
fn project_subsystem_listing() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .args(["project", "subsystems"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Arm"));
}

#[test]
fn project_command_listing() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    botforge(&dir)
        .args(["project", "commands"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Raise"))
        .stdout(predicate::str::contains("Auto"))
        .stdout(predicate::str::contains("sequential"));
}

#[test]
fn project_commands_json() {
    let dir = TempDir::new().unwrap();
    write_project(&dir, demo_project());

    let output = botforge(&dir)
        .args(["project", "commands", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listing: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let names: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Auto", "Raise"]);
}
