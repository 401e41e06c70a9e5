//! Binary-level tests for the `dicer` command line.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A temp directory holding a role file with an investigator and a rival.
fn role_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("roles.json"),
        r#"{
  "1": {
    "name": "调查员",
    "ability": { "力量": 60, "理智": 50 },
    "skill": { "侦查": 40 }
  },
  "2": { "name": "对手", "ability": { "生命值": 30 } }
}
"#,
    )
    .unwrap();
    dir
}

fn roles_path(dir: &TempDir) -> String {
    dir.path().join("roles.json").display().to_string()
}

fn read_roles(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn dicer() -> Command {
    Command::cargo_bin("dicer").unwrap()
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[test]
fn roll_constant_expression() {
    dicer()
        .args(["roll", "1+2*3"])
        .assert()
        .success()
        .stdout("1+2*3=7\n");
}

#[test]
fn roll_is_reproducible_with_seed() {
    let first = dicer()
        .args(["roll", "4d6", "--seed", "42"])
        .output()
        .unwrap();
    let second = dicer()
        .args(["roll", "4d6", "--seed", "42"])
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8(first.stdout).unwrap().starts_with("4d6=["));
}

#[test]
fn roll_reports_expression_errors() {
    dicer()
        .args(["roll", "1/0"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}

// ---------------------------------------------------------------------------
// range
// ---------------------------------------------------------------------------

#[test]
fn range_of_dice() {
    dicer()
        .args(["range", "2d6+1"])
        .assert()
        .success()
        .stdout("[3, 13]\n");
}

#[test]
fn range_uses_default_faces() {
    dicer()
        .args(["range", "d", "--faces", "20"])
        .assert()
        .success()
        .stdout("[1, 20]\n");
}

// ---------------------------------------------------------------------------
// exec
// ---------------------------------------------------------------------------

#[test]
fn exec_skill_check() {
    let dir = role_dir();
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1", "--seed", "3"])
        .args(["--", ".rc", "侦查"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("调查员进行侦查检定：D100="));
}

#[test]
fn exec_setter_writes_role_file() {
    let dir = role_dir();
    let path = dir.path().join("roles.json");
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1"])
        .args(["--", ".st", "力量70", "侦查+5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("调查员的属性已更新"));
    let roles = read_roles(&path);
    assert_eq!(roles["1"]["ability"]["力量"], 70);
    assert_eq!(roles["1"]["skill"]["侦查"], 45);
    assert_eq!(roles["1"]["name"], "调查员");
}

#[test]
fn exec_mention_targets_other_role() {
    let dir = role_dir();
    let path = dir.path().join("roles.json");
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1", "--mention", "2"])
        .args(["--ruleset", "pokemon", "--", ".st", "hp-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("对手的属性已更新"));
    assert_eq!(read_roles(&path)["2"]["ability"]["生命值"], 20);
}

#[test]
fn exec_hidden_roll_is_private() {
    let dir = role_dir();
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1"])
        .args(["--", ".rc", "h", "侦查"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[私聊] 调查员进行侦查检定"))
        .stdout(predicate::str::contains("调查员进行了一次暗骰"));
}

#[test]
fn exec_common_roll_from_any_ruleset() {
    let dir = role_dir();
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1"])
        .args(["--ruleset", "CofD", "--", ".r", "2+3"])
        .assert()
        .success()
        .stdout("调查员掷骰：2+3=5\n");
}

#[test]
fn exec_without_write_leaves_file_alone() {
    let dir = role_dir();
    let path = dir.path().join("roles.json");
    let before = fs::read_to_string(&path).unwrap();
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1"])
        .args(["--", ".rc", "力量"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn exec_unknown_ruleset_fails() {
    let dir = role_dir();
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1"])
        .args(["--ruleset", "dnd5e", "--", ".r"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("未知的规则：dnd5e"));
}

#[test]
fn exec_unknown_command_fails() {
    let dir = role_dir();
    dicer()
        .args(["exec", "--roles", &roles_path(&dir), "--actor", "1"])
        .args(["--", ".xyz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("未知的指令：xyz"));
}

#[test]
fn exec_creates_missing_role_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.json");
    dicer()
        .args(["exec", "--roles", &path.display().to_string(), "--actor", "5"])
        .args(["--", ".st", "力量50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("角色5的属性已更新"));
    assert_eq!(read_roles(&path)["5"]["ability"]["力量"], 50);
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_rulesets() {
    dicer()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("coc7"))
        .stdout(predicate::str::contains("CofD"))
        .stdout(predicate::str::contains("宝可梦trpg"));
}

#[test]
fn list_command_help_by_alias() {
    dicer()
        .args(["list", "coc", "ra"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(".rc："));
}

#[test]
fn list_unknown_ruleset_fails() {
    dicer()
        .args(["list", "dnd5e"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown ruleset"));
}
