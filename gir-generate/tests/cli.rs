use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use assert_cmd::cargo::cargo_bin;
use assert_cmd::prelude::*;
use tempfile::TempDir;

const REPOSITORY: &str = r#"{
    "namespace": {"name": "Foo", "version": "1.0", "shared_library": "libfoo-1.so.0"},
    "packages": [{"name": "foo-1"}, {"name": "foo-1-x11"}],
    "c_includes": [{"name": "foo/foo.h"}],
    "nodes": [
        {
            "kind": "record",
            "name": "Point",
            "c_type": "FooPoint",
            "fields": [{"name": "x", "type": "gint"}, {"name": "priv", "type": "gpointer"}],
            "methods": [{"name": "free", "c_identifier": "foo_point_free"}]
        },
        {
            "kind": "record",
            "name": "WidgetPrivate",
            "c_type": "FooWidgetPrivate",
            "source_position": {"filename": "foo/foo-private.h", "line": 3}
        },
        {
            "kind": "enum",
            "name": "Mode",
            "c_type": "FooMode",
            "members": [
                {"name": "one", "value": 1, "c_identifier": "FOO_MODE_ONE"},
                {"name": "two", "value": 2, "c_identifier": "FOO_MODE_TWO"}
            ]
        },
        {
            "kind": "callback",
            "name": "PointReady",
            "c_type": "FooPointReady",
            "parameters": [
                {"name": "point", "type": "Point", "c_type": "FooPoint*", "transfer_ownership": "full"},
                {"name": "user_data", "type": "gpointer", "c_type": "gpointer", "closure": 1}
            ]
        }
    ]
}"#;

fn setup(config: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("gir")).unwrap();
    fs::write(dir.path().join("gir/Foo-1.0.json"), REPOSITORY).unwrap();
    fs::write(dir.path().join("girgen.toml"), config).unwrap();
    dir
}

fn run(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("gir-generate"));
    cmd.arg(dir.join("girgen.toml")).env_remove("GIRGEN_RUNTIME_LINK");
    cmd
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read output")).expect("parse output")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help() {
    let assert = Command::new(cargo_bin("gir-generate")).arg("help").assert().success();
    assert!(stdout(assert.get_output()).contains("Usage:"));
}

#[test]
fn test_generate() {
    let dir = setup(
        r#"
repositories = ["gir/Foo-1.0.json"]

[[namespace]]
name = "Foo-1.0"
output = "out/foo"
filters = [{ file = "private" }]

[[namespace.preprocess]]
kind = "remove-packages"
gir-file = "Foo-1.0.json"
names = ["/-x11$/"]

[[namespace.preprocess]]
kind = "remove-record-fields"
gir-type = "Foo-1.0.Point"
fields = ["priv"]

[[namespace.preprocess]]
kind = "rename-type"
gir-type = "Foo-1.0.Mode"
new-name = "Kind"

[[namespace.preprocess]]
kind = "rename-enum-members"
gir-type = "Foo-1.0.Kind"
regex = "ONE"
replace = "FIRST"
"#,
    );
    run(dir.path()).assert().success();

    let out = dir.path().join("out/foo");
    let model = read_json(&out.join("Foo-1.0.json"));
    let names: Vec<_> = model["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Point", "Kind", "PointReady"]);
    assert_eq!(model["packages"].as_array().unwrap().len(), 1);
    assert_eq!(model["nodes"][0]["fields"].as_array().unwrap().len(), 1);
    assert_eq!(
        model["nodes"][1]["members"][0]["c_identifier"],
        "FOO_MODE_FIRST"
    );

    let trampolines = fs::read_to_string(out.join("trampolines.rs")).unwrap();
    assert!(trampolines.contains("_girgen_foo1_PointReady"));
    assert!(trampolines.contains("#[link(name = \"foo-1\")]"));
    assert!(trampolines.contains("foo_point_free"));
}

#[test]
fn test_runtime_link_mode() {
    let dir = setup(
        r#"
repositories = ["gir/Foo-1.0.json"]

[[namespace]]
name = "Foo-1"
output = "out"
"#,
    );
    let assert = run(dir.path()).env("GIRGEN_RUNTIME_LINK", "1").assert().success();
    assert!(stderr(assert.get_output()).contains("experimental"));
    let trampolines = fs::read_to_string(dir.path().join("out/trampolines.rs")).unwrap();
    assert!(!trampolines.contains("#[link("));
}

#[test]
fn test_configuration_errors_fail_the_run() {
    let dir = setup(
        r#"
repositories = ["gir/Foo-1.0.json"]

[[namespace]]
name = "Foo-1.0"
output = "out"
filters = [{ regex = "Foo.(" }]

[[namespace.preprocess]]
kind = "rename-type"
gir-type = "Foo.Point"
new-name = "Vec2"
"#,
    );
    let assert = run(dir.path()).assert().failure().code(1);
    assert!(stderr(assert.get_output()).contains("2 error(s)"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_preprocessing_errors_fail_the_run() {
    let dir = setup(
        r#"
repositories = ["gir/Foo-1.0.json"]

[[namespace]]
name = "Foo-1.0"
output = "out"

[[namespace.preprocess]]
kind = "rename-enum-members"
gir-type = "Foo-1.0.Point"
regex = "A"
replace = "B"
"#,
    );
    let assert = run(dir.path()).assert().failure();
    assert!(stderr(assert.get_output()).contains("expected enum"));
}

#[test]
fn test_missing_targets_are_soft() {
    let dir = setup(
        r#"
repositories = ["gir/Foo-1.0.json"]

[[namespace]]
name = "Foo-1.0"
output = "out"

[[namespace.preprocess]]
kind = "rename-type"
gir-type = "Foo-1.0.Missing"
new-name = "StillMissing"

[[namespace.preprocess]]
kind = "remove-c-includes"
gir-file = "Bar-2.0.json"
names = ["bar.h"]
"#,
    );
    run(dir.path()).assert().success();
}
