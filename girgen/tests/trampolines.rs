use std::fs;
use std::path::{Path, PathBuf};

use girgen::{
    CallableAttrs, Callback, Class, LinkMode, Method, Namespace, Node, Parameter, Record, Repositories, Repository,
    RustEdition, Transfer, TrampolineBuilder,
};

const HEADER: &str = "\
// Generated by `TrampolineBuilder` for the `Foo-1.0` fixture of
// girgen/tests/trampolines.rs (edition 2021, runtime link mode).
// Regenerate with `GIRGEN_BLESS=1 cargo test -p girgen --test trampolines`.
";

/// The file girgen-runtime compiles and calls in its own tests.
fn checked_in_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("girgen-runtime")
        .join("tests")
        .join("generated")
        .join("foo_trampolines.rs")
}

fn param(name: &str, type_name: &str, c_type: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        type_name: Some(type_name.to_string()),
        c_type: Some(c_type.to_string()),
        ..Default::default()
    }
}

fn repos() -> Repositories {
    let point = Parameter {
        transfer_ownership: Transfer::Full,
        ..param("point", "Point", "FooPoint*")
    };
    let widget = Parameter {
        nullable: true,
        ..param("callback", "Widget", "FooWidget*")
    };
    let user_data = Parameter {
        closure: Some(4),
        ..param("user_data", "gpointer", "gpointer")
    };
    [Repository {
        namespace: Namespace {
            shared_library: Some("libfoo-1.so.0".to_string()),
            ..Namespace::new("Foo", "1.0")
        },
        nodes: vec![
            Node::Record(Record {
                name: "Point".to_string(),
                c_type: Some("FooPoint".to_string()),
                methods: vec![Method {
                    name: "free".to_string(),
                    c_identifier: Some("foo_point_free".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            Node::Class(Class {
                name: "Widget".to_string(),
                c_type: Some("FooWidget".to_string()),
                ..Default::default()
            }),
            Node::Callback(Callback {
                c_type: Some("FooPointReady".to_string()),
                callable: CallableAttrs {
                    name: "PointReady".to_string(),
                    parameters: vec![
                        point,
                        param("error", "GLib.Error", "GError*"),
                        param("ok", "gboolean", "gboolean"),
                        widget,
                        user_data,
                    ],
                    ..Default::default()
                },
            }),
        ],
        ..Default::default()
    }]
    .into_iter()
    .collect()
}

#[test]
fn test_generated_trampolines_match_checked_in_file() {
    let repos = repos();
    let repo = repos.find_repository("Foo-1.0").unwrap();
    let file = TrampolineBuilder::builder()
        .edition(RustEdition::Edition2021)
        .link_mode(LinkMode::Runtime)
        .build()
        .generate(&repos, repo);
    assert_eq!(file.generated(), ["_girgen_foo1_PointReady"]);

    let path = checked_in_path();
    if std::env::var_os("GIRGEN_BLESS").is_some() {
        fs::write(&path, format!("{HEADER}{}", file.to_source())).unwrap();
    }

    let checked_in = fs::read_to_string(&path).unwrap();
    let checked_in = syn::parse_file(&checked_in).expect("checked-in trampolines parse");
    assert_eq!(
        prettyplease::unparse(&checked_in),
        file.to_source(),
        "{} is stale; regenerate it with GIRGEN_BLESS=1",
        path.display()
    );
}
