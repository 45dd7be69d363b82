//! Integration tests for saving and loading graph documents.

use std::fs;

use depscope::document::{load_document, load_document_resilient, save_document};
use depscope::{Error, LoadWarning, NodeFactory, NodeKind};
use tempfile::TempDir;

fn sample() -> NodeFactory {
    let mut factory = NodeFactory::new();
    let a = factory.create_confirmed(NodeKind::Member, "app.Main.run()");
    let b = factory.create_member("lib.Util.format(String)");
    let lib = factory.create_package("lib");
    let other = factory.create_package("other");
    factory.add_dependency(a, b);
    factory.add_dependency(lib, other);
    factory.add_dependency(other, lib);
    factory
}

#[test]
fn saved_document_loads_back_identically() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("graph.jsonl");
    let original = sample();

    save_document(&original, &path, true).expect("save");
    let loaded = load_document(&path).expect("load");

    assert_eq!(loaded.len(), original.len());
    assert_eq!(loaded.edge_count(), original.edge_count());
    for kind in NodeKind::ALL {
        assert_eq!(loaded.count_of(kind), original.count_of(kind), "{kind}");
    }

    let run = loaded
        .lookup(NodeKind::Member, "app.Main.run()")
        .expect("run");
    let format = loaded
        .lookup(NodeKind::Member, "lib.Util.format(String)")
        .expect("format");
    assert!(loaded.has_dependency(run, format));
    assert!(loaded.node(run).expect("run").is_confirmed());
    assert!(
        loaded
            .node(loaded.lookup(NodeKind::Type, "app.Main").expect("type"))
            .expect("type")
            .is_confirmed()
    );
}

#[test]
fn outbound_only_document_still_describes_every_edge() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("graph.jsonl");
    let original = sample();

    save_document(&original, &path, false).expect("save");
    let loaded = load_document(&path).expect("load");

    assert_eq!(loaded.edge_count(), original.edge_count());
}

#[test]
fn save_replaces_existing_document_without_leaving_temp_file() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("graph.jsonl");
    fs::write(&path, "stale\n").expect("seed file");

    save_document(&sample(), &path, true).expect("save");

    let text = fs::read_to_string(&path).expect("read");
    assert!(!text.contains("stale"));
    assert!(!temp.path().join("graph.tmp").exists());
}

#[test]
fn strict_load_reports_the_bad_line() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("graph.jsonl");
    fs::write(
        &path,
        "{\"kind\":\"package\",\"name\":\"a\"}\n{\"kind\":\"widget\",\"name\":\"x\"}\n",
    )
    .expect("write");

    let err = load_document(&path).expect_err("unknown kind");

    assert!(matches!(err, Error::Document { line_number: 2, .. }), "{err}");
}

#[test]
fn resilient_load_keeps_good_lines() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("graph.jsonl");
    fs::write(
        &path,
        concat!(
            "{\"kind\":\"member\",\"name\":\"a.A.a\",\"confirmed\":true,",
            "\"outbound\":[{\"kind\":\"member\",\"name\":\"b.B.b\",\"direction\":\"outbound\"}]}\n",
            "not json\n",
            "\n",
            "{\"kind\":\"package\",\"name\":\"c\"}\n",
        ),
    )
    .expect("write");

    let (factory, warnings) = load_document_resilient(&path).expect("load");

    assert_eq!(factory.count_of(NodeKind::Member), 2);
    assert_eq!(factory.count_of(NodeKind::Package), 3);
    assert_eq!(factory.edge_count(), 1);
    assert_eq!(
        warnings.iter().map(LoadWarning::line_number).collect::<Vec<_>>(),
        vec![2, 3]
    );
    assert!(matches!(warnings[0], LoadWarning::MalformedRecord { .. }));
    assert!(matches!(warnings[1], LoadWarning::SkippedLine { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = TempDir::new().expect("temp dir");

    let err = load_document(&temp.path().join("absent.jsonl")).expect_err("missing");

    assert!(matches!(err, Error::Io(_)));
}
