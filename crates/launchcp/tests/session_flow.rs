use std::path::Path;

use launchcp::app::compare::ClasspathMode;
use launchcp::app::session::ClasspathSession;
use launchcp::domain::model::{ClasspathEntry, EntryId, Segment};
use launchcp::infra::config::AttributeNames;
use launchcp::infra::resolver::AttributeResolver;
use launchcp::infra::store::{AttributeValue, ConfigStore, JsonFileStore};

fn descriptors(entries: &[ClasspathEntry]) -> AttributeValue {
    AttributeValue::List(
        entries
            .iter()
            .map(|entry| serde_json::to_string(entry).expect("encode entry"))
            .collect(),
    )
}

fn seed(path: &Path) {
    let mut store = JsonFileStore::open(path).expect("open store");
    store.set(
        &AttributeNames::for_segment(Segment::User).defaults,
        descriptors(&[
            ClasspathEntry::archive("/lib/a.jar"),
            ClasspathEntry::project("b").with_children([
                ClasspathEntry::archive("/lib/c.jar"),
                ClasspathEntry::archive("/lib/d.jar"),
            ]),
        ]),
    );
    store.set(
        &AttributeNames::for_segment(Segment::Bootstrap).defaults,
        descriptors(&[ClasspathEntry::archive("/jre/lib/rt.jar")]),
    );
    store.save().expect("seed store");
}

fn open(path: &Path, segment: Segment) -> ClasspathSession<JsonFileStore, AttributeResolver> {
    let names = AttributeNames::for_segment(segment);
    let resolver = AttributeResolver::new(names.defaults.clone());
    let store = JsonFileStore::open(path).expect("open store");
    ClasspathSession::load(segment, names, "launchcp.project_name", store, resolver)
}

fn enabled(session: &ClasspathSession<JsonFileStore, AttributeResolver>) -> Vec<String> {
    session
        .enabled_classpath()
        .ids()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

fn excluded(session: &ClasspathSession<JsonFileStore, AttributeResolver>) -> Vec<String> {
    session
        .selection()
        .excluded()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn disabling_a_project_persists_without_apply() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("launch.json");
    seed(&path);

    let mut session = open(&path, Segment::User);
    assert_eq!(
        enabled(&session),
        ["archive:/lib/a.jar", "project:b", "archive:/lib/c.jar", "archive:/lib/d.jar"]
    );

    session.toggle(&EntryId::from("project:b"), false).unwrap();
    assert_eq!(
        excluded(&session),
        ["archive:/lib/c.jar", "archive:/lib/d.jar", "project:b"]
    );
    drop(session);

    // The toggle was written through even though the session was never applied.
    let reloaded = open(&path, Segment::User);
    assert_eq!(enabled(&reloaded), ["archive:/lib/a.jar"]);
}

#[test]
fn child_enabled_under_disabled_parent_round_trips() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("launch.json");
    seed(&path);

    let mut session = open(&path, Segment::User);
    session.toggle(&EntryId::from("project:b"), false).unwrap();
    session.toggle(&EntryId::from("archive:/lib/c.jar"), true).unwrap();
    session.apply().unwrap();
    assert_eq!(excluded(&session), ["archive:/lib/d.jar", "project:b"]);
    assert_eq!(enabled(&session), ["archive:/lib/a.jar"]);

    let reloaded = open(&path, Segment::User);
    assert_eq!(reloaded.mode(), ClasspathMode::Custom);
    assert_eq!(excluded(&reloaded), excluded(&session));
    for entry in session.tree().flatten().entries() {
        assert_eq!(reloaded.is_enabled(entry.id()), session.is_enabled(entry.id()));
    }
}

#[test]
fn segments_are_configured_independently() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("launch.json");
    seed(&path);

    let mut user = open(&path, Segment::User);
    user.toggle(&EntryId::from("archive:/lib/a.jar"), false).unwrap();
    user.apply().unwrap();

    let mut bootstrap = open(&path, Segment::Bootstrap);
    bootstrap.activated();
    assert_eq!(bootstrap.mode(), ClasspathMode::Default);
    assert_eq!(enabled(&bootstrap), ["archive:/jre/lib/rt.jar"]);

    let user = open(&path, Segment::User);
    assert_eq!(user.mode(), ClasspathMode::Custom);
}

#[test]
fn restore_defaults_returns_to_default_mode() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("launch.json");
    seed(&path);

    let mut session = open(&path, Segment::User);
    session.add_entry(ClasspathEntry::folder("/ws/web/classes"));
    session.toggle(&EntryId::from("project:b"), false).unwrap();
    session.apply().unwrap();
    assert_eq!(session.mode(), ClasspathMode::Custom);

    session.restore_defaults();
    session.apply().unwrap();

    let mut reloaded = open(&path, Segment::User);
    reloaded.activated();
    assert_eq!(reloaded.mode(), ClasspathMode::Default);
    assert!(reloaded.selection().is_all_enabled());
    assert!(reloaded.custom_entries().is_empty());
    assert!(reloaded.is_default_classpath());
}
