use std::collections::HashSet;

use courier_core::{ActionSelection, FileSelection, SelectableFile};
use pretty_assertions::assert_eq;

fn file(name: &str) -> SelectableFile {
    SelectableFile::from_bytes(name, format!("%PDF {name}").into_bytes())
}

fn names(files: &FileSelection) -> Vec<String> {
    files.files().iter().map(|e| e.file.name.clone()).collect()
}

#[test]
fn add_files_appends_in_drop_order() {
    let mut files = FileSelection::new();
    files.add_files(vec![file("b.pdf"), file("a.pdf")]);
    files.add_files(vec![file("c.pdf")]);

    assert_eq!(names(&files), vec!["b.pdf", "a.pdf", "c.pdf"]);
}

#[test]
fn duplicate_names_are_dropped_first_wins() {
    let mut files = FileSelection::new();
    let original = SelectableFile::from_bytes("a.pdf", b"first".to_vec());
    files.add_files(vec![original.clone()]);

    let report = files.add_files(vec![
        SelectableFile::from_bytes("a.pdf", b"second".to_vec()),
        file("b.pdf"),
    ]);

    assert_eq!(names(&files), vec!["a.pdf", "b.pdf"]);
    assert_eq!(files.files()[0].file, original);
    assert_eq!(report.added.len(), 1);
    assert_eq!(report.skipped, vec!["a.pdf".to_string()]);
}

#[test]
fn duplicates_within_one_batch_are_dropped() {
    let mut files = FileSelection::new();
    let report = files.add_files(vec![file("x.pdf"), file("y.pdf"), file("x.pdf")]);

    assert_eq!(names(&files), vec!["x.pdf", "y.pdf"]);
    assert_eq!(report.skipped, vec!["x.pdf".to_string()]);
}

#[test]
fn every_name_seen_appears_exactly_once() {
    let batches: Vec<Vec<&str>> = vec![
        vec!["a", "b", "a"],
        vec!["c", "b"],
        vec![],
        vec!["d", "a", "e", "d"],
        vec!["e", "f"],
    ];
    let mut files = FileSelection::new();
    let mut first_seen = Vec::new();
    for batch in &batches {
        for name in batch {
            if !first_seen.contains(name) {
                first_seen.push(*name);
            }
        }
        files.add_files(batch.iter().map(|n| file(n)).collect());

        let current = names(&files);
        let unique: HashSet<&String> = current.iter().collect();
        assert_eq!(unique.len(), current.len());
    }

    assert_eq!(names(&files), first_seen);
}

#[test]
fn remove_absent_file_is_noop() {
    let mut files = FileSelection::new();
    let report = files.add_files(vec![file("a.pdf"), file("b.pdf")]);
    let a = report.added[0];

    assert!(files.remove_file(a).is_some());
    let snapshot = files.clone();

    // Repeated click on the same entry.
    assert!(files.remove_file(a).is_none());
    assert!(files.remove_file(999).is_none());
    assert_eq!(files, snapshot);
    assert_eq!(names(&files), vec!["b.pdf"]);
}

#[test]
fn removed_name_can_be_added_again() {
    let mut files = FileSelection::new();
    let id = files.add_files(vec![file("a.pdf")]).added[0];
    files.remove_file(id);

    let report = files.add_files(vec![file("a.pdf")]);
    assert_eq!(report.added.len(), 1);
    assert_eq!(files.find_by_name("a.pdf"), Some(report.added[0]));
}

#[test]
fn toggle_twice_restores_selection() {
    let mut actions = ActionSelection::new();
    actions.toggle(2);
    actions.toggle(0);
    let before = actions.clone();

    assert!(actions.toggle(1));
    assert!(!actions.toggle(1));
    assert_eq!(actions, before);

    assert!(!actions.toggle(2));
    assert!(actions.toggle(2));
    assert_eq!(actions.keys(), &[0, 2]);
}

#[test]
fn toggle_keeps_each_key_at_most_once() {
    let mut actions = ActionSelection::new();
    for key in [0, 1, 0, 0, 1, 2] {
        actions.toggle(key);
    }

    assert_eq!(actions.keys(), &[0, 2]);
    assert!(actions.contains(0));
    assert!(!actions.contains(1));
}
