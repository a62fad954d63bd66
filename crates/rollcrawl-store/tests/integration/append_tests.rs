use rollcrawl_core::models::FormatOptions;
use rollcrawl_core::traits::RecordStore;
use rollcrawl_store::{DsvFileStore, OutputLayout};

use crate::integration::common::{HEADER, output};

#[tokio::test]
async fn first_append_writes_header_then_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolls.tsv");
    let store = DsvFileStore::new(OutputLayout::SingleFile(path.clone()), FormatOptions::default());

    let written = store.append(&output(1, "Aria", &[1, 2])).await.unwrap();
    assert_eq!(written, path);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with(HEADER));
    assert_eq!(contents.lines().count(), 3);
}

#[tokio::test]
async fn second_append_does_not_repeat_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolls.tsv");
    let store = DsvFileStore::new(OutputLayout::SingleFile(path.clone()), FormatOptions::default());

    store.append(&output(1, "Aria", &[1])).await.unwrap();
    store.append(&output(2, "Kael", &[2, 3])).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.matches("\"Character\"").count(), 1);
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("1\t"));
    assert!(lines[3].starts_with("3\t"));
}

#[tokio::test]
async fn existing_file_gets_no_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolls.tsv");
    std::fs::write(&path, "").unwrap();
    let store = DsvFileStore::new(OutputLayout::SingleFile(path.clone()), FormatOptions::default());

    store.append(&output(5, "Aria", &[5])).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("5\t"));
}

#[tokio::test]
async fn per_character_layout_splits_files() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("characters");
    let store = DsvFileStore::new(
        OutputLayout::PerCharacter(out_dir.clone()),
        FormatOptions::default(),
    );

    let aria = store.append(&output(1, "Aria Vex", &[1])).await.unwrap();
    let kael = store.append(&output(2, "Kael", &[2])).await.unwrap();
    store.append(&output(3, "Aria Vex", &[3])).await.unwrap();

    assert_eq!(aria, out_dir.join("Aria_Vex.tsv"));
    assert_eq!(kael, out_dir.join("Kael.tsv"));

    let aria_contents = std::fs::read_to_string(&aria).unwrap();
    assert!(aria_contents.starts_with(HEADER));
    assert_eq!(aria_contents.lines().count(), 3);

    let kael_contents = std::fs::read_to_string(&kael).unwrap();
    assert_eq!(kael_contents.lines().count(), 2);
}

#[tokio::test]
async fn empty_output_still_creates_file_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolls.tsv");
    let store = DsvFileStore::new(OutputLayout::SingleFile(path.clone()), FormatOptions::default());

    store.append(&output(1, "Aria", &[])).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), HEADER);
}
