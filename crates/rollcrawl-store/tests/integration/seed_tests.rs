use rollcrawl_core::models::FormatOptions;
use rollcrawl_core::traits::RecordStore;
use rollcrawl_store::{DsvFileStore, OutputLayout};

use crate::integration::common::output;

#[tokio::test]
async fn seen_ids_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolls.tsv");
    let store = DsvFileStore::new(OutputLayout::SingleFile(path.clone()), FormatOptions::default());

    store.append(&output(1, "Aria", &[1, 2, 4])).await.unwrap();

    let restarted = DsvFileStore::new(OutputLayout::SingleFile(path), FormatOptions::default());
    let seen = restarted.load_seen_ids().unwrap();
    assert_eq!(seen.iter().collect::<Vec<_>>(), vec![1, 2, 4]);
    assert_eq!(seen.lowest_missing(1), 3);
}

#[tokio::test]
async fn seeding_reads_every_character_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = DsvFileStore::new(
        OutputLayout::PerCharacter(dir.path().to_path_buf()),
        FormatOptions::default(),
    );

    store.append(&output(1, "Aria", &[1, 3])).await.unwrap();
    store.append(&output(2, "Kael", &[2, 5])).await.unwrap();
    // Files with another extension are not output files.
    std::fs::write(dir.path().join("notes.txt"), "7\n").unwrap();

    let seen = store.load_seen_ids().unwrap();
    assert_eq!(seen.iter().collect::<Vec<_>>(), vec![1, 2, 3, 5]);
    assert_eq!(seen.lowest_missing(1), 4);
}

#[tokio::test]
async fn seeding_honours_custom_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolls.csv");
    let format = FormatOptions::new('\'', ',').unwrap();
    std::fs::write(
        &path,
        "ID,BD,CD,LD,MD,'Character','URL','Purpose',Time\n\
         8,1d4,2,0,2,'Aria, the Bold',http://x,'it''s',noon\n",
    )
    .unwrap();

    let store = DsvFileStore::new(OutputLayout::SingleFile(path), format);
    let seen = store.load_seen_ids().unwrap();
    assert_eq!(seen.iter().collect::<Vec<_>>(), vec![8]);
}
