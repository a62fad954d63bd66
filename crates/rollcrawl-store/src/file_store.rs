use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rollcrawl_core::dsv::header_line;
use rollcrawl_core::error::CrawlError;
use rollcrawl_core::models::{CrawlOutput, FormatOptions, ID_COLUMN};
use rollcrawl_core::seen::SeenIds;
use rollcrawl_core::traits::RecordStore;
use tokio::io::AsyncWriteExt;

use crate::ids::read_ids;

/// Where crawled records are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLayout {
    /// Every record goes to one file.
    SingleFile(PathBuf),
    /// One file per character inside a directory.
    PerCharacter(PathBuf),
}

/// Appends crawl results to DSV files on disk.
///
/// A file gets the header line when it is created and never again, so
/// appending to an existing file only adds records.
#[derive(Debug, Clone)]
pub struct DsvFileStore {
    layout: OutputLayout,
    format: FormatOptions,
    /// Per-character file stem -> first display name written to it.
    owners: Arc<Mutex<HashMap<String, String>>>,
}

impl DsvFileStore {
    pub fn new(layout: OutputLayout, format: FormatOptions) -> Self {
        Self {
            layout,
            format,
            owners: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// File that records of `display_name` are appended to.
    pub fn path_for(&self, display_name: &str) -> PathBuf {
        match &self.layout {
            OutputLayout::SingleFile(path) => path.clone(),
            OutputLayout::PerCharacter(dir) => dir.join(format!(
                "{}.{}",
                file_stem(display_name),
                self.format.extension()
            )),
        }
    }

    /// Claims the per-character file of `display_name`.
    ///
    /// Returns the other character already writing to the same file, if
    /// sanitizing mapped both names to one stem.
    fn claim_file(&self, display_name: &str) -> Option<String> {
        if !matches!(self.layout, OutputLayout::PerCharacter(_)) {
            return None;
        }
        let mut owners = self.owners.lock().unwrap_or_else(|e| e.into_inner());
        let owner = owners
            .entry(file_stem(display_name))
            .or_insert_with(|| display_name.to_string());
        (owner.as_str() != display_name).then(|| owner.clone())
    }

    /// Output files that already exist.
    pub fn existing_files(&self) -> Result<Vec<PathBuf>, CrawlError> {
        match &self.layout {
            OutputLayout::SingleFile(path) => Ok(if path.is_file() {
                vec![path.clone()]
            } else {
                Vec::new()
            }),
            OutputLayout::PerCharacter(dir) => {
                if !dir.is_dir() {
                    return Ok(Vec::new());
                }
                let mut files = Vec::new();
                for entry in std::fs::read_dir(dir)? {
                    let path = entry?.path();
                    let matches_ext = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e == self.format.extension());
                    if path.is_file() && matches_ext {
                        files.push(path);
                    }
                }
                files.sort();
                Ok(files)
            }
        }
    }

    /// Rebuilds the seen set from the IDs already written to disk.
    pub fn load_seen_ids(&self) -> Result<SeenIds, CrawlError> {
        let mut seen = SeenIds::new();
        for path in self.existing_files()? {
            let ids = read_ids(&path, &self.format, ID_COLUMN, true)?;
            tracing::debug!(path = %path.display(), ids = ids.len(), "Loaded existing IDs");
            seen.extend(ids);
        }
        Ok(seen)
    }
}

impl RecordStore for DsvFileStore {
    async fn append(&self, output: &CrawlOutput) -> Result<PathBuf, CrawlError> {
        let path = self.path_for(&output.display_name);
        if let Some(other) = self.claim_file(&output.display_name) {
            tracing::warn!(
                character = %output.display_name,
                %other,
                path = %path.display(),
                "Characters share an output file"
            );
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let is_new = !tokio::fs::try_exists(&path).await?;
        let mut buf = String::with_capacity(output.dsv.len() + 64);
        if is_new {
            buf.push_str(&header_line(&self.format));
        }
        buf.push_str(&output.dsv);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        if is_new {
            tracing::info!(path = %path.display(), "Created output file");
        }
        Ok(path)
    }
}

/// File name for a character: ASCII alphanumerics, `-` and `_` kept, the rest mapped to `_`.
pub fn file_stem(display_name: &str) -> String {
    let stem: String = display_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "unknown".to_string()
    } else {
        stem
    }
}
