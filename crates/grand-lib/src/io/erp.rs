use crate::recording::Recording;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// File extension shared by every recording the upstream pipeline writes.
pub const RECORDING_EXTENSION: &str = "erp";

/// Read interface over the recording store.
pub trait RecordingStore {
    fn open(&self, path: &Path) -> Result<Recording>;
}

/// Reads `.erp` recordings (JSON documents) from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStore;

impl RecordingStore for JsonStore {
    fn open(&self, path: &Path) -> Result<Recording> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let recording: Recording = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(recording)
    }
}

/// Write a recording in the format `JsonStore` reads.
pub fn save_recording(path: &Path, recording: &Recording) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(file, recording)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// In-memory store keyed by path, for synthetic groups.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    recordings: HashMap<PathBuf, Recording>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, recording: Recording) {
        self.recordings.insert(path.into(), recording);
    }
}

impl RecordingStore for MemoryStore {
    fn open(&self, path: &Path) -> Result<Recording> {
        self.recordings
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no recording stored at {}", path.display()))
    }
}

/// Participant files that make up one group, in load order.
///
/// Every file is assumed to come from the same upstream pipeline run; nothing here checks
/// that the directory holds no unrelated recordings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSource {
    pub dir: PathBuf,
    pub paths: Vec<PathBuf>,
}

impl GroupSource {
    pub fn from_paths(dir: impl Into<PathBuf>, paths: Vec<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths,
        }
    }

    /// Every `.erp` file next to `base`, sorted by path.
    pub fn discover(base: &Path) -> Result<Self> {
        let dir = match base.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir_str = dir
            .to_str()
            .ok_or_else(|| anyhow!("directory {} is not valid UTF-8", dir.display()))?;
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(dir_str),
            RECORDING_EXTENSION
        );
        let mut paths = Vec::new();
        for entry in glob::glob(&pattern).context("failed to glob recordings")? {
            let path = entry.context("failed to read directory entry")?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self { dir, paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
