//! Directory-backed status provider.
//!
//! Every sub-directory of the root is one trial. Status follows the marker
//! files the processing servers leave behind:
//!
//! | Contents | Status |
//! |---|---|
//! | `_results.json` | `done` |
//! | `PROCESSING` | `processing` |
//! | `READY_TO_PROCESS` | `waiting` |
//! | capture files only | `could-process` |
//! | nothing else | `empty` |
//!
//! Listing and status reads come from an in-memory snapshot that
//! [`FsStatusProvider::refresh`] rebuilds.

use std::{
    io,
    path::{Path, PathBuf},
    sync::RwLock,
    time::SystemTime,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info, warn};
use trialview_types::{ArtifactError, Trial, TrialStatus};

use super::StatusProvider;

/// Written by the viewer to queue a trial.
pub const READY_MARKER: &str = "READY_TO_PROCESS";
/// Written by a processing server once it claims the trial.
pub const PROCESSING_MARKER: &str = "PROCESSING";
pub const LOG_FILE: &str = "log.txt";
pub const RESULTS_FILE: &str = "_results.json";

#[derive(Debug, Clone)]
struct TrialEntry {
    trial: Trial,
    status: TrialStatus,
}

#[derive(Debug, Default)]
struct TrialContents {
    has_capture: bool,
    ready: bool,
    processing: bool,
    results: bool,
    size: u64,
    newest: Option<SystemTime>,
}

impl TrialContents {
    fn status(&self) -> TrialStatus {
        if self.results {
            TrialStatus::Done
        } else if self.processing {
            TrialStatus::Processing
        } else if self.ready {
            TrialStatus::Waiting
        } else if self.has_capture {
            TrialStatus::CouldProcess
        } else {
            TrialStatus::Empty
        }
    }
}

pub struct FsStatusProvider {
    root: PathBuf,
    snapshot: RwLock<Vec<TrialEntry>>,
}

impl std::fmt::Debug for FsStatusProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsStatusProvider").field("root", &self.root).finish()
    }
}

impl FsStatusProvider {
    /// Open `root` and take an initial snapshot.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let provider = Self {
            root: root.into(),
            snapshot: RwLock::new(Vec::new()),
        };
        provider.refresh().await?;
        Ok(provider)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rescan the root directory and replace the snapshot.
    pub async fn refresh(&self) -> Result<()> {
        let entries = scan_root(&self.root).await?;
        debug!(root = %self.root.display(), trial_count = entries.len(), "trial snapshot refreshed");
        *self.snapshot.write().expect("snapshot lock") = entries;
        Ok(())
    }

    /// Directory for a known trial key. Keys never escape the root.
    fn trial_dir(&self, key: &str) -> Result<PathBuf, ArtifactError> {
        let known = self
            .snapshot
            .read()
            .expect("snapshot lock")
            .iter()
            .any(|entry| entry.trial.key == key);
        if !known || key.contains(['/', '\\']) || key == ".." {
            return Err(ArtifactError::not_found(key));
        }
        Ok(self.root.join(key))
    }

    async fn read_artifact(&self, key: &str, file_name: &str) -> Result<String, ArtifactError> {
        let path = self.trial_dir(key)?.join(file_name);
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Err(ArtifactError::not_found(key)),
            Err(error) => Err(error.into()),
        }
    }
}

#[async_trait::async_trait]
impl StatusProvider for FsStatusProvider {
    fn list_trials(&self) -> Vec<Trial> {
        self.snapshot
            .read()
            .expect("snapshot lock")
            .iter()
            .map(|entry| entry.trial.clone())
            .collect()
    }

    fn get_status(&self, key: &str) -> TrialStatus {
        self.snapshot
            .read()
            .expect("snapshot lock")
            .iter()
            .find(|entry| entry.trial.key == key)
            .map(|entry| entry.status)
            .unwrap_or_default()
    }

    async fn get_log_text(&self, key: &str) -> Result<String, ArtifactError> {
        self.read_artifact(key, LOG_FILE).await
    }

    async fn get_results_text(&self, key: &str) -> Result<String, ArtifactError> {
        self.read_artifact(key, RESULTS_FILE).await
    }

    async fn mark_ready_for_processing(&self, key: &str) -> Result<(), ArtifactError> {
        let marker = self.trial_dir(key)?.join(READY_MARKER);
        fs::write(&marker, b"").await?;
        info!(trial = %key, "trial marked ready for processing");
        if let Err(error) = self.refresh().await {
            warn!(trial = %key, error = %error, "snapshot refresh after marking trial failed");
            return Err(ArtifactError::Io(error.to_string()));
        }
        Ok(())
    }
}

async fn scan_root(root: &Path) -> Result<Vec<TrialEntry>> {
    let mut dir = fs::read_dir(root)
        .await
        .with_context(|| format!("Failed to read trials root: {}", root.display()))?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let key = entry.file_name().to_string_lossy().into_owned();
        let contents = scan_trial(&entry.path())
            .await
            .with_context(|| format!("Failed to scan trial directory: {}", entry.path().display()))?;
        let last_modified = match contents.newest {
            Some(time) => time,
            None => entry.metadata().await?.modified()?,
        };
        entries.push(TrialEntry {
            trial: Trial::new(key, DateTime::<Utc>::from(last_modified), contents.size),
            status: contents.status(),
        });
    }
    entries.sort_by(|left, right| left.trial.key.cmp(&right.trial.key));
    Ok(entries)
}

async fn scan_trial(dir: &Path) -> io::Result<TrialContents> {
    let mut contents = TrialContents::default();
    let mut files = fs::read_dir(dir).await?;
    while let Some(file) = files.next_entry().await? {
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        contents.newest = Some(contents.newest.map_or(modified, |newest| newest.max(modified)));

        let name = file.file_name();
        match &*name.to_string_lossy() {
            READY_MARKER => contents.ready = true,
            PROCESSING_MARKER => contents.processing = true,
            RESULTS_FILE => contents.results = true,
            LOG_FILE => {}
            _ => {
                contents.has_capture = true;
                contents.size += metadata.len();
            }
        }
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::tempdir;

    fn write(dir: &Path, trial: &str, file: &str, content: &str) {
        let trial_dir = dir.join(trial);
        std_fs::create_dir_all(&trial_dir).unwrap();
        std_fs::write(trial_dir.join(file), content).unwrap();
    }

    #[tokio::test]
    async fn derives_status_from_marker_files() {
        let root = tempdir().unwrap();
        std_fs::create_dir_all(root.path().join("a_empty")).unwrap();
        write(root.path(), "b_upload", "walk.trc", "markers");
        write(root.path(), "c_queued", "walk.trc", "markers");
        write(root.path(), "c_queued", READY_MARKER, "");
        write(root.path(), "d_running", "walk.trc", "markers");
        write(root.path(), "d_running", READY_MARKER, "");
        write(root.path(), "d_running", PROCESSING_MARKER, "");
        write(root.path(), "e_done", "walk.trc", "markers");
        write(root.path(), "e_done", RESULTS_FILE, "{}");

        let provider = FsStatusProvider::open(root.path()).await.unwrap();
        let statuses: Vec<(String, TrialStatus)> = provider
            .list_trials()
            .into_iter()
            .map(|trial| {
                let status = provider.get_status(&trial.key);
                (trial.key, status)
            })
            .collect();

        assert_eq!(
            statuses,
            vec![
                ("a_empty".to_string(), TrialStatus::Empty),
                ("b_upload".to_string(), TrialStatus::CouldProcess),
                ("c_queued".to_string(), TrialStatus::Waiting),
                ("d_running".to_string(), TrialStatus::Processing),
                ("e_done".to_string(), TrialStatus::Done),
            ]
        );
    }

    #[tokio::test]
    async fn size_counts_capture_files_only() {
        let root = tempdir().unwrap();
        write(root.path(), "trial", "walk.trc", "12345");
        write(root.path(), "trial", "walk.mot", "678");
        write(root.path(), "trial", LOG_FILE, "a very long log line");

        let provider = FsStatusProvider::open(root.path()).await.unwrap();
        assert_eq!(provider.list_trials()[0].size, 8);
    }

    #[tokio::test]
    async fn reads_artifacts_and_reports_missing_ones() {
        let root = tempdir().unwrap();
        write(root.path(), "trial", "walk.trc", "x");
        write(root.path(), "trial", LOG_FILE, "step 1\nstep 2\n");

        let provider = FsStatusProvider::open(root.path()).await.unwrap();
        assert_eq!(provider.get_log_text("trial").await.unwrap(), "step 1\nstep 2\n");
        assert_eq!(
            provider.get_results_text("trial").await.unwrap_err(),
            ArtifactError::not_found("trial")
        );
        assert_eq!(
            provider.get_log_text("../elsewhere").await.unwrap_err(),
            ArtifactError::not_found("../elsewhere")
        );
    }

    #[tokio::test]
    async fn mark_ready_writes_marker_and_refreshes() {
        let root = tempdir().unwrap();
        write(root.path(), "trial", "walk.trc", "x");

        let provider = FsStatusProvider::open(root.path()).await.unwrap();
        assert_eq!(provider.get_status("trial"), TrialStatus::CouldProcess);

        provider.mark_ready_for_processing("trial").await.unwrap();
        assert!(root.path().join("trial").join(READY_MARKER).exists());
        assert_eq!(provider.get_status("trial"), TrialStatus::Waiting);
    }

    #[tokio::test]
    async fn refresh_picks_up_new_trials() {
        let root = tempdir().unwrap();
        let provider = FsStatusProvider::open(root.path()).await.unwrap();
        assert!(provider.list_trials().is_empty());

        write(root.path(), "late", "run.c3d", "x");
        provider.refresh().await.unwrap();
        assert_eq!(provider.list_trials().len(), 1);
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let root = tempdir().unwrap();
        assert!(FsStatusProvider::open(root.path().join("absent")).await.is_err());
    }
}
