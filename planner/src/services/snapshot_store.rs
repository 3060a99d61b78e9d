//! JSON file snapshot store
//!
//! Keeps the whole planner snapshot in one pretty-printed JSON file. Writes go
//! to a sibling temp file that is then renamed over the target, so a reader
//! never sees a half-written snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use shared::logging::Component;
use shared::{planner_debug, PlannerSnapshot};

use crate::error::{PlannerError, PlannerResult};
use crate::traits::SnapshotStore;

/// Snapshot store backed by a single file
pub struct RealSnapshotStore {
    path: PathBuf,
}

impl RealSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn failure(&self, operation: &str, message: impl ToString) -> PlannerError {
        PlannerError::PersistenceError {
            operation: operation.to_string(),
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl SnapshotStore for RealSnapshotStore {
    async fn load(&self) -> PlannerResult<Option<PlannerSnapshot>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.failure("load", e)),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot = PlannerSnapshot::from_json(&content).map_err(|e| self.failure("load", e))?;
        planner_debug!(
            Component::Store,
            "📂 Loaded snapshot with {} tables and {} groups from {}",
            snapshot.tables.len(),
            snapshot.groups.len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &PlannerSnapshot) -> PlannerResult<()> {
        let content = snapshot.to_json().map_err(|e| self.failure("save", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.failure("save", e))?;
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| self.failure("save", e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| self.failure("save", e))?;
        file.sync_all().await.map_err(|e| self.failure("save", e))?;
        drop(file);

        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.failure("save", e))?;

        planner_debug!(Component::Store, "💾 Saved snapshot to {}", self.path.display());
        Ok(())
    }
}
